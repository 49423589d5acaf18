pub mod clock;
pub mod input_adapter;
pub mod timer;

pub use clock::Clock;
pub use input_adapter::{PointerTracker, POINTER_IDLE_TIMEOUT, POINTER_RATE_HZ};
pub use timer::{IdleTimer, Throttle};
