pub mod camera;
pub mod emitter;

pub use camera::*;
pub use emitter::*;
