pub mod camera;
pub mod gpu;
pub mod rose_buffers;

pub use camera::Camera;
pub use gpu::GpuState;
