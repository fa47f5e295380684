pub mod animator;
pub mod input;
pub mod lights;

pub use animator::{FrameLoopHandle, GroupPose, SceneAnimator};
pub use input::{InputSender, SurfaceEvent};
