pub mod engine;
pub mod extrude;
pub mod flower;
pub mod mesh;
pub mod petal;
pub mod shape;

pub use engine::{RoseEngine, RoseResult};
pub use flower::{BakedRose, RoseVertex};
