pub mod hit_window;
pub mod note;

pub use hit_window::TimingWindows;
pub use note::{HitObject, MapInfo};
