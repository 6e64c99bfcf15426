pub mod frame;
pub mod misc;
pub mod navigation;
pub mod network;
pub mod script;
pub mod target;
pub mod util;
