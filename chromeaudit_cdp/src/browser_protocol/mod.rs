pub mod browser;
pub mod dom;
pub mod network;
pub mod page;
pub mod target;
