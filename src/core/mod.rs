pub mod catalog;
pub mod geo;
pub mod log;
pub mod ranking;
pub mod reminder;
pub mod session;
pub mod state;
pub mod ticker;
