pub mod district;
pub mod position;
pub mod session;
pub mod settings;
