pub mod browser;
pub mod client;
pub mod errors;
pub mod path;
pub mod preview;
