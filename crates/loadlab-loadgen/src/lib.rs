pub mod client;
pub mod script;
