pub mod client;
pub mod profile;
