pub mod client;
pub mod error;
pub mod result;
pub mod transport;
