pub mod client;
pub mod common;

pub type Error = crate::common::error::HorizonError;
pub type Result<T> = std::result::Result<T, Error>;

pub const HORIZON_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use avail;
