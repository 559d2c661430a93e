pub mod config;
pub mod error;

pub use config::CabinConfig;
pub use error::{CabinError, Result};
