pub mod config;
pub mod error;
pub mod prelude;
pub mod types;
pub mod utils;

pub use config::TradegateConfig;
pub use error::{Result, TradegateError};
pub use types::*;
