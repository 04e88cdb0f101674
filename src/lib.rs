pub use tradegate_core::prelude::*;
pub use tradegate_engine::prelude::*;
pub use tradegate_monitoring::{setup_logging, LogContext};

// Re-export exchange adapters
pub use tradegate_bitget::BitgetAdapter;
pub use tradegate_bybit::BybitAdapter;

pub mod registry;
pub use registry::AdapterRegistry;
