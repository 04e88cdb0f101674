pub mod adapter;
pub mod capability;
pub mod leverage;
pub mod normalizer;
pub mod params;
pub mod prelude;
pub mod rate_limiter;
pub mod retry;
pub mod transport;

pub use adapter::{AdapterCore, ExchangeAdapter};
pub use capability::{CapabilityTable, CapabilityValue};
pub use params::{ParamBuilder, ParamShaper};
pub use retry::{with_retry, RetryPolicy};
pub use transport::{ExchangeTransport, RestTransport};
