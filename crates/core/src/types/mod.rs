pub mod exchange;
pub mod market;
pub mod mode;
pub mod order;

pub use exchange::*;
pub use market::*;
pub use mode::*;
pub use order::*;
