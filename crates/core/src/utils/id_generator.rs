use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;

pub struct IdGenerator {
    counter: Arc<AtomicU64>,
    node_id: u16,
}

impl IdGenerator {
    pub fn new(node_id: u16) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            node_id,
        }
    }

    pub fn generate_uuid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    pub fn generate_order_id(&self) -> String {
        let timestamp = Utc::now().timestamp_millis() as u64;
        let counter = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("ORD-{}-{}-{:06}", timestamp, self.node_id, counter % 1_000_000)
    }

    /// Client order id tagged with the exchange it is destined for.
    pub fn generate_client_order_id(&self, exchange: &str) -> String {
        let timestamp = Utc::now().timestamp_millis() as u64;
        let counter = self.counter.fetch_add(1, Ordering::SeqCst);
        format!(
            "{}-{}-{:06}",
            exchange.to_uppercase(),
            timestamp,
            counter % 1_000_000
        )
    }

    /// Monotonic nonce for request signing.
    pub fn generate_nonce(&self) -> u64 {
        Utc::now().timestamp_millis() as u64 * 1000
            + (self.counter.fetch_add(1, Ordering::SeqCst) % 1000)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Clone for IdGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
            node_id: self.node_id,
        }
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_ID_GENERATOR: IdGenerator = IdGenerator::new(
        std::env::var("TRADEGATE_NODE_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    );
}

pub fn generate_uuid() -> String {
    GLOBAL_ID_GENERATOR.generate_uuid()
}

pub fn generate_order_id() -> String {
    GLOBAL_ID_GENERATOR.generate_order_id()
}

pub fn generate_client_order_id(exchange: &str) -> String {
    GLOBAL_ID_GENERATOR.generate_client_order_id(exchange)
}

pub fn generate_nonce() -> u64 {
    GLOBAL_ID_GENERATOR.generate_nonce()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let generator = IdGenerator::new(1);

        let uuid1 = generator.generate_uuid();
        let uuid2 = generator.generate_uuid();
        assert_ne!(uuid1, uuid2);
        assert_eq!(uuid1.len(), 36);

        let order_id1 = generator.generate_order_id();
        let order_id2 = generator.generate_order_id();
        assert_ne!(order_id1, order_id2);
        assert!(order_id1.starts_with("ORD-"));
    }

    #[test]
    fn test_client_order_id() {
        let generator = IdGenerator::new(1);

        let bitget_id = generator.generate_client_order_id("bitget");
        let bybit_id = generator.generate_client_order_id("bybit");

        assert!(bitget_id.starts_with("BITGET-"));
        assert!(bybit_id.starts_with("BYBIT-"));
        assert_ne!(bitget_id, bybit_id);
    }

    #[test]
    fn test_nonce_generation() {
        let generator = IdGenerator::new(1);

        let nonce1 = generator.generate_nonce();
        let nonce2 = generator.generate_nonce();

        assert_ne!(nonce1, nonce2);
        assert!(nonce2 > nonce1);
    }
}
