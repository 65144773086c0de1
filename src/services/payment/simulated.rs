use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::{PaymentCheck, PaymentProvider};

/// Stand-in provider for demos and local development: reports pending for
/// a configurable number of checks, then success.
pub struct SimulatedUpiProvider {
    succeed_after: u32,
    checks: AtomicU32,
}

impl SimulatedUpiProvider {
    pub fn new(succeed_after: u32) -> Self {
        Self {
            succeed_after,
            checks: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl PaymentProvider for SimulatedUpiProvider {
    async fn check_status(&self, _reference: &str, _amount: f64) -> anyhow::Result<PaymentCheck> {
        let seen = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        if seen > self.succeed_after {
            Ok(PaymentCheck::Success)
        } else {
            Ok(PaymentCheck::Pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_succeeds_after_configured_checks() {
        let provider = SimulatedUpiProvider::new(2);
        assert_eq!(provider.check_status("f1", 100.0).await.unwrap(), PaymentCheck::Pending);
        assert_eq!(provider.check_status("f1", 100.0).await.unwrap(), PaymentCheck::Pending);
        assert_eq!(provider.check_status("f1", 100.0).await.unwrap(), PaymentCheck::Success);
    }

    #[tokio::test]
    async fn test_zero_threshold_succeeds_immediately() {
        let provider = SimulatedUpiProvider::new(0);
        assert_eq!(provider.check_status("f1", 100.0).await.unwrap(), PaymentCheck::Success);
    }
}
