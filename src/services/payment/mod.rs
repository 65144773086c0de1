pub mod flow;
pub mod gateway;
pub mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::services::notify::NotifyKind;
use crate::state::AppState;

/// Result of one external payment-status check. Anything that is not a
/// definitive success keeps the flow waiting; transport failures come back
/// as `Err` and are surfaced to the caller without touching the flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaymentCheck {
    Success,
    Pending,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn check_status(&self, reference: &str, amount: f64) -> anyhow::Result<PaymentCheck>;
}

/// UPI deep link for the payment apps, `upi://pay?...` with the booking
/// reference in the transaction note.
pub fn upi_link(upi_id: &str, payee_name: &str, amount: f64, note: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={:.2}&cu=INR&tn={}",
        percent_encode(upi_id),
        percent_encode(payee_name),
        amount,
        percent_encode(note),
    )
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Once-a-second countdown tick. The only recurring background activity:
/// it moves due pending flows to expired and fires their failure
/// notification. Completion never happens here.
pub async fn run_expiry_loop(state: Arc<AppState>) {
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        tick.tick().await;
        let now = Utc::now().naive_utc();
        let expired = {
            let mut payments = state.payments.lock().unwrap();
            payments.expire_due(now)
        };
        for flow in expired {
            tracing::info!(flow_id = %flow.id, user_id = %flow.user_id, "payment window expired");
            state.notifier.notify(
                NotifyKind::Error,
                "Payment Failed",
                "Please try booking again.",
            );
        }
    }
}
