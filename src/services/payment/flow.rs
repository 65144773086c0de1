use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::models::BookingQuote;
use crate::services::identity::UserIdentity;

/// Fixed confirmation budget. No extension mechanism.
pub const PAYMENT_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    Pending,
    Completed,
    Expired,
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Pending => "pending",
            FlowState::Completed => "completed",
            FlowState::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlowState::Pending)
    }
}

#[derive(Debug, PartialEq)]
pub enum TransitionError {
    /// The completion side effects already ran for this flow.
    AlreadyCompleted,
    /// Confirmation arrived at or after the deadline. Reported as an
    /// anomaly by the caller, never applied.
    Expired,
}

/// One time-boxed payment confirmation. Exactly one of `Completed` or
/// `Expired` is reachable per instance; whichever terminal state is entered
/// first wins and the other transition is discarded.
#[derive(Debug, Clone)]
pub struct PaymentFlow {
    pub id: String,
    pub user: UserIdentity,
    pub quote: BookingQuote,
    pub resort_name: String,
    pub stay_option_name: String,
    pub state: FlowState,
    pub started_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub booking_id: Option<String>,
}

impl PaymentFlow {
    pub fn new(
        id: String,
        user: UserIdentity,
        quote: BookingQuote,
        resort_name: String,
        stay_option_name: String,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            user,
            quote,
            resort_name,
            stay_option_name,
            state: FlowState::Pending,
            started_at: now,
            expires_at: now + Duration::seconds(PAYMENT_WINDOW_SECS),
            booking_id: None,
        }
    }

    pub fn seconds_left(&self, now: NaiveDateTime) -> i64 {
        if self.state != FlowState::Pending {
            return 0;
        }
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Pending past the deadline becomes Expired. Returns true only for the
    /// call that performs the transition, so the failure callback cannot
    /// fire twice.
    pub fn expire_if_due(&mut self, now: NaiveDateTime) -> bool {
        if self.state == FlowState::Pending && now >= self.expires_at {
            self.state = FlowState::Expired;
            return true;
        }
        false
    }

    /// Apply a confirmed payment. A success racing the deadline loses:
    /// if the budget ran out before it was applied, the flow expires here
    /// and the confirmation is rejected.
    pub fn complete(&mut self, now: NaiveDateTime) -> Result<(), TransitionError> {
        match self.state {
            FlowState::Completed => Err(TransitionError::AlreadyCompleted),
            FlowState::Expired => Err(TransitionError::Expired),
            FlowState::Pending => {
                if now >= self.expires_at {
                    self.state = FlowState::Expired;
                    return Err(TransitionError::Expired);
                }
                self.state = FlowState::Completed;
                Ok(())
            }
        }
    }
}

/// Summary of a flow expired by the countdown tick.
pub struct ExpiredFlow {
    pub id: String,
    pub user_id: String,
}

/// All live flows, keyed by id. Transitions are serialized by the mutex
/// this sits behind in app state.
#[derive(Default)]
pub struct FlowRegistry {
    flows: HashMap<String, PaymentFlow>,
}

impl FlowRegistry {
    pub fn insert(&mut self, flow: PaymentFlow) {
        self.flows.insert(flow.id.clone(), flow);
    }

    pub fn get(&self, id: &str) -> Option<&PaymentFlow> {
        self.flows.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PaymentFlow> {
        self.flows.get_mut(id)
    }

    /// Abandonment: drops the countdown context. Nothing has been written
    /// for a non-completed flow, so no compensation is needed.
    pub fn remove(&mut self, id: &str) -> Option<PaymentFlow> {
        self.flows.remove(id)
    }

    pub fn expire_due(&mut self, now: NaiveDateTime) -> Vec<ExpiredFlow> {
        let mut expired = vec![];
        for flow in self.flows.values_mut() {
            if flow.expire_if_due(now) {
                expired.push(ExpiredFlow {
                    id: flow.id.clone(),
                    user_id: flow.user.id.clone(),
                });
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn test_flow() -> PaymentFlow {
        PaymentFlow::new(
            "flow-1".to_string(),
            UserIdentity {
                id: "u1".to_string(),
                name: None,
                email: None,
            },
            BookingQuote {
                resort_id: "r1".to_string(),
                stay_option_id: "so1".to_string(),
                check_in: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
                guest_count: 2,
                nights: 3,
                total_amount: 15000.0,
            },
            "Misty Meadows".to_string(),
            "Deluxe".to_string(),
            t0(),
        )
    }

    #[test]
    fn test_countdown_budget_is_300_seconds() {
        let flow = test_flow();
        assert_eq!(flow.seconds_left(t0()), 300);
        assert_eq!(flow.seconds_left(t0() + Duration::seconds(290)), 10);
        assert_eq!(flow.seconds_left(t0() + Duration::seconds(400)), 0);
    }

    #[test]
    fn test_expiry_fires_exactly_once() {
        let mut flow = test_flow();
        let due = t0() + Duration::seconds(PAYMENT_WINDOW_SECS);

        assert!(!flow.expire_if_due(t0() + Duration::seconds(299)));
        assert_eq!(flow.state, FlowState::Pending);

        assert!(flow.expire_if_due(due));
        assert_eq!(flow.state, FlowState::Expired);

        // A second tick must not report the transition again.
        assert!(!flow.expire_if_due(due + Duration::seconds(1)));
    }

    #[test]
    fn test_early_success_completes_and_blocks_expiry() {
        let mut flow = test_flow();
        flow.complete(t0() + Duration::seconds(10)).unwrap();
        assert_eq!(flow.state, FlowState::Completed);

        assert!(!flow.expire_if_due(t0() + Duration::seconds(400)));
        assert_eq!(flow.state, FlowState::Completed);

        // And the completion side effects cannot run twice.
        assert_eq!(
            flow.complete(t0() + Duration::seconds(20)),
            Err(TransitionError::AlreadyCompleted)
        );
    }

    #[test]
    fn test_late_success_after_expiry_is_rejected() {
        let mut flow = test_flow();
        assert!(flow.expire_if_due(t0() + Duration::seconds(300)));

        let result = flow.complete(t0() + Duration::seconds(301));
        assert_eq!(result, Err(TransitionError::Expired));
        assert_eq!(flow.state, FlowState::Expired);
    }

    #[test]
    fn test_success_racing_the_deadline_loses() {
        // The tick has not run yet, but the budget is spent: the flow
        // expires inside complete() and the confirmation is discarded.
        let mut flow = test_flow();
        let result = flow.complete(t0() + Duration::seconds(300));
        assert_eq!(result, Err(TransitionError::Expired));
        assert_eq!(flow.state, FlowState::Expired);
    }

    #[test]
    fn test_registry_expire_due_reports_each_flow_once() {
        let mut registry = FlowRegistry::default();
        registry.insert(test_flow());
        let mut second = test_flow();
        second.id = "flow-2".to_string();
        registry.insert(second);

        let due = t0() + Duration::seconds(PAYMENT_WINDOW_SECS);
        assert_eq!(registry.expire_due(due).len(), 2);
        assert_eq!(registry.expire_due(due + Duration::seconds(1)).len(), 0);
    }

    #[test]
    fn test_registry_remove_stops_the_countdown() {
        let mut registry = FlowRegistry::default();
        registry.insert(test_flow());

        assert!(registry.remove("flow-1").is_some());
        let due = t0() + Duration::seconds(PAYMENT_WINDOW_SECS);
        assert!(registry.expire_due(due).is_empty());
    }
}
