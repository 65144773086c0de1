use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::identity::IdentityProvider;
use crate::services::notify::Notifier;
use crate::services::payment::flow::FlowRegistry;
use crate::services::payment::PaymentProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub payments: Mutex<FlowRegistry>,
    pub payment_provider: Box<dyn PaymentProvider>,
    pub identity: Box<dyn IdentityProvider>,
    pub notifier: Box<dyn Notifier>,
}
