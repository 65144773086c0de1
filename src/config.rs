use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub payment_provider: String,
    pub payment_gateway_url: String,
    pub upi_id: String,
    pub upi_payee_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "luxestays.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            payment_provider: env::var("PAYMENT_PROVIDER")
                .unwrap_or_else(|_| "simulated".to_string()),
            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8090".to_string()),
            upi_id: env::var("UPI_ID").unwrap_or_else(|_| "luxestays@upi".to_string()),
            upi_payee_name: env::var("UPI_PAYEE_NAME").unwrap_or_else(|_| "LuxeStays".to_string()),
        }
    }
}
