use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub payment_gateway: PaymentGateway,
    pub email: Option<Email>,
    pub stage: Stage,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Megabytes.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct PaymentGateway {
    pub base_url: String,
    pub secret_key: String,
    pub callback_token: String,
    pub success_redirect_url: String,
    pub failure_redirect_url: String,
    pub invoice_duration_secs: u64,
    /// Seconds; always below `BackendServer::timeout`.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Email {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}
