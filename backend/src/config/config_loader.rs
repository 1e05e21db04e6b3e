use anyhow::{Context, Result};
use std::{fmt::Display, str::FromStr};

use super::{
    config_model::{BackendServer, Database, DotEnvyConfig, Email, PaymentGateway},
    stage::Stage,
};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_INVOICE_DURATION_SECS: u64 = 24 * 60 * 60;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<DotEnvyConfig> {
    let env = Env { lookup };

    let backend_server = BackendServer {
        port: env.parse("SERVER_PORT_BACKEND")?,
        body_limit: env.parse("SERVER_BODY_LIMIT")?,
        timeout: env.parse("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: env.required("DATABASE_URL")?,
        max_connections: env.parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
    };

    let payment_gateway = PaymentGateway {
        base_url: env.required("PAYMENT_GATEWAY_BASE_URL")?,
        secret_key: env.required("PAYMENT_GATEWAY_SECRET_KEY")?,
        callback_token: env.required("PAYMENT_GATEWAY_CALLBACK_TOKEN")?,
        success_redirect_url: env.required("PAYMENT_SUCCESS_REDIRECT_URL")?,
        failure_redirect_url: env.required("PAYMENT_FAILURE_REDIRECT_URL")?,
        invoice_duration_secs: env
            .parse_or("PAYMENT_INVOICE_DURATION_SECS", DEFAULT_INVOICE_DURATION_SECS)?,
        request_timeout_secs: env
            .parse_or("PAYMENT_GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS)?,
    };

    // The gateway call has to give up before the server aborts the request.
    if payment_gateway.request_timeout_secs == 0
        || payment_gateway.request_timeout_secs >= backend_server.timeout
    {
        anyhow::bail!(
            "PAYMENT_GATEWAY_TIMEOUT_SECS ({}) must be between 1 and SERVER_TIMEOUT ({}) exclusive",
            payment_gateway.request_timeout_secs,
            backend_server.timeout
        );
    }

    // E-mail is optional as a whole; a partial block is a configuration error.
    let email = match env.optional("EMAIL_API_URL") {
        Some(api_url) => Some(Email {
            api_url,
            api_key: env.required("EMAIL_API_KEY")?,
            from_address: env.required("EMAIL_FROM_ADDRESS")?,
        }),
        None => None,
    };

    let stage = match env.optional("STAGE") {
        Some(raw) => Stage::try_from(raw.as_str())?,
        None => Stage::default(),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        payment_gateway,
        email,
        stage,
    })
}

struct Env<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .with_context(|| format!("{key} is missing"))
    }

    fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required(key)?;
        raw.parse::<T>()
            .map_err(|err| anyhow::anyhow!("{key} is invalid: {err}"))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(key) {
            Some(_) => self.parse(key),
            None => Ok(default),
        }
    }
}
