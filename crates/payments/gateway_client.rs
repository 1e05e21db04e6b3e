use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

use crate::domain::value_objects::payments::{GatewayInvoice, GatewayInvoiceRequest};

/// Invoice-style payment gateway client built on reqwest.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    success_redirect_url: String,
    failure_redirect_url: String,
    invoice_duration_secs: u64,
}

#[derive(Debug, Serialize)]
struct CreateInvoiceBody<'a> {
    external_id: &'a str,
    amount: i64,
    payer_email: &'a str,
    description: &'a str,
    invoice_duration: u64,
    success_redirect_url: &'a str,
    failure_redirect_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}

impl GatewayClient {
    pub fn new(
        base_url: String,
        secret_key: String,
        success_redirect_url: String,
        failure_redirect_url: String,
        invoice_duration_secs: u64,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
            success_redirect_url,
            failure_redirect_url,
            invoice_duration_secs,
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (gateway_error_code, gateway_message) =
            match serde_json::from_str::<GatewayErrorBody>(&body) {
                Ok(parsed) => (parsed.error_code, parsed.message),
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            gateway_error_code = ?gateway_error_code,
            gateway_message = ?gateway_message,
            response_body = %body,
            context = %context,
            "payment gateway request failed"
        );

        anyhow::bail!(
            "payment gateway request failed: {} (status {}, error_code={:?})",
            context,
            status,
            gateway_error_code
        );
    }

    /// Opens a hosted invoice and returns its id and payment page URL.
    pub async fn create_invoice(&self, request: &GatewayInvoiceRequest) -> Result<GatewayInvoice> {
        let body = CreateInvoiceBody {
            external_id: &request.external_id,
            amount: request.amount,
            payer_email: &request.payer_email,
            description: &request.description,
            invoice_duration: self.invoice_duration_secs,
            success_redirect_url: &self.success_redirect_url,
            failure_redirect_url: &self.failure_redirect_url,
        };

        let resp = self
            .http
            .post(format!("{}/v2/invoices", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create invoice").await?;

        let invoice: GatewayInvoice = resp.json().await?;
        Ok(invoice)
    }
}
