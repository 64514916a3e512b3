//! Request builder and response classifier for the Cupom Verde API.
//!
//! # Design
//! `CpvClient` holds only its immutable `ClientConfig` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! validates input and produces an `HttpRequest`, and a `parse_*` method that
//! consumes an `HttpResponse`. With the `transport` feature the two halves are
//! joined by `submit_with` / `cancel_with` over any `Transport`.

use tracing::debug;
#[cfg(feature = "transport")]
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::CpvError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "transport")]
use crate::transport::Transport;
use crate::types::{ErrorBody, ReceiptSubmission, SubmitReceiptResult};
use crate::validation::{validate_cpf, validate_receipt_key, validate_xml};

/// Header carrying the partner API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Which operation a response belongs to. Classification differs per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    Cancel,
}

/// Synchronous, stateless client for the Cupom Verde integration API.
#[derive(Debug, Clone)]
pub struct CpvClient {
    config: ClientConfig,
}

impl CpvClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validate a submission and build `POST /integracao/upload`.
    ///
    /// Checks run in order (XML, CPF present, CPF checksum) and stop at the
    /// first failure. The CPF is sent digits-only.
    pub fn build_submit(&self, xml: &str, cpf: &str) -> Result<HttpRequest, CpvError> {
        validate_xml(xml)?;
        let cpf = validate_cpf(cpf)?;

        let body = serde_json::to_string(&ReceiptSubmission {
            xml: xml.to_string(),
            cpf,
        })
        .map_err(|e| CpvError::Unexpected(Some(e.to_string())))?;

        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/integracao/upload", self.config.base_url()),
            headers,
            body: Some(body),
        })
    }

    /// Validate a receipt key and build `POST /integracao/cancelamentos/{key}`.
    pub fn build_cancel(&self, key: &str) -> Result<HttpRequest, CpvError> {
        validate_receipt_key(key)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!(
                "{}/integracao/cancelamentos/{}",
                self.config.base_url(),
                encode_path_segment(key)
            ),
            headers: self.auth_headers(),
            body: None,
        })
    }

    /// Decode a successful upload body, or classify the failure.
    ///
    /// Any JSON body is accepted on 2xx and returned unchanged.
    pub fn parse_submit(&self, response: HttpResponse) -> Result<SubmitReceiptResult, CpvError> {
        if !response.is_success() {
            return Err(classify(Operation::Submit, Some(&response)));
        }
        serde_json::from_str(&response.body).map_err(|e| {
            debug!(error = %e, "upload response body could not be decoded");
            CpvError::Unexpected(None)
        })
    }

    /// Accept any 2xx for a cancellation, or classify the failure.
    pub fn parse_cancel(&self, response: HttpResponse) -> Result<(), CpvError> {
        if !response.is_success() {
            return Err(classify(Operation::Cancel, Some(&response)));
        }
        Ok(())
    }

    /// Submit a receipt over `transport`: build, execute once, parse.
    #[cfg(feature = "transport")]
    pub fn submit_with<T: Transport>(
        &self,
        transport: &T,
        xml: &str,
        cpf: &str,
    ) -> Result<SubmitReceiptResult, CpvError> {
        let request = self.build_submit(xml, cpf)?;
        let response = execute(transport, Operation::Submit, request)?;
        self.parse_submit(response)
    }

    /// Cancel a receipt over `transport`: build, execute once, parse.
    #[cfg(feature = "transport")]
    pub fn cancel_with<T: Transport>(&self, transport: &T, key: &str) -> Result<(), CpvError> {
        let request = self.build_cancel(key)?;
        let response = execute(transport, Operation::Cancel, request)?;
        self.parse_cancel(response)
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![(API_KEY_HEADER.to_string(), self.config.api_key().to_string())]
    }
}

#[cfg(feature = "transport")]
fn execute<T: Transport>(
    transport: &T,
    operation: Operation,
    request: HttpRequest,
) -> Result<HttpResponse, CpvError> {
    debug!(?operation, url = %request.url, "sending request");
    transport.execute(request).map_err(|e| {
        warn!(?operation, error = %e, "request failed without a response");
        classify(operation, None)
    })
}

/// Map a failed exchange to a `CpvError`.
///
/// `None` means no response was received (network error, timeout), which
/// never matches a known status.
pub fn classify(operation: Operation, response: Option<&HttpResponse>) -> CpvError {
    let Some(response) = response else {
        return CpvError::Unexpected(None);
    };
    let message = error_message(&response.body);
    debug!(?operation, status = response.status, ?message, "classifying failed response");

    match (response.status, operation) {
        (401, _) => CpvError::Unauthorized(message),
        (404, _) => CpvError::NotFound(message),
        (409, Operation::Submit) => CpvError::Conflict(message),
        (422, _) => CpvError::Validation(message),
        _ => CpvError::Unexpected(message),
    }
}

/// The `message` string of a JSON error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.message? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
