//! In-process stand-in for the Cupom Verde integration API.
//!
//! Implements the two endpoints partners call, with the status codes and
//! `{"message": ...}` failure bodies the real service uses, backed by an
//! in-memory receipt table.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// Largest accepted base64 XML payload, in bytes.
pub const MAX_XML_BYTES: usize = 1024 * 1024;

/// Digits in a fiscal receipt access key.
const ACCESS_KEY_LEN: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Deserialize)]
pub struct UploadBody {
    pub xml: String,
    #[serde(default)]
    pub cpf: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResult {
    pub chave: String,
    pub impressao: String,
    pub mensagem: String,
}

pub struct MockState {
    api_keys: HashSet<String>,
    receipts: RwLock<HashMap<String, ReceiptStatus>>,
}

pub type Db = Arc<MockState>;

pub fn app<I, S>(api_keys: I) -> Router
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let state: Db = Arc::new(MockState {
        api_keys: api_keys.into_iter().map(Into::into).collect(),
        receipts: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/integracao/upload", post(upload))
        .route("/integracao/cancelamentos/{chave}", post(cancel))
        .with_state(state)
}

pub async fn run<I, S>(listener: TcpListener, api_keys: I) -> Result<(), std::io::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    axum::serve(listener, app(api_keys)).await
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    match key {
        Some(key) if state.api_keys.contains(key) => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Api Key inválida.")),
    }
}

async fn upload(State(db): State<Db>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = authorize(&db, &headers) {
        return resp;
    }

    let input: UploadBody = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(_) => return failure(StatusCode::UNPROCESSABLE_ENTITY, "Corpo da requisição inválido."),
    };
    if input.xml.is_empty() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "XML não informado.");
    }
    if input.xml.len() > MAX_XML_BYTES {
        return failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "O XML do cupom fiscal não pode ser maior que 1 Mb.",
        );
    }
    let Some(chave) = STANDARD
        .decode(input.xml.as_bytes())
        .ok()
        .and_then(|xml| find_access_key(&String::from_utf8_lossy(&xml)))
    else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "XML do cupom fiscal inválido.");
    };

    let mut receipts = db.receipts.write().await;
    if receipts.contains_key(&chave) {
        return failure(StatusCode::CONFLICT, "Cupom fiscal já enviado.");
    }
    receipts.insert(chave.clone(), ReceiptStatus::Active);
    info!(%chave, anonymous = input.cpf.is_empty(), "receipt uploaded");

    let impressao = if input.cpf.is_empty() {
        "REDUZIDO"
    } else {
        "NAO_IMPRIMIR"
    };
    let result = UploadResult {
        chave,
        impressao: impressao.to_string(),
        mensagem: "Obrigado por usar o Cupom Verde!".to_string(),
    };
    (StatusCode::OK, Json(result)).into_response()
}

async fn cancel(State(db): State<Db>, headers: HeaderMap, Path(chave): Path<String>) -> Response {
    if let Err(resp) = authorize(&db, &headers) {
        return resp;
    }

    let mut receipts = db.receipts.write().await;
    match receipts.get_mut(&chave) {
        None => failure(StatusCode::NOT_FOUND, "Cupom fiscal não encontrado."),
        Some(ReceiptStatus::Cancelled) => {
            failure(StatusCode::UNPROCESSABLE_ENTITY, "Cupom fiscal já cancelado.")
        }
        Some(status) => {
            *status = ReceiptStatus::Cancelled;
            info!(%chave, "receipt cancelled");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// First run of exactly 44 consecutive digits in the XML text.
pub fn find_access_key(xml: &str) -> Option<String> {
    xml.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == ACCESS_KEY_LEN)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_key_found_in_id_attribute() {
        let xml = r#"<CFe><infCFe Id="CFe35200000000000000000000000000000000000000001" versao="0.08"/></CFe>"#;
        assert_eq!(
            find_access_key(xml).as_deref(),
            Some("35200000000000000000000000000000000000000001")
        );
    }

    #[test]
    fn access_key_requires_exact_length() {
        assert!(find_access_key("<CFe>123</CFe>").is_none());
        let too_long = "9".repeat(45);
        assert!(find_access_key(&too_long).is_none());
    }

    #[test]
    fn upload_body_cpf_is_optional() {
        let input: UploadBody = serde_json::from_str(r#"{"xml":"abc"}"#).unwrap();
        assert_eq!(input.xml, "abc");
        assert!(input.cpf.is_empty());
    }

    #[test]
    fn upload_body_rejects_missing_xml() {
        let result: Result<UploadBody, _> = serde_json::from_str(r#"{"cpf":"1"}"#);
        assert!(result.is_err());
    }
}
