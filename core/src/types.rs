//! Wire DTOs for the Cupom Verde integration API.
//!
//! # Design
//! Rust field names are English; serde renames map them onto the Portuguese
//! names the service speaks. `SubmitReceiptResult` holds the decoded upload
//! body as-is and only offers a typed view over it, so a field the service
//! omits, nulls, or retypes never turns an accepted receipt into an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /integracao/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceiptSubmission {
    /// Receipt XML, already base64-encoded by the caller.
    pub xml: String,
    /// Customer CPF, digits only.
    pub cpf: String,
}

/// How the partner must print the receipt after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrintMode {
    /// The receipt must not be printed.
    #[serde(rename = "NAO_IMPRIMIR")]
    DoNotPrint,
    /// The reduced receipt must be printed.
    #[serde(rename = "REDUZIDO")]
    Reduced,
    /// A mode this client version does not know yet.
    #[serde(untagged)]
    Other(String),
}

impl PrintMode {
    /// Map a wire value onto a mode. Unknown values are kept in `Other`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "NAO_IMPRIMIR" => PrintMode::DoNotPrint,
            "REDUZIDO" => PrintMode::Reduced,
            other => PrintMode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PrintMode::DoNotPrint => "NAO_IMPRIMIR",
            PrintMode::Reduced => "REDUZIDO",
            PrintMode::Other(raw) => raw.as_str(),
        }
    }
}

/// Success body of `POST /integracao/upload`, exactly as decoded.
///
/// Serializing it yields the same JSON the service sent. The accessors return
/// `None` when a field is missing, null, or not a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SubmitReceiptResult(Value);

impl SubmitReceiptResult {
    /// Access key of the fiscal receipt (`chave`).
    pub fn key(&self) -> Option<&str> {
        self.field("chave")
    }

    /// Print instruction (`impressao`).
    pub fn print_mode(&self) -> Option<PrintMode> {
        self.field("impressao").map(PrintMode::from_wire)
    }

    /// Message the partner configured for each issued receipt (`mensagem`).
    pub fn message(&self) -> Option<&str> {
        self.field("mensagem")
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name)?.as_str()
    }
}

impl From<Value> for SubmitReceiptResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Failure body shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<Value>,
}
