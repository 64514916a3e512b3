//! Error types for the Cupom Verde client.
//!
//! # Design
//! Five kinds, one per way a call can fail from the partner's point of view.
//! Every variant carries the human-readable message reported by the remote
//! service (or a fixed local validation message) when one exists, so the host
//! application can show it to the operator verbatim.

use thiserror::Error;

pub(crate) const MSG_API_KEY_MISSING: &str =
    "API Key não foi informada por parâmetro ou por variavel de ambiente.";
pub(crate) const MSG_API_KEY_INVALID: &str = "API Key não é válida, informe uma Api Key válida.";
pub(crate) const MSG_XML_MISSING: &str = "XML não informado.";
pub(crate) const MSG_CPF_MISSING: &str = "cpfCliente não informado, informe um cpf válido.";
pub(crate) const MSG_CPF_INVALID: &str = "cpfCliente inválido, informe um cpf válido.";
pub(crate) const MSG_KEY_MISSING: &str = "Chave não informada.";

/// Errors returned by every client operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpvError {
    /// Missing or malformed credentials, or the service rejected the API key (401).
    #[error("{}", display(.0, "unauthorized"))]
    Unauthorized(Option<String>),

    /// The store or receipt referenced by the call does not exist (404).
    #[error("{}", display(.0, "not found"))]
    NotFound(Option<String>),

    /// A receipt with the same access key was already submitted (409 on submit).
    #[error("{}", display(.0, "conflict"))]
    Conflict(Option<String>),

    /// Local input validation failed, or the service rejected the payload (422).
    #[error("{}", display(.0, "validation failed"))]
    Validation(Option<String>),

    /// Any other status, a transport failure, or a malformed response.
    #[error("{}", display(.0, "unexpected error"))]
    Unexpected(Option<String>),
}

/// Discriminant of [`CpvError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Conflict,
    Validation,
    Unexpected,
}

impl CpvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CpvError::Unauthorized(_) => ErrorKind::Unauthorized,
            CpvError::NotFound(_) => ErrorKind::NotFound,
            CpvError::Conflict(_) => ErrorKind::Conflict,
            CpvError::Validation(_) => ErrorKind::Validation,
            CpvError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// The message supplied by the service or by local validation, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            CpvError::Unauthorized(m)
            | CpvError::NotFound(m)
            | CpvError::Conflict(m)
            | CpvError::Validation(m)
            | CpvError::Unexpected(m) => m.as_deref(),
        }
    }

    pub(crate) fn validation(message: &str) -> Self {
        CpvError::Validation(Some(message.to_string()))
    }
}

fn display(message: &Option<String>, fallback: &'static str) -> String {
    match message {
        Some(m) => m.clone(),
        None => fallback.to_string(),
    }
}
