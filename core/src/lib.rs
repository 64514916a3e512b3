//! Client SDK for the Cupom Verde fiscal-receipt aggregation service.
//!
//! # Overview
//! Partners submit base64-encoded fiscal receipt XML (cupom fiscal) tied to a
//! customer CPF, and cancel previously submitted receipts by access key.
//! Inputs are validated locally; HTTP failures are classified into the five
//! kinds of [`CpvError`].
//!
//! # Design
//! - `CpvClient` is sans-IO: `build_*` produces an `HttpRequest`, `parse_*`
//!   consumes an `HttpResponse`. The FFI crate uses this half directly.
//! - The `transport` feature (default) adds a blocking `ureq` transport with
//!   the fixed 5 s timeout and the [`Cpv`] facade with `init` / `submit` /
//!   `cancel`.
//! - No global state: every client value owns its configuration.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "transport")]
pub mod sdk;
#[cfg(feature = "transport")]
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{classify, CpvClient, Operation};
pub use config::ClientConfig;
pub use error::{CpvError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "transport")]
pub use sdk::Cpv;
#[cfg(feature = "transport")]
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{PrintMode, ReceiptSubmission, SubmitReceiptResult};
