//! `Cpv`: configure once with `init`, then `submit` / `cancel` many times.
//!
//! # Design
//! The facade owns an optional `CpvClient` (absent until the first successful
//! `init`) and a reusable transport. Each `init` replaces the whole client, so
//! the last successful call wins. `init` needs `&mut self`, which rules out
//! reconfiguring a value while calls on it are in flight; hosts sharing one
//! `Cpv` across threads must bring their own lock.

use tracing::info;

use crate::client::CpvClient;
use crate::config::{ClientConfig, REQUEST_TIMEOUT};
use crate::error::{CpvError, MSG_API_KEY_MISSING};
use crate::transport::{Transport, UreqTransport};
use crate::types::SubmitReceiptResult;

/// Cupom Verde SDK handle.
///
/// ```rust,no_run
/// use cpv_core::Cpv;
///
/// let mut cpv = Cpv::new();
/// cpv.init(Some("56c1f1b8-9b5c-41cd-b8f7-872be3500ad3"))?;
/// let result = cpv.submit("Q3Vwb21WZXJkZQ==", "529.982.247-25")?;
/// println!("{:?}", result.print_mode());
/// # Ok::<(), cpv_core::CpvError>(())
/// ```
#[derive(Debug)]
pub struct Cpv<T: Transport = UreqTransport> {
    client: Option<CpvClient>,
    transport: T,
}

impl Cpv<UreqTransport> {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new(REQUEST_TIMEOUT))
    }
}

impl Default for Cpv<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Cpv<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            client: None,
            transport,
        }
    }

    /// Configure the SDK. `api_key` wins over `CPV_API_KEY`.
    ///
    /// On failure the previous configuration, if any, stays in place.
    pub fn init(&mut self, api_key: Option<&str>) -> Result<(), CpvError> {
        let config = ClientConfig::from_env(api_key)?;
        self.configure(config);
        Ok(())
    }

    /// Install an already resolved configuration.
    pub fn configure(&mut self, config: ClientConfig) {
        info!(base_url = %config.base_url(), "Cupom Verde client configured");
        self.client = Some(CpvClient::new(config));
    }

    /// The API key of the current configuration.
    pub fn api_key(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.config().api_key())
    }

    /// Submit a base64-encoded receipt XML for customer `cpf`.
    pub fn submit(&self, xml: &str, cpf: &str) -> Result<SubmitReceiptResult, CpvError> {
        self.client()?.submit_with(&self.transport, xml, cpf)
    }

    /// Mark the receipt identified by `key` as cancelled.
    pub fn cancel(&self, key: &str) -> Result<(), CpvError> {
        self.client()?.cancel_with(&self.transport, key)
    }

    fn client(&self) -> Result<&CpvClient, CpvError> {
        self.client
            .as_ref()
            .ok_or_else(|| CpvError::Unauthorized(Some(MSG_API_KEY_MISSING.to_string())))
    }
}
