//! The request/response link to the instrument.
//!
//! The facade talks to a [`Transport`] rather than to a concrete client so
//! that the SCPI layer can be exercised against a scripted endpoint in tests.
//! The shipped implementation drives a VXI-11 device link over the LAN.

use std::time::Duration;

use tokio_vxi11::DeviceClient;
use tracing::debug;

use crate::error::{InstrumentError, Result};

const MAX_READ: u32 = 4096;

/// Default response timeout for a freshly opened link.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// One exclusively owned command channel to the instrument.
///
/// `query` is a write followed by one response read. `read` fetches the next
/// response on its own, for commands whose payload arrives separately from
/// the query that requested it. Every method maps link failures to
/// [`InstrumentError::Communication`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn write(&mut self, command: &str) -> Result<()>;
    async fn query(&mut self, command: &str) -> Result<String>;
    async fn read(&mut self) -> Result<String>;
    async fn close(&mut self) -> Result<()>;
}

/// VXI-11 transport over a LAN-attached instrument.
pub struct Vxi11Transport {
    inner: DeviceClient,
}

impl Vxi11Transport {
    pub async fn connect(host: &str, resource: &str) -> Result<Self> {
        Self::connect_with_timeout(host, resource, DEFAULT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        host: &str,
        resource: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let inner = DeviceClient::connect_with_timeout(host, resource, timeout)
            .await
            .map_err(|e| InstrumentError::Communication(format!("connect to {host}: {e}")))?;
        Ok(Self { inner })
    }

    async fn read_response(&mut self) -> Result<String> {
        let resp = self
            .inner
            .read(MAX_READ)
            .await
            .map_err(|e| InstrumentError::Communication(e.to_string()))?;
        let raw = String::from_utf8(resp)
            .map_err(|e| InstrumentError::Communication(format!("non-UTF-8 response: {e}")))?;
        let trimmed = raw.trim_matches(char::from(0)).trim().to_string();

        debug!("SCPI result <- {}", trimmed);

        if trimmed.is_empty() {
            return Err(InstrumentError::Communication(
                "empty response from device".into(),
            ));
        }

        Ok(trimmed)
    }
}

impl Transport for Vxi11Transport {
    async fn write(&mut self, command: &str) -> Result<()> {
        debug!("SCPI write  -> {}", command);
        let line = format!("{command}\n");
        self.inner
            .write(line.as_bytes())
            .await
            .map_err(|e| InstrumentError::Communication(format!("failed to send {command:?}: {e}")))?;
        Ok(())
    }

    async fn query(&mut self, command: &str) -> Result<String> {
        self.write(command).await?;
        self.read_response().await
    }

    async fn read(&mut self) -> Result<String> {
        self.read_response().await
    }

    async fn close(&mut self) -> Result<()> {
        self.inner
            .close()
            .await
            .map_err(|e| InstrumentError::Communication(e.to_string()))?;
        Ok(())
    }
}
