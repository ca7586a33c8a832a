//! Price lookup through a local text-generation model.
//!
//! The pipeline is strictly one-directional and one-shot per call:
//! prompt -> raw process output -> sanitized text -> extracted price token.
//! No stage keeps state across invocations.

pub mod bridge;
pub mod extract;
pub mod sanitize;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::Pricing;

pub use bridge::{BridgeError, BridgeOutput, ModelBridge};
pub use extract::{extract_price, PRICE_PATTERN};
pub use sanitize::strip_terminal_noise;

const PROMPT_PREFIX: &str = "provide price for book ";
const PROMPT_BY: &str = " by ";

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("price lookup capacity is shut down")]
    Capacity,
}

/// Asks the model for a book price, with a bounded number of concurrent
/// subprocesses and a per-call deadline.
pub struct PriceOracle {
    bridge: ModelBridge,
    permits: Arc<Semaphore>,
    enabled: bool,
}

impl PriceOracle {
    pub fn new(settings: &Pricing) -> Self {
        Self {
            bridge: ModelBridge::new(
                settings.program.clone(),
                settings.args.clone(),
                Duration::from_secs(settings.timeout_secs),
            ),
            permits: Arc::new(Semaphore::new(settings.max_concurrent)),
            enabled: settings.enabled,
        }
    }

    /// The prompt sent for a `(title, author)` pair.
    pub fn prompt_for(title: &str, author: &str) -> String {
        format!("{PROMPT_PREFIX}{title}{PROMPT_BY}{author}")
    }

    /// Ask the model once. `Ok(None)` means the model answered but produced
    /// no price token; `Err` means the bridge itself failed. Neither is
    /// fatal to the surrounding request.
    pub async fn price_for(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Option<String>, PriceError> {
        if !self.enabled {
            return Ok(None);
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PriceError::Capacity)?;

        let prompt = Self::prompt_for(title, author);
        let output = self.bridge.run(&prompt).await?;

        // Per-line stripping can miss a sequence split across a read
        // boundary, so the joined buffer gets one more pass before
        // extraction.
        let text = strip_terminal_noise(&output.text);
        let price = extract_price(&text).map(str::to_owned);
        debug!(title, author, price = price.as_deref(), "price lookup finished");
        Ok(price)
    }

    /// [`price_for`](Self::price_for) degraded to the external contract: a
    /// failed lookup is logged and becomes an absent price, never an error.
    pub async fn price_or_none(&self, title: &str, author: &str) -> Option<String> {
        match self.price_for(title, author).await {
            Ok(price) => price,
            Err(e) => {
                warn!(title, author, "price lookup failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_concatenates_title_and_author() {
        assert_eq!(
            PriceOracle::prompt_for("Dune", "Frank Herbert"),
            "provide price for book Dune by Frank Herbert"
        );
    }
}
