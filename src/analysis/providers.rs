use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::analysis::signal::SignalAction;
use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    Png,
    Jpeg,
    Webp,
}

impl ImageMime {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    fn from_data_url_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Uploaded chart image, opaque to the core.
///
/// Format validation belongs to the upstream file picker; the bytes are only
/// shared with the providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    bytes: Arc<[u8]>,
    mime: ImageMime,
}

impl ChartImage {
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, mime: ImageMime) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
        }
    }

    /// Accepts a `data:image/<type>;base64,<payload>` URL and keeps the base64
    /// payload as-is. Input without a recognised prefix is kept whole as PNG.
    #[must_use]
    pub fn from_data_url(data_url: &str) -> Self {
        let parsed = data_url
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
            .and_then(|(subtype, payload)| {
                ImageMime::from_data_url_subtype(subtype).map(|mime| (mime, payload))
            });

        match parsed {
            Some((mime, payload)) => Self::from_bytes(payload.as_bytes(), mime),
            None => Self::from_bytes(data_url.as_bytes(), ImageMime::Png),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Deep-reasoning pass: returns the model's raw structured-output text.
#[async_trait]
pub trait ReasoningAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ChartImage, context: &str) -> Result<String, ProviderError>;
}

/// Digitizer pass: returns the model's raw JSON text, or `None` when it
/// produced nothing.
#[async_trait]
pub trait ChartDigitizer: Send + Sync {
    async fn digitize(&self, image: &ChartImage) -> Result<Option<String>, ProviderError>;
}

#[async_trait]
impl<T: ReasoningAnalyzer + ?Sized> ReasoningAnalyzer for Arc<T> {
    async fn analyze(&self, image: &ChartImage, context: &str) -> Result<String, ProviderError> {
        (**self).analyze(image, context).await
    }
}

#[async_trait]
impl<T: ChartDigitizer + ?Sized> ChartDigitizer for Arc<T> {
    async fn digitize(&self, image: &ChartImage) -> Result<Option<String>, ProviderError> {
        (**self).digitize(image).await
    }
}

/// Notification sent to the messaging collaborator for a sniper signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SniperAlert {
    pub cycle: u64,
    pub action: SignalAction,
    pub stop_loss: String,
    pub message: String,
}

impl SniperAlert {
    #[must_use]
    pub fn new(cycle: u64, action: SignalAction, stop_loss: impl Into<String>) -> Self {
        let stop_loss = stop_loss.into();
        let message = format!(
            "SNIPER ALERT: engulfing pattern confirmed by volume. Recommended action: {action}. Stop: {stop_loss}."
        );
        Self {
            cycle,
            action,
            stop_loss,
            message,
        }
    }
}

/// Fire-and-forget alert delivery; must not block the analysis cycle.
pub trait AlertSink: Send + Sync {
    fn notify(&self, alert: SniperAlert);
}

/// Discards every alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAlertSink;

impl AlertSink for NoopAlertSink {
    fn notify(&self, _alert: SniperAlert) {}
}

impl AlertSink for UnboundedSender<SniperAlert> {
    fn notify(&self, alert: SniperAlert) {
        if let Err(err) = self.send(alert) {
            warn!(cycle = err.0.cycle, "alert receiver dropped; alert discarded");
        }
    }
}

impl<T: AlertSink + ?Sized> AlertSink for Arc<T> {
    fn notify(&self, alert: SniperAlert) {
        (**self).notify(alert);
    }
}
