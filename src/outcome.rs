use serde::{Deserialize, Serialize};

/// Status code recorded when a probe got no usable response.
pub const FAILED_STATUS: i32 = -1;

/// Append-only record of every outcome submitted during a run, in arrival order.
/// `None` entries are nil placeholders and are skipped by the summary.
pub type ResultCollection = Vec<Option<Outcome>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latency {
    /// Time to first byte in milliseconds.
    #[serde(rename = "TTFB")]
    pub ttfb_ms: i64,
}

/// Result of one worker probing one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Outcome {
    pub target: String,
    pub status_code: i32,
    pub latency: Latency,
    #[serde(default)]
    pub error: Option<String>,
}

impl Outcome {
    pub fn succeeded(target: impl Into<String>, status_code: i32, ttfb_ms: i64) -> Self {
        Self {
            target: target.into(),
            status_code,
            latency: Latency { ttfb_ms },
            error: None,
        }
    }

    pub fn failed(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status_code: FAILED_STATUS,
            ..Default::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status_code == FAILED_STATUS
    }
}
