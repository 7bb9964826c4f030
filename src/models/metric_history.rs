//! Step history for metrics stored in a rich_text cell.
//!
//! Encoded as versioned JSON: `{"v":1,"points":[[step,value],...]}` where `step`
//! may be `null`. Decoding goes through serde only; stored text is never evaluated.

use serde::{Deserialize, Serialize};

pub const HISTORY_FORMAT_VERSION: u32 = 1;

/// One logged metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint(pub Option<u64>, pub f64);

impl MetricPoint {
    pub fn step(&self) -> Option<u64> {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }
}

/// Ordered, append-only list of metric points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricHistory {
    points: Vec<MetricPoint>,
}

#[derive(Serialize, Deserialize)]
struct EncodedHistory {
    v: u32,
    points: Vec<MetricPoint>,
}

#[derive(Deserialize)]
struct VersionProbe {
    v: u32,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode stored text. Empty (or whitespace-only) text is an empty history.
    pub fn decode(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let probe: VersionProbe =
            serde_json::from_str(text).map_err(|e| format!("unreadable history: {}", e))?;
        if probe.v != HISTORY_FORMAT_VERSION {
            return Err(format!("unsupported history version {}", probe.v));
        }
        let encoded: EncodedHistory =
            serde_json::from_str(text).map_err(|e| format!("unreadable history: {}", e))?;
        Ok(Self {
            points: encoded.points,
        })
    }

    pub fn encode(&self) -> String {
        let encoded = EncodedHistory {
            v: HISTORY_FORMAT_VERSION,
            points: self.points.clone(),
        };
        // Plain numbers only; serialization does not fail.
        serde_json::to_string(&encoded).unwrap_or_default()
    }

    pub fn push(&mut self, step: Option<u64>, value: f64) {
        self.points.push(MetricPoint(step, value));
    }

    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
