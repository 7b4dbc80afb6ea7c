use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::metric::round_to;
use crate::domain::{
    DomainError, Metadata, Metric, MetricName, MetricValue, ModelArtifact, SizeScore,
};

const GB: f64 = 1_000_000_000.0;

/// File extensions counted as model weights
const WEIGHT_EXTENSIONS: [&str; 9] = [
    ".bin",
    ".safetensors",
    ".pt",
    ".pth",
    ".h5",
    ".ckpt",
    ".onnx",
    ".msgpack",
    ".gguf",
];

/// Size (bytes) at or below which a device scores 1.0, and at or above
/// which it scores 0.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeThreshold {
    pub full: f64,
    pub zero: f64,
}

impl SizeThreshold {
    const fn gb(full: f64, zero: f64) -> Self {
        Self {
            full: full * GB,
            zero: zero * GB,
        }
    }

    fn score(&self, bytes: f64) -> f64 {
        if bytes <= self.full {
            1.0
        } else if bytes >= self.zero {
            0.0
        } else {
            round_to((self.zero - bytes) / (self.zero - self.full), 2)
        }
    }
}

pub const RASPBERRY_PI: SizeThreshold = SizeThreshold::gb(0.5, 2.0);
pub const JETSON_NANO: SizeThreshold = SizeThreshold::gb(1.0, 4.0);
pub const DESKTOP_PC: SizeThreshold = SizeThreshold::gb(4.0, 16.0);
pub const AWS_SERVER: SizeThreshold = SizeThreshold::gb(16.0, 64.0);

/// How deployable the model weights are on each hardware class
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeScoreMetric;

impl SizeScoreMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for SizeScoreMetric {
    fn name(&self) -> MetricName {
        MetricName::SizeScore
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let Some(bytes) = weight_bytes(model.hf_metadata().await) else {
            debug!(model = model.name(), "Model size unknown");
            return Ok(MetricValue::Size(SizeScore::default()));
        };

        let bytes = bytes as f64;
        Ok(MetricValue::Size(SizeScore {
            raspberry_pi: RASPBERRY_PI.score(bytes),
            jetson_nano: JETSON_NANO.score(bytes),
            desktop_pc: DESKTOP_PC.score(bytes),
            aws_server: AWS_SERVER.score(bytes),
        }))
    }

    fn fallback(&self) -> MetricValue {
        MetricValue::Size(SizeScore::default())
    }
}

/// Size of the model weights in bytes
///
/// Sources, in order: `usedStorage`, the summed sizes of weight files among
/// `siblings`, and the safetensors parameter count at two bytes each.
pub fn weight_bytes(hf: &Metadata) -> Option<u64> {
    if let Some(used) = hf.get_u64("usedStorage").filter(|b| *b > 0) {
        return Some(used);
    }

    let siblings: u64 = hf
        .get_array("siblings")
        .iter()
        .filter(|file| {
            file.get("rfilename")
                .and_then(Value::as_str)
                .is_some_and(|name| {
                    let name = name.to_lowercase();
                    WEIGHT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
                })
        })
        .filter_map(|file| file.get("size").and_then(Value::as_u64))
        .sum();
    if siblings > 0 {
        return Some(siblings);
    }

    hf.get_object("safetensors")
        .and_then(|st| st.get("total"))
        .and_then(Value::as_u64)
        .filter(|params| *params > 0)
        .map(|params| params.saturating_mul(2))
}
