use super::caps::CapSpec;
use super::disulfide::DisulfidePair;
use serde::{Deserialize, Serialize};

/// Options for [`prepare`](super::prepare).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Prefix of segment ids given to converted molecule instances.
    #[serde(default = "default_segment_prefix")]
    pub segment_prefix: String,
    /// Caps per segment. `None` caps every protein segment with `ACE`/`NME`.
    #[serde(default)]
    pub caps: Option<CapSpec>,
    /// Disulfide bridges to patch.
    #[serde(default)]
    pub disulfides: Vec<DisulfidePair>,
}

fn default_segment_prefix() -> String {
    "L".to_string()
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            segment_prefix: default_segment_prefix(),
            caps: None,
            disulfides: Vec::new(),
        }
    }
}
