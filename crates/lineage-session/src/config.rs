//! Session configuration.

use lineage_core::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use lineage_graph::LayoutConfig;
use serde::{Deserialize, Serialize};

/// Canvas size and layout geometry for a session.
///
/// Every field has a default, so a partial config file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub layout: LayoutConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            layout: LayoutConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"canvasWidth": 1200, "layout": {"spouseGap": 40}}"#).unwrap();
        assert_eq!(config.canvas_width, 1200.0);
        assert_eq!(config.canvas_height, DEFAULT_CANVAS_HEIGHT);
        assert_eq!(config.layout.spouse_gap, 40.0);
        assert_eq!(config.layout.node_width, 224.0);
    }
}
