use serde::{Deserialize, Serialize};

use crate::error::RecorderError;
use crate::scrollbar::{CorrectionEntry, CorrectionTable};

/// Recorder settings supplied by the embedding SDK at start time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Subscribe to `visualViewport` resize/scroll and emit visual-viewport
    /// records. Off unless the SDK opts in.
    pub record_visual_viewport: bool,
    /// Emit the first measurement of each tracked quantity at recording
    /// start instead of only recording it as the comparison baseline.
    pub emit_initial_snapshot: bool,
    /// Extra scrollbar corrections, merged over the built-in table.
    pub scrollbar_corrections: Vec<CorrectionEntry>,
}

impl RecorderConfig {
    pub fn from_json(json: &str) -> Result<Self, RecorderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_visual_viewport(mut self, enabled: bool) -> Self {
        self.record_visual_viewport = enabled;
        self
    }

    pub fn with_initial_snapshot(mut self, enabled: bool) -> Self {
        self.emit_initial_snapshot = enabled;
        self
    }

    pub fn correction_table(&self) -> CorrectionTable {
        CorrectionTable::with_overrides(&self.scrollbar_corrections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Browser, Environment, Platform};
    use crate::scrollbar::Correction;

    #[test]
    fn empty_json_gives_defaults() {
        let config = RecorderConfig::from_json("{}").unwrap();
        assert_eq!(config, RecorderConfig::default());
        assert!(!config.record_visual_viewport);
        assert!(!config.emit_initial_snapshot);
    }

    #[test]
    fn parses_camel_case_fields() {
        let config = RecorderConfig::from_json(
            r#"{
                "recordVisualViewport": true,
                "scrollbarCorrections": [
                    {"browser": "edge", "platform": "windows", "correction": {"fixed": 17}}
                ]
            }"#,
        )
        .unwrap();
        assert!(config.record_visual_viewport);
        let table = config.correction_table();
        assert_eq!(
            table.lookup(Environment::new(Browser::Edge, Platform::Windows)),
            Correction::Fixed(17)
        );
        assert_eq!(
            table.lookup(Environment::new(Browser::Chrome, Platform::MacOs)),
            Correction::Measure
        );
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = RecorderConfig::from_json("{\"recordVisualViewport\": 3}").unwrap_err();
        assert!(matches!(err, RecorderError::Config(_)));
    }
}
