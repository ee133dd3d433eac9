//! Scrollbar compensation for hosts that count the scrollbar in
//! `innerWidth`/`innerHeight`.
//!
//! Only desktop Chrome on macOS is known to do this. Other scrollbar-inclusive
//! environments are not enumerated; add them to the table through
//! configuration rather than guessing in the detection logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::host::{Browser, Environment, GeometryHost, Platform};

/// How to obtain the correction for one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    /// Measure the scrollbar with an offscreen probe element.
    Measure,
    /// Subtract a known pixel count.
    Fixed(u32),
    /// No correction (used to override a default entry).
    Disabled,
}

/// One configurable row of the correction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub browser: Browser,
    pub platform: Platform,
    pub correction: Correction,
}

/// Strategy lookup keyed by `(browser, platform)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionTable {
    entries: HashMap<Environment, Correction>,
}

impl CorrectionTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Default table merged with `overrides` (later entries win).
    pub fn with_overrides(overrides: &[CorrectionEntry]) -> Self {
        let mut table = Self::default();
        for entry in overrides {
            table.insert(entry.browser, entry.platform, entry.correction);
        }
        table
    }

    pub fn insert(&mut self, browser: Browser, platform: Platform, correction: Correction) {
        self.entries
            .insert(Environment::new(browser, platform), correction);
    }

    pub fn lookup(&self, env: Environment) -> Correction {
        self.entries.get(&env).copied().unwrap_or(Correction::Disabled)
    }

    /// Pixels to subtract from layout width and height on this host.
    pub fn compute_correction<H: GeometryHost + ?Sized>(&self, host: &H) -> u32 {
        let env = host.environment();
        let px = match self.lookup(env) {
            Correction::Disabled => 0,
            Correction::Fixed(px) => px,
            Correction::Measure => match host.measure_scrollbar_width() {
                Some(width) if width.is_finite() && width >= 0.0 => width.round() as u32,
                other => {
                    warn!(?env, measured = ?other, "scrollbar probe failed, not correcting");
                    0
                }
            },
        };
        debug!(?env, px, "scrollbar correction");
        px
    }
}

impl Default for CorrectionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(Browser::Chrome, Platform::MacOs, Correction::Measure);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostSetup, ScriptedHost};

    fn host(env: Environment, scrollbar: Option<f64>) -> ScriptedHost {
        ScriptedHost::new(HostSetup {
            environment: env,
            scrollbar_width: scrollbar,
            ..HostSetup::default()
        })
    }

    #[test]
    fn measures_on_chrome_mac() {
        let table = CorrectionTable::default();
        let h = host(Environment::new(Browser::Chrome, Platform::MacOs), Some(15.0));
        assert_eq!(table.compute_correction(&h), 15);
    }

    #[test]
    fn zero_elsewhere() {
        let table = CorrectionTable::default();
        let h = host(Environment::new(Browser::Safari, Platform::MacOs), Some(15.0));
        assert_eq!(table.compute_correction(&h), 0);
        let h = host(Environment::new(Browser::Chrome, Platform::Android), Some(15.0));
        assert_eq!(table.compute_correction(&h), 0);
    }

    #[test]
    fn failed_probe_means_no_correction() {
        let table = CorrectionTable::default();
        let h = host(Environment::new(Browser::Chrome, Platform::MacOs), None);
        assert_eq!(table.compute_correction(&h), 0);
    }

    #[test]
    fn overrides_replace_and_extend_defaults() {
        let table = CorrectionTable::with_overrides(&[
            CorrectionEntry {
                browser: Browser::Chrome,
                platform: Platform::MacOs,
                correction: Correction::Disabled,
            },
            CorrectionEntry {
                browser: Browser::Firefox,
                platform: Platform::Linux,
                correction: Correction::Fixed(12),
            },
        ]);
        let chrome = host(Environment::new(Browser::Chrome, Platform::MacOs), Some(15.0));
        let firefox = host(Environment::new(Browser::Firefox, Platform::Linux), Some(15.0));
        assert_eq!(table.compute_correction(&chrome), 0);
        assert_eq!(table.compute_correction(&firefox), 12);
    }

    #[test]
    fn entries_deserialize_from_config_json() {
        let entry: CorrectionEntry = serde_json::from_str(
            r#"{"browser":"firefox","platform":"windows","correction":{"fixed":17}}"#,
        )
        .unwrap();
        assert_eq!(entry.correction, Correction::Fixed(17));
        let entry: CorrectionEntry = serde_json::from_str(
            r#"{"browser":"chrome","platform":"macos","correction":"measure"}"#,
        )
        .unwrap();
        assert_eq!(entry.correction, Correction::Measure);
    }
}
