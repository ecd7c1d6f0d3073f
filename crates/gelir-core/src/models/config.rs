//! Configuration structures for the scan and extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the gelir pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GelirConfig {
    /// Directory scanner configuration.
    pub scan: ScanConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Directory scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File name prefix identifying candidate receipts (issuer scheme).
    pub file_prefix: String,

    /// Candidate file extension (lowercase, without dot).
    pub file_extension: String,

    /// Recursion depth cap, guarding against symlink cycles.
    pub max_depth: usize,

    /// Insert a pause after this many processed files.
    pub pause_every: usize,

    /// Pause duration in milliseconds.
    pub pause_ms: u64,

    /// Attach a warning to a record when its file takes longer than this
    /// many seconds to decode and extract.
    pub slow_file_warn_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_prefix: "GIB".to_string(),
            file_extension: "pdf".to_string(),
            max_depth: 10,
            pause_every: 5,
            pause_ms: 100,
            slow_file_warn_secs: 20,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound (exclusive) for a plausible labeled USD amount.
    pub max_amount: u32,

    /// Lower bound (inclusive) for the whole-document amount sweep.
    pub sweep_min: u32,

    /// Upper bound (inclusive) for the whole-document amount sweep.
    pub sweep_max: u32,

    /// Maximum whitespace-delimited tokens kept from a client name
    /// candidate.
    pub max_client_tokens: usize,

    /// Maximum description length in characters.
    pub description_max_len: usize,

    /// Description used when none could be extracted.
    pub default_description: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_amount: 100_000,
            sweep_min: 1,
            sweep_max: 50_000,
            max_client_tokens: 4,
            description_max_len: 100,
            default_description: "Freelance Service".to_string(),
        }
    }
}

impl GelirConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scan_config() {
        let config = ScanConfig::default();
        assert_eq!(config.file_prefix, "GIB");
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.pause_every, 5);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = GelirConfig::default();
        config.extraction.max_amount = 25_000;
        config.save(&path).unwrap();

        let loaded = GelirConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.max_amount, 25_000);
        assert_eq!(loaded.scan.file_prefix, "GIB");
    }
}
