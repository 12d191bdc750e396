//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Clean before testing (default: false)
    pub clean: bool,

    /// Enable code coverage (default: false)
    pub code_coverage: bool,

    /// Write an xcresult bundle (default: false)
    pub result_bundle: bool,

    /// Directory for reports and result bundles (default: "test_output")
    pub output_directory: String,

    /// Directory for the raw xcodebuild log (default: "~/Library/Logs/scan")
    pub buildlog_path: String,

    /// Root of the dated build directories
    /// (default: "~/Library/Developer/Xcode/Archives")
    pub archive_path: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            clean: false,
            code_coverage: false,
            result_bundle: false,
            output_directory: "test_output".to_string(),
            buildlog_path: "~/Library/Logs/scan".to_string(),
            archive_path: "~/Library/Developer/Xcode/Archives".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "clean": self.clean,
            "code_coverage": self.code_coverage,
            "result_bundle": self.result_bundle,
            "output_directory": self.output_directory,
            "buildlog_path": self.buildlog_path,
            "archive_path": self.archive_path,
        })
    }
}
