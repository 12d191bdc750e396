//! Typed scan options
//!
//! [`ScanConfig`] is the resolved configuration handed to the resolver and
//! the command generator. It is deserialized from the merged layers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::effective::ConfigError;

/// How xcpretty should render the build output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Standard,
    Basic,
    Rspec,
}

/// The configuration for one test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Path to the `.xcworkspace`
    pub workspace: Option<PathBuf>,

    /// Path to the `.xcodeproj`
    pub project: Option<PathBuf>,

    /// Simulator hint, e.g. "iPhone 6 (9.0)"; replaced by the selected device
    pub device: Option<String>,

    /// Scheme to test; selected from the project when unset
    pub scheme: Option<String>,

    pub clean: bool,

    pub code_coverage: bool,

    /// Pass `-resultBundlePath` under `output_directory`
    pub result_bundle: bool,

    /// Directory for reports and result bundles
    pub output_directory: PathBuf,

    pub output_style: Option<OutputStyle>,

    /// Directory for the raw xcodebuild log
    pub buildlog_path: PathBuf,

    /// Root of the dated build directories
    pub archive_path: PathBuf,

    pub derived_data_path: Option<PathBuf>,

    pub sdk: Option<String>,

    /// Build configuration, e.g. "Debug"
    pub configuration: Option<String>,

    /// Raw xcodebuild destination; computed when unset
    pub destination: Option<String>,

    /// Extra arguments passed to xcodebuild verbatim
    pub xcargs: Option<String>,

    /// Extra `.xcconfig` file
    pub xcconfig: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            workspace: None,
            project: None,
            device: None,
            scheme: None,
            clean: defaults.clean,
            code_coverage: defaults.code_coverage,
            result_bundle: defaults.result_bundle,
            output_directory: PathBuf::from(defaults.output_directory),
            output_style: None,
            buildlog_path: PathBuf::from(defaults.buildlog_path),
            archive_path: PathBuf::from(defaults.archive_path),
            derived_data_path: None,
            sdk: None,
            configuration: None,
            destination: None,
            xcargs: None,
            xcconfig: None,
        }
    }
}

impl ScanConfig {
    /// Deserialize from a merged configuration value
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Expand `~/` in every path option
    pub fn expand_paths(mut self) -> Self {
        for path in [
            &mut self.output_directory,
            &mut self.buildlog_path,
            &mut self.archive_path,
        ] {
            *path = expand_tilde(path);
        }
        for path in [
            &mut self.workspace,
            &mut self.project,
            &mut self.derived_data_path,
            &mut self.xcconfig,
        ]
        .into_iter()
        .flatten()
        {
            *path = expand_tilde(path);
        }
        self
    }

    /// Validate option values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace.is_some() && self.project.is_some() {
            return Err(ConfigError::ValidationError(
                "Cannot specify both 'workspace' and 'project'".to_string(),
            ));
        }

        if let Some(ref ws) = self.workspace {
            validate_container(ws, "Workspace", "xcworkspace")?;
        }
        if let Some(ref proj) = self.project {
            validate_container(proj, "Project", "xcodeproj")?;
        }

        if let Some(ref xcconfig) = self.xcconfig {
            if !xcconfig.exists() {
                return Err(ConfigError::ValidationError(format!(
                    "File not found at path '{}'",
                    xcconfig.display()
                )));
            }
        }

        Ok(())
    }
}

fn validate_container(path: &Path, label: &str, extension: &str) -> Result<(), ConfigError> {
    if path.extension().map(|e| e != extension).unwrap_or(true) {
        return Err(ConfigError::ValidationError(format!(
            "{} file '{}' must end with .{}",
            label,
            path.display(),
            extension
        )));
    }
    if !path.exists() {
        return Err(ConfigError::ValidationError(format!(
            "{} file not found at path '{}'",
            label,
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{} file '{}' is invalid (not a directory)",
            label,
            path.display()
        )));
    }
    Ok(())
}

/// Expand a leading `~` from `HOME`; other paths are returned unchanged
pub fn expand_tilde(path: &Path) -> PathBuf {
    let home = match std::env::var("HOME") {
        Ok(home) => home,
        Err(_) => return path.to_path_buf(),
    };

    if path == Path::new("~") {
        return PathBuf::from(home);
    }
    match path.strip_prefix("~") {
        Ok(rest) => PathBuf::from(home).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[derive(Clone, Copy)]
enum EnvKind {
    Text,
    Flag,
}

/// Environment variables feeding the env layer, with their option keys
const ENV_OPTIONS: &[(&str, &str, EnvKind)] = &[
    ("SCAN_WORKSPACE", "workspace", EnvKind::Text),
    ("SCAN_PROJECT", "project", EnvKind::Text),
    ("SCAN_DEVICE", "device", EnvKind::Text),
    ("SCAN_SCHEME", "scheme", EnvKind::Text),
    ("SCAN_CLEAN", "clean", EnvKind::Flag),
    ("SCAN_CODE_COVERAGE", "code_coverage", EnvKind::Flag),
    ("SCAN_RESULT_BUNDLE", "result_bundle", EnvKind::Flag),
    ("SCAN_OUTPUT_DIRECTORY", "output_directory", EnvKind::Text),
    ("SCAN_OUTPUT_STYLE", "output_style", EnvKind::Text),
    ("SCAN_BUILDLOG_PATH", "buildlog_path", EnvKind::Text),
    ("SCAN_DERIVED_DATA_PATH", "derived_data_path", EnvKind::Text),
    ("SCAN_SDK", "sdk", EnvKind::Text),
    ("SCAN_CONFIGURATION", "configuration", EnvKind::Text),
    ("SCAN_DESTINATION", "destination", EnvKind::Text),
    ("SCAN_XCARGS", "xcargs", EnvKind::Text),
    ("SCAN_XCCONFIG", "xcconfig", EnvKind::Text),
];

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ValidationError(format!(
            "{} must be a boolean, got '{}'",
            var, other
        ))),
    }
}

/// Build the environment layer from `SCAN_*` variables
pub fn env_overrides<I>(vars: I) -> Result<Value, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut layer = Map::new();

    for (name, value) in vars {
        let Some((_, key, kind)) = ENV_OPTIONS.iter().find(|(var, _, _)| *var == name) else {
            continue;
        };
        let value = match kind {
            EnvKind::Text if value.is_empty() => continue,
            EnvKind::Text => Value::String(value),
            EnvKind::Flag => Value::Bool(parse_flag(&name, &value)?),
        };
        layer.insert(key.to_string(), value);
    }

    Ok(Value::Object(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_value_applies_defaults() {
        let config = ScanConfig::from_value(json!({"scheme": "App"})).unwrap();

        assert_eq!(config.scheme.as_deref(), Some("App"));
        assert!(!config.clean);
        assert_eq!(config.output_directory, PathBuf::from("test_output"));
    }

    #[test]
    fn test_output_style_values() {
        let config = ScanConfig::from_value(json!({"output_style": "rspec"})).unwrap();
        assert_eq!(config.output_style, Some(OutputStyle::Rspec));

        let result = ScanConfig::from_value(json!({"output_style": "fancy"}));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ScanConfig::from_value(json!({"schme": "App"}));
        assert!(result.unwrap_err().to_string().contains("schme"));
    }

    #[test]
    fn test_env_overrides() {
        let layer = env_overrides(vars(&[
            ("SCAN_SCHEME", "App"),
            ("SCAN_CLEAN", "yes"),
            ("SCAN_SDK", ""),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        assert_eq!(layer, json!({"scheme": "App", "clean": true}));
    }

    #[test]
    fn test_env_invalid_flag() {
        let result = env_overrides(vars(&[("SCAN_CODE_COVERAGE", "maybe")]));
        assert!(result.unwrap_err().to_string().contains("SCAN_CODE_COVERAGE"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = std::env::var("HOME").unwrap();
        assert_eq!(
            expand_tilde(Path::new("~/Library/Logs/scan")),
            PathBuf::from(&home).join("Library/Logs/scan")
        );
        assert_eq!(expand_tilde(Path::new("/tmp/logs")), PathBuf::from("/tmp/logs"));
        assert_eq!(expand_tilde(Path::new("~user/x")), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_validate_workspace_and_project_exclusive() {
        let config = ScanConfig {
            workspace: Some(PathBuf::from("App.xcworkspace")),
            project: Some(PathBuf::from("App.xcodeproj")),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("both"));
    }

    #[test]
    fn test_validate_workspace_extension_and_existence() {
        let temp = TempDir::new().unwrap();

        let wrong = ScanConfig {
            workspace: Some(temp.path().join("App.xcodeproj")),
            ..Default::default()
        };
        assert!(wrong.validate().unwrap_err().to_string().contains(".xcworkspace"));

        let missing = ScanConfig {
            workspace: Some(temp.path().join("App.xcworkspace")),
            ..Default::default()
        };
        assert!(missing.validate().unwrap_err().to_string().contains("not found"));

        fs::create_dir(temp.path().join("App.xcworkspace")).unwrap();
        assert!(missing.validate().is_ok());
    }

    #[test]
    fn test_validate_xcconfig_exists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Tests.xcconfig");
        let config = ScanConfig {
            xcconfig: Some(path.clone()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        fs::write(&path, "SWIFT_VERSION = 5.0\n").unwrap();
        assert!(config.validate().is_ok());
    }
}
