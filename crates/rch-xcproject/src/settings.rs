//! `xcodebuild -showBuildSettings` parsing

use regex_lite::Regex;
use std::collections::HashMap;

/// Parse `xcodebuild -showBuildSettings` output.
///
/// When several targets are listed the first value seen for a key wins,
/// which is the scheme's primary target.
pub fn parse_build_settings(output: &str) -> HashMap<String, String> {
    let setting_re = Regex::new(r"^\s+([A-Za-z0-9_]+) = (.*)$").unwrap();

    let mut settings = HashMap::new();
    for line in output.lines() {
        if let Some(caps) = setting_re.captures(line) {
            settings
                .entry(caps[1].to_string())
                .or_insert_with(|| caps[2].trim_end().to_string());
        }
    }
    settings
}
