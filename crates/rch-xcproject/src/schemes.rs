//! `xcodebuild -list` parsing

/// Extract scheme names from `xcodebuild -list` output
pub fn parse_scheme_list(output: &str) -> Vec<String> {
    let mut schemes = Vec::new();
    let mut in_schemes = false;

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed == "Schemes:" {
            in_schemes = true;
            continue;
        }
        if !in_schemes {
            continue;
        }
        if trimmed.is_empty() {
            break;
        }
        schemes.push(trimmed.to_string());
    }

    schemes
}
