//! Shell quoting for command tokens

use std::path::Path;

/// Quote a value for a POSIX shell: wrap in single quotes, escaping any
/// embedded single quote as `'\''`
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// `-flag 'value'` as one token
pub fn flag_with_value(flag: &str, value: &str) -> String {
    format!("{} {}", flag, quote(value))
}
