//! Coarse OS version comparison

/// The (major, minor) part of a dotted version.
///
/// Patch components are ignored. A missing or non-numeric component counts
/// as 0; a component with trailing text ("4b2") uses its leading digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MajorMinor {
    pub major: u64,
    pub minor: u64,
}

fn leading_number(component: &str) -> u64 {
    let digits: String = component
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

impl MajorMinor {
    pub fn parse(version: &str) -> Self {
        let mut parts = version.split('.');
        let major = parts.next().map(leading_number).unwrap_or(0);
        let minor = parts.next().map(leading_number).unwrap_or(0);
        Self { major, minor }
    }

    /// True if this version is at least `target`
    pub fn satisfies(&self, target: &MajorMinor) -> bool {
        self >= target
    }
}
