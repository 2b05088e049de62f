//! Remediation hints for failed image builds

use regex::Regex;
use std::sync::OnceLock;

/// Stderr patterns that indicate dependency resolution or compilation failed
const DEPENDENCY_FAILURE_PATTERNS: &[&str] = &[
    r"(?i)could not find a version that satisfies",
    r"(?i)no matching distribution found",
    r"(?i)failed building wheel",
    r"(?i)subprocess-exited-with-error",
    r"(?i)error: command '[^']*(gcc|g\+\+|cc)' failed",
    r"(?i)pip install -r requirements\.txt.*did not complete successfully",
    r"npm ERR!",
    r"ERESOLVE",
    r"npm install.*did not complete successfully",
];

const GENERAL_HINTS: &[&str] = &[
    "Ensure that all required build tools and libraries are installed.",
    "Verify that the versions of the dependencies in the dependency manifest are compatible.",
    "Try using an earlier runtime version or earlier dependency versions if the issue persists.",
];

/// Package specific advice, added on top of the general hints
const SPECIFIC_HINTS: &[(&str, &str)] = &[
    (
        r"(?i)scikit[-_]learn|sklearn",
        "If you're using 'scikit-learn', try using a binary wheel instead of building from source.",
    ),
    (
        r"ERESOLVE",
        "Resolve the conflicting peer dependencies in 'package.json' or regenerate 'package-lock.json'.",
    ),
];

fn compile(patterns: impl Iterator<Item = &'static str>) -> Vec<Regex> {
    patterns.filter_map(|p| Regex::new(p).ok()).collect()
}

fn failure_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(DEPENDENCY_FAILURE_PATTERNS.iter().copied()))
}

fn specific_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SPECIFIC_HINTS
            .iter()
            .filter_map(|(pattern, hint)| Regex::new(pattern).ok().map(|re| (re, *hint)))
            .collect()
    })
}

/// Hints for a failed build, empty unless stderr looks like a dependency failure
pub fn remediation_hints(stderr: &str) -> Vec<String> {
    if !failure_patterns().iter().any(|re| re.is_match(stderr)) {
        return Vec::new();
    }

    let mut hints: Vec<String> = GENERAL_HINTS.iter().map(|h| h.to_string()).collect();
    hints.extend(
        specific_patterns()
            .iter()
            .filter(|(re, _)| re.is_match(stderr))
            .map(|(_, hint)| hint.to_string()),
    );
    hints
}
