//! Output filename derivation.

/// Prefix of the filename used when a row has no usable name
pub const FALLBACK_PREFIX: &str = "Candidate";

/// Keep alphanumerics, spaces, underscores and hyphens, then trim
///
/// Alphanumeric means Unicode alphanumeric, so accented names survive.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Filename stem for the row with 1-based ordinal `row`
///
/// Falls back to `Candidate_{row}` when the name is missing or sanitizes to
/// nothing.
pub fn output_stem(name: Option<&str>, row: usize) -> String {
    let stem = name.map(sanitize).unwrap_or_default();
    if stem.is_empty() {
        fallback_stem(row)
    } else {
        stem
    }
}

/// `Candidate_{row}`
pub fn fallback_stem(row: usize) -> String {
    format!("{}_{}", FALLBACK_PREFIX, row)
}
