use tracing::info;

/// Legacy prefix removed from candidate keys before matching. Only the
/// candidate side is affected; directory names are never stripped.
pub const LEGACY_PREFIX: &str = "001-";

/// A candidate key in matchable form, keeping the spreadsheet value for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateKey {
    /// Value exactly as read from the spreadsheet.
    pub original: String,
    /// Trimmed value with the legacy prefix removed.
    pub normalized: String,
    /// Case-folded form compared against directory ids and labels.
    pub folded: String,
    /// Whether [`LEGACY_PREFIX`] was removed.
    pub prefix_stripped: bool,
}

impl CandidateKey {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let trimmed = original.trim();
        let (normalized, prefix_stripped) = match strip_legacy_prefix(trimmed) {
            Some(rest) => (rest.to_string(), true),
            None => (trimmed.to_string(), false),
        };
        let folded = normalized.trim().to_lowercase();

        Self {
            original,
            normalized,
            folded,
            prefix_stripped,
        }
    }
}

/// Normalizes raw keys one-to-one, keeping order and duplicates.
pub fn normalize_keys(raw: Vec<String>) -> Vec<CandidateKey> {
    let keys: Vec<CandidateKey> = raw.into_iter().map(CandidateKey::new).collect();

    let mut stripped = 0;
    for key in keys.iter().filter(|key| key.prefix_stripped) {
        stripped += 1;
        info!(
            original = %key.original,
            normalized = %key.normalized,
            "removed prefix '{LEGACY_PREFIX}'"
        );
    }
    if stripped > 0 {
        info!(count = stripped, "removed prefix '{LEGACY_PREFIX}' from candidate keys");
    }

    keys
}

fn strip_legacy_prefix(value: &str) -> Option<&str> {
    let head = value.get(..LEGACY_PREFIX.len())?;
    if head.eq_ignore_ascii_case(LEGACY_PREFIX) {
        Some(&value[LEGACY_PREFIX.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_prefix_is_stripped() {
        let key = CandidateKey::new("  001-123 ");
        assert_eq!(key.normalized, "123");
        assert_eq!(key.original, "  001-123 ");
        assert!(key.prefix_stripped);
    }

    #[test]
    fn prefix_without_delimiter_is_kept() {
        let key = CandidateKey::new("001abc");
        assert_eq!(key.normalized, "001abc");
        assert!(!key.prefix_stripped);
    }

    #[test]
    fn only_the_leading_prefix_is_removed() {
        assert_eq!(CandidateKey::new("001-001-7").normalized, "001-7");
        assert_eq!(CandidateKey::new("x001-7").normalized, "x001-7");
    }

    #[test]
    fn folded_form_ignores_case_and_whitespace() {
        assert_eq!(CandidateKey::new(" JOHN ").folded, "john");
        assert_eq!(CandidateKey::new("001- Ab").folded, "ab");
    }

    #[test]
    fn order_and_duplicates_survive() {
        let keys = normalize_keys(vec!["b".into(), "001-a".into(), "b".into()]);
        let normalized: Vec<&str> = keys.iter().map(|key| key.normalized.as_str()).collect();
        assert_eq!(normalized, ["b", "a", "b"]);
    }
}
