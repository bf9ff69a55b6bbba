use crate::relocator::normalize::CandidateKey;
use crate::relocator::scan::DirectoryEntry;

/// Returns the first candidate, in list order, whose folded form equals the
/// lower-cased id or label of `entry`.
pub fn find_match<'a>(
    entry: &DirectoryEntry,
    keys: &'a [CandidateKey],
) -> Option<&'a CandidateKey> {
    let id = entry.id.to_lowercase();
    let label = entry.label.to_lowercase();
    keys.iter().find(|key| key.folded == id || key.folded == label)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::relocator::scan::parse_entry_name;

    fn entry(name: &str) -> DirectoryEntry {
        let (id, label) = parse_entry_name(name).expect("well-formed name");
        DirectoryEntry {
            name: name.to_string(),
            path: PathBuf::from(name),
            id,
            label,
        }
    }

    fn keys(values: &[&str]) -> Vec<CandidateKey> {
        values.iter().map(|value| CandidateKey::new(*value)).collect()
    }

    #[test]
    fn label_matches_case_insensitively() {
        let keys = keys(&["JOHN"]);
        let found = find_match(&entry("42-john"), &keys).expect("label match");
        assert_eq!(found.original, "JOHN");
    }

    #[test]
    fn first_candidate_wins() {
        let keys = keys(&["42", "john"]);
        let found = find_match(&entry("42-john"), &keys).expect("match");
        assert_eq!(found.original, "42");
    }

    #[test]
    fn substrings_do_not_match() {
        let keys = keys(&["4", "joh", "42-john"]);
        assert!(find_match(&entry("42-john"), &keys).is_none());
    }

    #[test]
    fn stripped_prefix_matches_id() {
        let keys = keys(&["001-UA01"]);
        let found = find_match(&entry("ua01-Zhang"), &keys).expect("prefix stripped match");
        assert_eq!(found.original, "001-UA01");
    }

    #[test]
    fn label_with_delimiter_matches_whole() {
        let keys = keys(&["b-c"]);
        assert!(find_match(&entry("A-B-C"), &keys).is_some());
    }
}
