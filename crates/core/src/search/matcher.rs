use docscope_api::{MatchTier, SearchEntry};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Case-folded form used for every comparison.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Tier of `label` against an already folded `needle`, if it matches at all.
pub fn match_tier(label: &str, needle: &str) -> Option<MatchTier> {
    let folded = fold(label);
    if folded == needle {
        Some(MatchTier::Exact)
    } else if folded.starts_with(needle) {
        Some(MatchTier::Prefix)
    } else if folded.contains(needle) {
        Some(MatchTier::Substring)
    } else {
        None
    }
}

struct Candidate<'a> {
    tier: MatchTier,
    folded: String,
    entry: &'a SearchEntry,
}

impl Candidate<'_> {
    fn order(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| self.entry.kind.priority().cmp(&other.entry.kind.priority()))
            .then_with(|| self.folded.cmp(&other.folded))
            .then_with(|| self.entry.label.cmp(&other.entry.label))
            .then_with(|| self.entry.target.cmp(&other.entry.target))
    }
}

/// Rank the entries matching `needle` (folded), best first.
///
/// Exact matches precede prefix matches, which precede substring matches.
/// Inside a tier, kind priority and then the label decide. Entries pointing
/// at the same place under the same label are reported once.
pub fn rank<'a>(
    entries: impl IntoIterator<Item = &'a SearchEntry>,
    needle: &str,
    max_tier: MatchTier,
    limit: usize,
) -> Vec<SearchEntry> {
    let mut candidates: Vec<Candidate<'a>> = entries
        .into_iter()
        .filter_map(|entry| {
            let tier = match_tier(&entry.label, needle)?;
            (tier <= max_tier).then(|| Candidate {
                tier,
                folded: fold(&entry.label),
                entry,
            })
        })
        .collect();

    candidates.sort_by(|a, b| a.order(b));

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|c| c.entry)
        .filter(|&entry| seen.insert((&entry.label, &entry.target)))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docscope_api::{EntryKind, Target};

    fn entry(label: &str, kind: EntryKind) -> SearchEntry {
        SearchEntry::new(label, kind, Target::from_url(&format!("{}.html", label)))
    }

    fn labels(entries: &[SearchEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_prefix_matches_sorted_alphabetically() {
        let corpus = vec![
            entry("ModernCpp", EntryKind::Section),
            entry("MockSettings", EntryKind::Section),
            entry("Mock", EntryKind::Section),
        ];
        let ranked = rank(&corpus, "mo", MatchTier::Substring, 50);
        assert_eq!(labels(&ranked), vec!["Mock", "MockSettings", "ModernCpp"]);
    }

    #[test]
    fn test_tiers_precede_kind_priority() {
        let corpus = vec![
            entry("ScopedMock", EntryKind::Class),
            entry("mock_setup", EntryKind::Macro),
            entry("mock", EntryKind::Section),
        ];
        let ranked = rank(&corpus, "mock", MatchTier::Substring, 50);
        assert_eq!(labels(&ranked), vec!["mock", "mock_setup", "ScopedMock"]);
    }

    #[test]
    fn test_kind_priority_breaks_ties_within_tier() {
        let corpus = vec![
            entry("Matchers", EntryKind::Section),
            entry("MATCHES", EntryKind::Macro),
            entry("matches_fn", EntryKind::Function),
            entry("Matcher", EntryKind::Concept),
        ];
        let ranked = rank(&corpus, "mat", MatchTier::Substring, 50);
        assert_eq!(
            labels(&ranked),
            vec!["Matcher", "matches_fn", "MATCHES", "Matchers"]
        );
    }

    #[test]
    fn test_non_matching_entries_are_excluded() {
        let corpus = vec![entry("Sequence", EntryKind::Class), entry("Mock", EntryKind::Class)];
        let ranked = rank(&corpus, "que", MatchTier::Substring, 50);
        assert_eq!(labels(&ranked), vec!["Sequence"]);
        assert!(rank(&corpus, "zzz", MatchTier::Substring, 50).is_empty());
    }

    #[test]
    fn test_max_tier_and_limit() {
        let corpus = vec![
            entry("Mock", EntryKind::Class),
            entry("Mocks", EntryKind::Class),
            entry("ScopedMock", EntryKind::Class),
        ];
        let ranked = rank(&corpus, "mock", MatchTier::Prefix, 50);
        assert_eq!(labels(&ranked), vec!["Mock", "Mocks"]);
        let ranked = rank(&corpus, "mock", MatchTier::Substring, 1);
        assert_eq!(labels(&ranked), vec!["Mock"]);
    }

    #[test]
    fn test_duplicate_targets_are_reported_once() {
        let corpus = vec![
            entry("Mock", EntryKind::Class),
            entry("Mock", EntryKind::Class),
            SearchEntry::new("Mock", EntryKind::Function, Target::from_url("Mock.html#ctor")),
        ];
        let ranked = rank(&corpus, "mock", MatchTier::Substring, 50);
        assert_eq!(ranked.len(), 2);
    }
}
