//! Property-based tests for history merging, tail reads and search.

use std::collections::HashSet;
use std::io::Write;

use prompt_rewind::history::merge_history;
use prompt_rewind::model::PromptEntry;
use prompt_rewind::search::find_matches;
use prompt_rewind::tail::read_tail;
use proptest::prelude::*;

fn entries_strategy() -> impl Strategy<Value = Vec<PromptEntry>> {
    // Small alphabets so duplicates and timestamp ties actually occur.
    prop::collection::vec(("[a-c]{1,3}", 0i64..20), 0..60).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter_map(|(text, ts)| PromptEntry::new(&text, ts))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Merged history is sorted, duplicate-free, capped and drawn from the input.
    #[test]
    fn merge_invariants_hold(
        current in entries_strategy(),
        cross in entries_strategy(),
        max in 0usize..40,
    ) {
        let all: Vec<PromptEntry> = current.iter().chain(cross.iter()).cloned().collect();
        let distinct: HashSet<(i64, &str)> = all.iter().map(|e| (e.timestamp, e.text.as_str())).collect();

        let list = merge_history(current.clone(), cross.clone(), max);
        let entries = list.entries();

        prop_assert_eq!(entries.len(), distinct.len().min(max));
        prop_assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        let mut seen = HashSet::new();
        for entry in entries {
            prop_assert!(seen.insert((entry.timestamp, entry.text.as_str())));
            prop_assert!(distinct.contains(&(entry.timestamp, entry.text.as_str())));
        }

        // Whatever was dropped is no newer than what was kept.
        if let Some(oldest_kept) = entries.first() {
            for (ts, text) in &distinct {
                if !seen.contains(&(*ts, *text)) {
                    prop_assert!(*ts <= oldest_kept.timestamp);
                }
            }
        }
    }

    /// The tail read is a suffix of the file starting on a line boundary.
    #[test]
    fn tail_is_line_aligned_suffix(
        lines in prop::collection::vec("[a-z ]{0,30}", 0..40),
        budget in 0u64..800,
    ) {
        let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();

        let tail = tokio_test::block_on(read_tail(file.path(), budget));

        prop_assert!(content.ends_with(&tail));
        prop_assert!(tail.len() as u64 <= budget);
        let prefix = &content[..content.len() - tail.len()];
        prop_assert!(prefix.is_empty() || prefix.ends_with('\n'));
        if budget >= content.len() as u64 {
            prop_assert_eq!(tail, content);
        }
    }

    /// Search returns exactly the matching entries, most recent first.
    #[test]
    fn search_matches_are_complete_and_newest_first(
        entries in entries_strategy(),
        query in "[a-cA-C]{1,2}",
    ) {
        let list = merge_history(entries, Vec::new(), 100);
        let matches = find_matches(&list, &query);

        let lowered = query.to_lowercase();
        let expected = list.iter().filter(|e| e.text.to_lowercase().contains(&lowered)).count();
        prop_assert_eq!(matches.len(), expected);
        prop_assert!(matches.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        prop_assert!(matches.iter().all(|e| e.text.to_lowercase().contains(&lowered)));
    }
}
