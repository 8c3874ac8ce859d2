//! Property-based tests for the retention selection step.
//!
//! These tests use proptest to verify invariants across many randomly generated inventories.

use proptest::prelude::*;

use crate::engine::select_for_deletion;
use crate::inventory::TagTimes;

const NOW: i64 = 10_000;

/// Strategy for generating tag inventories of one repository.
fn inventory_strategy() -> impl Strategy<Value = TagTimes> {
    prop::collection::btree_map("app:[a-z0-9.]{1,6}", 0i64..NOW, 0..24)
}

/// Strategy for generating keep lists, overlapping the inventory alphabet.
fn keep_strategy() -> impl Strategy<Value = TagTimes> {
    prop::collection::btree_map("app:[a-z0-9.]{1,2}", 0i64..NOW, 0..6)
}

/// Strategy for generating age cutoffs, from "nothing protected" to "everything protected".
fn cutoff_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(NOW), 0i64..NOW, Just(-1)]
}

proptest! {
    /// Test that no candidates means no deletions.
    #[test]
    fn empty_candidates_delete_nothing(
        keep in keep_strategy(),
        cutoff in cutoff_strategy(),
        keep_count in 0usize..30,
    ) {
        let selection = select_for_deletion(&TagTimes::new(), &keep, cutoff, keep_count);
        prop_assert!(selection.delete.is_empty());
    }

    /// Test that with no protection at all every candidate is deleted.
    #[test]
    fn unprotected_candidates_are_all_deleted(remove in inventory_strategy()) {
        let selection = select_for_deletion(&remove, &TagTimes::new(), NOW, 0);
        let expected: Vec<String> = remove.keys().cloned().collect();
        prop_assert_eq!(selection.delete, expected);
    }

    /// Test that raising the keep count never deletes more.
    #[test]
    fn keep_count_is_monotonic(
        remove in inventory_strategy(),
        keep in keep_strategy(),
        cutoff in cutoff_strategy(),
        keep_count in 0usize..30,
    ) {
        let fewer = select_for_deletion(&remove, &keep, cutoff, keep_count);
        let more = select_for_deletion(&remove, &keep, cutoff, keep_count + 1);
        prop_assert!(more.delete.len() <= fewer.delete.len());
    }

    /// Test that a kept tag is never deleted.
    #[test]
    fn keep_list_wins(
        remove in inventory_strategy(),
        keep in keep_strategy(),
        cutoff in cutoff_strategy(),
        keep_count in 0usize..30,
    ) {
        let selection = select_for_deletion(&remove, &keep, cutoff, keep_count);
        for identity in &selection.delete {
            prop_assert!(!keep.contains_key(identity));
            prop_assert!(remove[identity] <= cutoff);
        }
    }

    /// Test that every candidate is exactly one of protected, spared or deleted.
    #[test]
    fn candidates_are_partitioned(
        remove in inventory_strategy(),
        keep in keep_strategy(),
        cutoff in cutoff_strategy(),
        keep_count in 0usize..30,
    ) {
        let selection = select_for_deletion(&remove, &keep, cutoff, keep_count);
        prop_assert_eq!(
            selection.protected + selection.spared.len() + selection.delete.len(),
            remove.len()
        );

        let needed = keep_count.saturating_sub(selection.protected);
        let eligible = remove.len() - selection.protected;
        prop_assert_eq!(selection.spared.len(), needed.min(eligible));
    }

    /// Test that spared tags are never older than deleted tags.
    #[test]
    fn spared_tags_are_the_youngest(
        remove in inventory_strategy(),
        keep in keep_strategy(),
        cutoff in cutoff_strategy(),
        keep_count in 0usize..30,
    ) {
        let selection = select_for_deletion(&remove, &keep, cutoff, keep_count);
        let oldest_spared = selection.spared.iter().map(|id| remove[id]).min();
        let newest_deleted = selection.delete.iter().map(|id| remove[id]).max();

        if let (Some(spared), Some(deleted)) = (oldest_spared, newest_deleted) {
            prop_assert!(spared >= deleted);
        }
    }

    /// Test that the deletion set comes out sorted by identity.
    #[test]
    fn deletion_set_is_sorted(
        remove in inventory_strategy(),
        keep in keep_strategy(),
        cutoff in cutoff_strategy(),
        keep_count in 0usize..30,
    ) {
        let selection = select_for_deletion(&remove, &keep, cutoff, keep_count);
        prop_assert!(selection.delete.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Test that inventories with identical timestamps resolve the same way every time.
    #[test]
    fn ties_are_deterministic(
        names in prop::collection::btree_set("app:[a-z]{1,4}", 1..12),
        keep_count in 0usize..12,
    ) {
        let remove: TagTimes = names.iter().map(|name| (name.clone(), 500)).collect();
        let reversed: TagTimes = names.iter().rev().map(|name| (name.clone(), 500)).collect();

        let first = select_for_deletion(&remove, &TagTimes::new(), NOW, keep_count);
        let second = select_for_deletion(&reversed, &TagTimes::new(), NOW, keep_count);
        prop_assert_eq!(&first, &second);

        let expected: Vec<String> = names.iter().take(keep_count).cloned().collect();
        prop_assert_eq!(first.spared, expected);
    }
}
