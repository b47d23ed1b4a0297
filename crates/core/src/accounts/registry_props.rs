//! Property-based tests for the account tree.

use proptest::prelude::*;

use super::registry::AccountRegistry;
use super::types::{AccountType, NewAccount};

/// Strategy for a sequence of (child index, parent index) re-parent attempts.
fn reparent_ops(size: usize) -> impl Strategy<Value = Vec<(usize, Option<usize>)>> {
    prop::collection::vec((0..size, prop::option::of(0..size)), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* sequence of re-parent attempts, accepted or refused, every
    /// account can still walk up to a root without revisiting itself.
    #[test]
    fn prop_reparenting_never_creates_cycle(ops in reparent_ops(8)) {
        let mut registry = AccountRegistry::new();
        let ids: Vec<_> = (0..8)
            .map(|i| {
                registry
                    .create_account(NewAccount::new(
                        format!("{}", 1000 + i),
                        "acct",
                        AccountType::Asset,
                    ))
                    .unwrap()
                    .id
            })
            .collect();

        for (child, parent) in ops {
            let _ = registry.set_parent(ids[child], parent.map(|p| ids[p]));
        }

        for id in &ids {
            let mut current = registry.resolve(*id).unwrap().parent_id;
            let mut steps = 0;
            while let Some(parent) = current {
                prop_assert_ne!(parent, *id);
                steps += 1;
                prop_assert!(steps <= ids.len());
                current = registry.resolve(parent).unwrap().parent_id;
            }
        }
    }

    /// *For any* chart, the number index and the account map stay in step.
    #[test]
    fn prop_numbers_unique(numbers in prop::collection::vec(1000u32..1020, 1..30)) {
        let mut registry = AccountRegistry::new();
        let mut accepted = std::collections::HashSet::new();
        for n in numbers {
            let input = NewAccount::new(n.to_string(), "acct", AccountType::Expense);
            let result = registry.create_account(input);
            prop_assert_eq!(result.is_ok(), accepted.insert(n));
        }
        prop_assert_eq!(registry.len(), accepted.len());
        prop_assert_eq!(registry.list(true).len(), accepted.len());
    }
}
