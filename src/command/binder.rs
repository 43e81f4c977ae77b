//! Slot binding - matches a name-like slot against the entity context
//!
//! Only exact, case-insensitive name matches bind. Nothing is guessed:
//! a partial or missing name stays unresolved.

use crate::command::context::{Candidate, EntityContext};

/// Result of binding a slot against the current context
#[derive(Debug, Clone, PartialEq)]
pub enum SlotBinding<'a, E> {
    /// The intent carried no slot to bind
    Absent,
    /// A slot was given but no candidate carries that name
    Unresolved { value: String },
    /// First candidate (in context order) whose name matches
    Resolved(&'a Candidate<E>),
}

impl<'a, E> SlotBinding<'a, E> {
    pub fn entity(&self) -> Option<&'a E> {
        match self {
            SlotBinding::Resolved(candidate) => Some(&candidate.entity),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SlotBinding::Resolved(_))
    }
}

/// Bind a slot value against a context
pub fn bind<'a, E>(value: &str, context: &'a EntityContext<E>) -> SlotBinding<'a, E> {
    let wanted = value.trim().to_lowercase();
    if wanted.is_empty() {
        return SlotBinding::Unresolved {
            value: value.to_string(),
        };
    }

    context
        .candidates()
        .iter()
        .find(|c| c.display_name.trim().to_lowercase() == wanted)
        .map(SlotBinding::Resolved)
        .unwrap_or_else(|| SlotBinding::Unresolved {
            value: value.to_string(),
        })
}

/// Bind an optional slot; no slot yields `Absent`
pub fn bind_optional<'a, E>(value: Option<&str>, context: &'a EntityContext<E>) -> SlotBinding<'a, E> {
    match value {
        Some(v) => bind(v, context),
        None => SlotBinding::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn context_with(names: &[&str]) -> EntityContext<usize> {
        names.iter().enumerate().map(|(i, n)| (*n, i)).collect()
    }

    #[test]
    fn test_case_insensitive_exact_match() {
        let ctx = context_with(&["Alice"]);
        let binding = bind("ALICE", &ctx);
        assert_eq!(binding.entity(), Some(&0));
    }

    #[test]
    fn test_prefix_does_not_bind() {
        let ctx = context_with(&["Alice"]);
        assert_eq!(
            bind("Alic", &ctx),
            SlotBinding::Unresolved {
                value: "Alic".into()
            }
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let ctx = context_with(&["Bob", "Alice", "alice"]);
        assert_eq!(bind("alice", &ctx).entity(), Some(&1));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let ctx = context_with(&["Alice"]);
        assert!(bind("  alice ", &ctx).is_resolved());
    }

    #[test]
    fn test_empty_value_never_binds() {
        let ctx = context_with(&["", "Alice"]);
        assert!(!bind("", &ctx).is_resolved());
    }

    #[test]
    fn test_absent_slot() {
        let ctx = context_with(&["Alice"]);
        assert_eq!(bind_optional(None, &ctx), SlotBinding::Absent);
        assert!(bind_optional(Some("alice"), &ctx).is_resolved());
    }

    #[test]
    fn test_unicode_names() {
        let ctx = context_with(&["Ärne", "Zoë"]);
        assert_eq!(bind("zOË", &ctx).entity(), Some(&1));
    }

    proptest! {
        #[test]
        fn prop_any_casing_of_a_name_binds(name in "[A-Za-z]{1,12}", flips in proptest::collection::vec(any::<bool>(), 12)) {
            let ctx = context_with(&[name.as_str()]);
            let query: String = name
                .chars()
                .zip(flips.iter().cycle())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect();
            prop_assert!(bind(&query, &ctx).is_resolved());
        }

        #[test]
        fn prop_strict_prefix_never_binds(name in "[a-z]{2,12}") {
            let ctx = context_with(&[name.as_str()]);
            let prefix = &name[..name.len() - 1];
            prop_assert!(!bind(prefix, &ctx).is_resolved());
        }
    }
}
