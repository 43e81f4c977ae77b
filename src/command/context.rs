//! Entity context: the named things a command may currently refer to
//!
//! Screens rebuild their context from current state every time a command
//! arrives. The context is read-only to the pipeline; only the owning
//! screen changes the lists it is derived from.

/// A nameable on-screen entity
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<E> {
    pub display_name: String,
    pub entity: E,
}

/// Ordered set of candidates, in on-screen order
#[derive(Debug, Clone, PartialEq)]
pub struct EntityContext<E> {
    candidates: Vec<Candidate<E>>,
}

impl<E> EntityContext<E> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn push(&mut self, display_name: impl Into<String>, entity: E) {
        self.candidates.push(Candidate {
            display_name: display_name.into(),
            entity,
        });
    }

    pub fn candidates(&self) -> &[Candidate<E>] {
        &self.candidates
    }

    /// Display names sent to the NLU service as disambiguation hints
    pub fn candidate_names(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|c| c.display_name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl<E> Default for EntityContext<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S: Into<String>> FromIterator<(S, E)> for EntityContext<E> {
    fn from_iter<I: IntoIterator<Item = (S, E)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (name, entity) in iter {
            ctx.push(name, entity);
        }
        ctx
    }
}
