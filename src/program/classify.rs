use std::collections::HashSet;

/// Decides which primitive types are transient (moving between
/// interactions) rather than affordance-typed (an interaction with an
/// object's affordance).
pub trait PrimitiveClassifier: Send + Sync {
    fn is_transient(&self, primitive: &str) -> bool;

    fn is_affordance(&self, primitive: &str) -> bool {
        !self.is_transient(primitive)
    }
}

/// Classifier backed by a fixed set of transient primitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientPrimitives {
    names: HashSet<String>,
}

impl TransientPrimitives {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl PrimitiveClassifier for TransientPrimitives {
    fn is_transient(&self, primitive: &str) -> bool {
        self.names.contains(primitive)
    }
}
