/// Lifecycle of a record's heavy payload.
///
/// Records start `Unhydrated`; hydration is the only transition and it
/// happens at most once. The payload is attached only after it has been
/// fully built, so a failed hydration leaves the record `Unhydrated`.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydration<T> {
    Unhydrated,
    Hydrated(T),
}

impl<T> Default for Hydration<T> {
    fn default() -> Self {
        Self::Unhydrated
    }
}

impl<T> Hydration<T> {
    pub fn is_hydrated(&self) -> bool {
        matches!(self, Hydration::Hydrated(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Hydration::Hydrated(payload) => Some(payload),
            Hydration::Unhydrated => None,
        }
    }

    /// Build and attach the payload unless already hydrated.
    ///
    /// Returns `true` when this call performed the transition.
    pub fn hydrate_with<E, F>(&mut self, build: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.is_hydrated() {
            return Ok(false);
        }
        *self = Hydration::Hydrated(build()?);
        Ok(true)
    }
}
