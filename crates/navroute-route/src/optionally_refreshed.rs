//! Tri-state update wrapper

/// Outcome of an update for a single field.
///
/// `Updated(None)` clears the field, which is different from leaving it
/// untouched with `NoUpdates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionallyRefreshedData<T> {
    /// Keep the current value
    NoUpdates,
    /// Replace the current value
    Updated(T),
}

impl<T> OptionallyRefreshedData<T> {
    /// Resolve against the current value
    pub fn apply(self, current: T) -> T {
        match self {
            OptionallyRefreshedData::NoUpdates => current,
            OptionallyRefreshedData::Updated(value) => value,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, OptionallyRefreshedData::Updated(_))
    }
}

impl<T> Default for OptionallyRefreshedData<T> {
    fn default() -> Self {
        OptionallyRefreshedData::NoUpdates
    }
}
