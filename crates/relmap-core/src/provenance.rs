use std::fmt;

/// Records how a piece of metadata was established.
///
/// Ordering matters: `Explicit` outranks `Convention`. A fact can be
/// rewritten by a source of equal or higher rank, never by a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    /// Applied automatically by a convention.
    Convention,

    /// Requested by user configuration.
    Explicit,
}

impl Provenance {
    pub fn is_explicit(self) -> bool {
        matches!(self, Self::Explicit)
    }

    pub fn is_convention(self) -> bool {
        matches!(self, Self::Convention)
    }

    /// Returns `true` if a write from `self` may replace a fact recorded with
    /// `existing`. Facts that were never written can always be replaced.
    pub fn overrides(self, existing: Option<Provenance>) -> bool {
        existing.map_or(true, |existing| self >= existing)
    }

    /// Combines two sources, keeping the stronger one.
    pub fn strongest(existing: Option<Provenance>, incoming: Provenance) -> Provenance {
        existing.map_or(incoming, |existing| existing.max(incoming))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Convention => f.write_str("convention"),
            Self::Explicit => f.write_str("explicit"),
        }
    }
}

/// A mutable metadata value paired with the provenance of its last write.
///
/// A facet starts out holding a derived default with no provenance. Writes go
/// through [`Facet::set`], which refuses to let a weaker source replace a
/// value a stronger source established.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facet<T> {
    value: T,
    source: Option<Provenance>,
}

impl<T> Facet<T> {
    /// A facet holding a default that nobody configured.
    pub fn new(value: T) -> Self {
        Self {
            value,
            source: None,
        }
    }

    pub fn with_source(value: T, source: Provenance) -> Self {
        Self {
            value,
            source: Some(source),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> Option<Provenance> {
        self.source
    }

    pub fn is_explicit(&self) -> bool {
        self.source.is_some_and(Provenance::is_explicit)
    }

    pub fn can_set(&self, source: Provenance) -> bool {
        source.overrides(self.source)
    }

    /// Replaces the value without touching provenance. Used for values that
    /// are recomputed from other facts.
    pub(crate) fn derive(&mut self, value: T) {
        self.value = value;
    }
}

impl<T: Copy> Facet<T> {
    pub fn value(&self) -> T {
        self.value
    }
}

impl<T: PartialEq> Facet<T> {
    /// Writes `value` on behalf of `source`.
    ///
    /// Re-asserting the current value upgrades its provenance. Returns `false`
    /// when the write is refused because the current value was established by
    /// a stronger source; the facet is left untouched in that case.
    pub fn set(&mut self, value: T, source: Provenance) -> bool {
        if self.value == value {
            self.source = Some(Provenance::strongest(self.source, source));
            return true;
        }

        if !self.can_set(source) {
            return false;
        }

        self.value = value;
        self.source = Some(source);
        true
    }
}

impl<T: Default> Default for Facet<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
