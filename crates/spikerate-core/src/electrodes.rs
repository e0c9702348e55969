//! Electrode identities and enable/disable selection state.
//!
//! Electrodes are keyed by stable string identifiers rather than positional
//! indices: sources can be added, removed, or reordered across sessions, and
//! a selection must survive that. The selection itself is external
//! configuration; the processor only ever reads it.

use alloc::collections::BTreeMap;
use alloc::string::String;

/// Stable identifier for a spike event source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElectrodeId(String);

impl ElectrodeId {
    /// Wrap a stable identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElectrodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElectrodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ElectrodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enable/disable state for every known electrode.
///
/// Unknown identifiers read as disabled, and newly declared electrodes start
/// disabled until explicitly enabled. Spikes from disabled electrodes are
/// ignored and disabled electrodes never count toward the impulse amplitude.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectrodeSet {
    enabled: BTreeMap<ElectrodeId, bool>,
}

impl ElectrodeSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one electrode's enabled flag, inserting the id if unknown.
    pub fn set_enabled(&mut self, id: impl Into<ElectrodeId>, enabled: bool) {
        self.enabled.insert(id.into(), enabled);
    }

    /// Whether the electrode is enabled. Unknown ids are disabled.
    pub fn is_enabled(&self, id: &ElectrodeId) -> bool {
        self.enabled.get(id).copied().unwrap_or(false)
    }

    /// Count of enabled electrodes among the given ids.
    pub fn enabled_count(&self, ids: &[ElectrodeId]) -> usize {
        ids.iter().filter(|id| self.is_enabled(id)).count()
    }

    /// Reconcile the selection with the set of currently declared electrodes:
    /// ids no longer declared are dropped, newly declared ids are inserted
    /// disabled, and surviving ids keep their flag.
    pub fn sync<'a>(&mut self, declared: impl IntoIterator<Item = &'a ElectrodeId>) {
        let mut next = BTreeMap::new();
        for id in declared {
            let enabled = self.is_enabled(id);
            next.insert(id.clone(), enabled);
        }
        self.enabled = next;
    }

    /// Iterate over `(id, enabled)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&ElectrodeId, bool)> {
        self.enabled.iter().map(|(id, &enabled)| (id, enabled))
    }

    /// Number of known electrodes.
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Whether any electrodes are known.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}
