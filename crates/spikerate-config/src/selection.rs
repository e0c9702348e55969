//! Electrode selection file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use spikerate_core::{ElectrodeId, ElectrodeSet};

use crate::error::ConfigError;

/// One electrode's persisted enable flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElectrodeEntry {
    /// Stable electrode identifier.
    pub id: String,
    /// Whether the electrode contributes to the rate estimate.
    pub enabled: bool,
}

/// Persisted electrode selection.
///
/// Stored as a TOML list of `(id, enabled)` pairs. The list is
/// order-independent and keyed by stable string identifier rather than
/// positional index, so a selection survives electrodes being added, removed,
/// or reordered across sessions. If an id appears twice, the last entry wins.
///
/// # TOML Format
///
/// ```toml
/// [[electrodes]]
/// id = "TT1"
/// enabled = true
///
/// [[electrodes]]
/// id = "TT2"
/// enabled = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionFile {
    /// Persisted entries, one per electrode.
    #[serde(default)]
    pub electrodes: Vec<ElectrodeEntry>,
}

impl SelectionFile {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with_entry(mut self, id: impl Into<String>, enabled: bool) -> Self {
        self.electrodes.push(ElectrodeEntry {
            id: id.into(),
            enabled,
        });
        self
    }

    /// Snapshot a live selection for saving.
    pub fn from_set(set: &ElectrodeSet) -> Self {
        Self {
            electrodes: set
                .iter()
                .map(|(id, enabled)| ElectrodeEntry {
                    id: id.as_str().to_owned(),
                    enabled,
                })
                .collect(),
        }
    }

    /// Apply the persisted flags onto a live selection. Entries for ids the
    /// set does not know yet are inserted; duplicate ids apply in file order,
    /// so the last entry wins.
    pub fn apply_to(&self, set: &mut ElectrodeSet) {
        for entry in &self.electrodes {
            set.set_enabled(entry.id.as_str(), entry.enabled);
        }
    }

    /// Build a fresh selection containing exactly the persisted flags.
    pub fn to_set(&self) -> ElectrodeSet {
        let mut set = ElectrodeSet::new();
        self.apply_to(&mut set);
        set
    }

    /// Persisted flag for one id, if present. Duplicates resolve to the last
    /// entry.
    pub fn get(&self, id: &str) -> Option<bool> {
        self.electrodes
            .iter()
            .rev()
            .find(|entry| entry.id == id)
            .map(|entry| entry.enabled)
    }

    /// Set one id's flag in place, appending a new entry if absent.
    pub fn set(&mut self, id: &str, enabled: bool) {
        if let Some(entry) = self.electrodes.iter_mut().rev().find(|e| e.id == id) {
            entry.enabled = enabled;
        } else {
            self.electrodes.push(ElectrodeEntry {
                id: id.to_owned(),
                enabled,
            });
        }
    }

    /// Load a selection from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load a selection from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the selection to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the selection to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.electrodes.len()
    }

    /// Whether the selection has no entries.
    pub fn is_empty(&self) -> bool {
        self.electrodes.is_empty()
    }

    /// Iterate over entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ElectrodeEntry> {
        self.electrodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_from_toml() {
        let toml = r#"
[[electrodes]]
id = "TT1"
enabled = true

[[electrodes]]
id = "TT2"
enabled = false
"#;
        let selection = SelectionFile::from_toml(toml).unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.get("TT1"), Some(true));
        assert_eq!(selection.get("TT2"), Some(false));
        assert_eq!(selection.get("TT3"), None);
    }

    #[test]
    fn selection_round_trips_through_toml() {
        let original = SelectionFile::new()
            .with_entry("TT1", true)
            .with_entry("SE4", false);
        let toml = original.to_toml().unwrap();
        let parsed = SelectionFile::from_toml(&toml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn duplicate_ids_resolve_to_last_entry() {
        let selection = SelectionFile::new()
            .with_entry("TT1", true)
            .with_entry("TT1", false);
        assert_eq!(selection.get("TT1"), Some(false));

        let set = selection.to_set();
        assert!(!set.is_enabled(&ElectrodeId::from("TT1")));
    }

    #[test]
    fn apply_preserves_flags_for_unlisted_ids() {
        let mut set = ElectrodeSet::new();
        set.set_enabled("kept", true);

        SelectionFile::new().with_entry("other", true).apply_to(&mut set);

        assert!(set.is_enabled(&ElectrodeId::from("kept")));
        assert!(set.is_enabled(&ElectrodeId::from("other")));
    }

    #[test]
    fn snapshot_and_restore_are_inverse() {
        let mut set = ElectrodeSet::new();
        set.set_enabled("a", true);
        set.set_enabled("b", false);

        let restored = SelectionFile::from_set(&set).to_set();
        assert_eq!(set, restored);
    }

    #[test]
    fn set_updates_in_place_or_appends() {
        let mut selection = SelectionFile::new().with_entry("a", false);
        selection.set("a", true);
        selection.set("b", true);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.get("a"), Some(true));
        assert_eq!(selection.get("b"), Some(true));
    }

    #[test]
    fn empty_toml_parses_to_empty_selection() {
        let selection = SelectionFile::from_toml("").unwrap();
        assert!(selection.is_empty());
    }
}
