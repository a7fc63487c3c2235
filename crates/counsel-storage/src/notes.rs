use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use counsel_core::errors::StorageError;
use counsel_core::models::{Note, SourceKind};

use crate::paths::StateLayout;
use crate::snapshot::{Mergeable, SnapshotStore};

/// All notes of one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteBook {
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Mergeable for NoteBook {
    /// Union by note identity; the newer copy of a note wins.
    fn merge(local: &Self, remote: &Self) -> Self {
        let mut by_id: BTreeMap<String, Note> = BTreeMap::new();
        for note in remote.notes.iter().chain(local.notes.iter()) {
            let id = note.identity();
            match by_id.get(&id) {
                Some(existing) if existing.created_at > note.created_at => {}
                _ => {
                    by_id.insert(id, note.clone());
                }
            }
        }
        let mut notes: Vec<Note> = by_id.into_values().collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        NoteBook { notes }
    }
}

/// File-backed notes under `sources/<source>.json`.
#[derive(Debug, Clone)]
pub struct NoteStore {
    layout: StateLayout,
    retry_delay: Duration,
}

impl NoteStore {
    pub fn new(layout: StateLayout, retry_delay: Duration) -> Self {
        Self {
            layout,
            retry_delay,
        }
    }

    fn store(&self, source: SourceKind) -> SnapshotStore<NoteBook> {
        SnapshotStore::new(self.layout.source_notes(source), self.retry_delay)
    }

    pub fn load(&self, source: SourceKind) -> Result<Vec<Note>, StorageError> {
        Ok(self.store(source).load()?.value.notes)
    }

    pub fn add(&self, source: SourceKind, note: Note) -> Result<(), StorageError> {
        let local = NoteBook { notes: vec![note] };
        self.store(source).merge_and_save(&local)?;
        Ok(())
    }
}
