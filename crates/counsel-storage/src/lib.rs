//! # counsel-storage
//!
//! Single-host, multi-process persistence. Every snapshot write goes to a
//! uniquely named temp file and is renamed over the target; every counter
//! update re-reads the snapshot on disk and merges before writing.
//! Append-only logs take an advisory lock per line.

pub mod atomic;
pub mod corpus;
pub mod jsonl;
pub mod notes;
pub mod paths;
pub mod snapshot;

pub use atomic::write_atomic;
pub use corpus::{InMemoryCorpus, JsonFileCorpus};
pub use jsonl::{AppendLog, LockPolicy};
pub use notes::{NoteBook, NoteStore};
pub use paths::StateLayout;
pub use snapshot::{Loaded, Mergeable, SnapshotStore};
