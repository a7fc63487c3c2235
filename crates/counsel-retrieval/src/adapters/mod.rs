//! Candidate sources feeding the ranking engine.

pub mod corpus;
pub mod notes;
pub mod tool_caution;

pub use corpus::CorpusAdapter;
pub use notes::NoteAdapter;
pub use tool_caution::ToolCautionAdapter;
