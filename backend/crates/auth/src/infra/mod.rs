//! Infrastructure Layer
//!
//! Store implementations: process-local session table, JSON files, SQLite.

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileAuthRepository;
pub use memory::MemorySessionStore;
pub use sqlite::SqliteAuthRepository;
