//! Game sessions for the town square.
//!
//! Wraps the pure nomination engine with the pieces a host needs: snapshot
//! persistence, a per-game lock around resolve → mutate → persist, the
//! storyteller game log, and the text command language.

pub mod commands;
mod log;
mod session;
mod store;

pub use commands::{Command, CommandSpec, ParseError, command_help, command_specs};
pub use log::{GameLogEntry, LOG_ENTRY_LIMIT};
pub use session::{CommandContext, Outcome, Session, SessionError, SessionRegistry};
pub use store::{EMPTY_MARKER, JsonFileStore, MemoryStore, SnapshotStore, StoreError};
