//! Core domain logic for the town square.
//!
//! Resolves participants from free text, drives the nomination state machine
//! and the clockhand, and builds render-ready views. Nothing here does IO:
//! persistence and presentation belong to the host.

mod caller;
pub mod clockhand;
mod engine;
mod error;
mod events;
pub mod resolver;
pub mod view;

pub use caller::{Caller, Role};
pub use clockhand::{Advance, Locked};
pub use engine::NominationEngine;
pub use error::{
    Denial, EngineError, ErrorKind, IllegalState, LockFailure, ResolveError, ValidationError,
};
pub use events::{Applied, GameEvent};
pub use resolver::{MemberDirectory, MemberNames, NoDirectory, Resolver, StaticDirectory};
pub use view::{Audience, NominationView, VoteCell, VoteRow};
