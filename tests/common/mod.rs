//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests: a fixed guild of members and
//! a game table wired to an in-memory snapshot store.

#![allow(dead_code)]

use std::sync::Arc;

use townsquare_core::{Audience, Caller, NominationView, StaticDirectory};
use townsquare_engine::{Command, CommandContext, MemoryStore, Outcome, Session, SessionError};
use townsquare_types::{GameId, ParticipantId, TownSquare};

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CAROL: u64 = 3;
pub const DAN: u64 = 4;
pub const SAM: u64 = 9;

pub fn pid(id: u64) -> ParticipantId {
    ParticipantId::new(id)
}

/// Guild members as the platform knows them.
pub fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with(pid(ALICE), "Alice", "alice_w")
        .with(pid(BOB), "Bob", "bobby")
        .with(pid(CAROL), "Carol", "carol99")
        .with(pid(DAN), "Dan", "dan")
        .with(pid(SAM), "Sam", "storyteller_sam")
}

pub fn game(name: &str) -> GameId {
    GameId::new(name).expect("valid game id")
}

/// One game with Sam as storyteller, persisted to memory.
pub struct Table {
    pub session: Session,
    pub store: Arc<MemoryStore>,
    directory: StaticDirectory,
    storytellers: Vec<ParticipantId>,
}

impl Table {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let session =
            Session::open(game("table"), Box::new(Arc::clone(&store))).expect("open session");
        Self {
            session,
            store,
            directory: directory(),
            storytellers: vec![pid(SAM)],
        }
    }

    /// Table with Alice, Bob and Carol seated in that order.
    pub fn seated() -> Self {
        let table = Self::new();
        table.st("SetupTownSquare 1 2 3").expect("setup");
        table
    }

    pub fn run(&self, caller: Caller, line: &str) -> Result<Outcome, SessionError> {
        let command = Command::parse(line).expect("command parses");
        let ctx = CommandContext {
            caller,
            directory: &self.directory,
            storytellers: &self.storytellers,
        };
        self.session.execute(&ctx, &command)
    }

    pub fn st(&self, line: &str) -> Result<Outcome, SessionError> {
        self.run(Caller::storyteller(pid(SAM)), line)
    }

    pub fn player(&self, id: u64, line: &str) -> Result<Outcome, SessionError> {
        self.run(Caller::player(pid(id)), line)
    }

    pub fn view(&self, audience: Audience) -> NominationView {
        self.session.view(audience).expect("a nomination to view")
    }

    pub fn square(&self) -> TownSquare {
        self.session.snapshot().expect("town square is set up")
    }
}

/// Log lines of an outcome, without timestamps.
pub fn texts(outcome: &Outcome) -> Vec<String> {
    outcome.log.iter().map(|entry| entry.text.clone()).collect()
}
