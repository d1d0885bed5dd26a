//! One game's town square behind a lock, with persistence after every
//! accepted mutation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use townsquare_core::{
    Applied, Audience, Caller, EngineError, ErrorKind, IllegalState, LockFailure, MemberDirectory,
    NominationEngine, NominationView,
};
use townsquare_types::{GameId, ParticipantId, TownSquare};

use crate::commands::Command;
use crate::log::GameLogEntry;
use crate::store::{JsonFileStore, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The in-memory state changed but the snapshot could not be written.
    #[error("state changed but could not be saved: {0}")]
    Persistence(#[from] StoreError),
}

impl SessionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Engine(err) => err.kind(),
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Who is asking, plus the host facts the engine cannot know itself.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub caller: Caller,
    pub directory: &'a dyn MemberDirectory,
    /// Storytellers seeded into a freshly set up town square.
    pub storytellers: &'a [ParticipantId],
}

/// Result of an accepted command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub log: Vec<GameLogEntry>,
    /// Clockhand guidance for the operator; the command itself succeeded.
    pub notice: Option<LockFailure>,
}

impl From<Applied> for Outcome {
    fn from(applied: Applied) -> Self {
        Self {
            log: applied.events.iter().map(GameLogEntry::now).collect(),
            notice: applied.notice,
        }
    }
}

pub struct Session {
    game: GameId,
    store: Box<dyn SnapshotStore>,
    town_square: Mutex<Option<TownSquare>>,
}

impl Session {
    /// Load the game's snapshot and wrap it.
    pub fn open(game: GameId, store: Box<dyn SnapshotStore>) -> Result<Self, StoreError> {
        let town_square = store.load()?;
        tracing::debug!(%game, present = town_square.is_some(), "Opened session");
        Ok(Self {
            game,
            store,
            town_square: Mutex::new(town_square),
        })
    }

    #[must_use]
    pub fn game(&self) -> &GameId {
        &self.game
    }

    fn lock(&self) -> MutexGuard<'_, Option<TownSquare>> {
        self.town_square
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current town square.
    #[must_use]
    pub fn snapshot(&self) -> Option<TownSquare> {
        self.lock().clone()
    }

    /// Render-ready view of the current nomination, open or finished.
    #[must_use]
    pub fn view(&self, audience: Audience) -> Option<NominationView> {
        let guard = self.lock();
        let ts = guard.as_ref()?;
        let nomination = ts.current_nomination.as_ref()?;
        Some(NominationView::build(ts, nomination, audience))
    }

    /// Resolve, mutate and persist under one lock.
    ///
    /// A rejected command changes nothing and saves nothing. An accepted
    /// command is always saved; a failed save is reported as
    /// [`SessionError::Persistence`] even though memory already changed.
    pub fn execute(
        &self,
        ctx: &CommandContext<'_>,
        command: &Command,
    ) -> Result<Outcome, SessionError> {
        if !command.is_mutating() {
            return Ok(Outcome::default());
        }

        let mut guard = self.lock();
        let applied = match Self::apply(&mut guard, ctx, command) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::warn!(game = %self.game, caller = %ctx.caller.id, ?command, "Rejected: {err}");
                return Err(err.into());
            }
        };

        if let Err(err) = self.store.save(guard.as_ref()) {
            tracing::error!(game = %self.game, "Snapshot save failed after accepted command: {err}");
            return Err(err.into());
        }
        tracing::info!(game = %self.game, caller = %ctx.caller.id, ?command, "Accepted");
        Ok(applied.into())
    }

    fn apply(
        slot: &mut Option<TownSquare>,
        ctx: &CommandContext<'_>,
        command: &Command,
    ) -> Result<Applied, EngineError> {
        let engine = NominationEngine::new(ctx.directory);
        let caller = &ctx.caller;

        match command {
            Command::SetupTownSquare { players } => {
                let (ts, applied) = engine.setup(caller, players, ctx.storytellers)?;
                *slot = Some(ts);
                return Ok(applied);
            }
            Command::EndGame => {
                let applied = engine.end_game(slot.as_ref(), caller)?;
                *slot = None;
                return Ok(applied);
            }
            _ => {}
        }

        let ts = slot.as_mut().ok_or(IllegalState::NoTownSquare)?;
        match command {
            Command::UpdateTownSquare { players } => engine.update_roster(ts, caller, players),
            Command::SubstitutePlayer { old, new } => engine.substitute(ts, caller, *old, *new),
            Command::Nominate { nominee, nominator } => {
                engine.nominate(ts, caller, nominee, nominator.as_deref())
            }
            Command::AddAccusation(text) => engine.set_accusation(ts, caller, text),
            Command::AddDefense(text) => engine.set_defense(ts, caller, text),
            Command::Vote { vote, voter } => engine.cast_vote(ts, caller, vote, voter.as_deref()),
            Command::LockVote(vote) => engine.lock_vote(ts, caller, vote.as_deref()),
            Command::CloseNomination => engine.close(ts, caller),
            Command::SetVoteThreshold(votes) => engine.set_vote_threshold(ts, caller, *votes),
            Command::SetAlias(alias) => engine.set_alias(ts, caller, alias),
            Command::ToggleOrganGrinder => engine.toggle_organ_grinder(ts, caller),
            Command::TogglePlayerNoms => engine.toggle_player_noms(ts, caller),
            Command::ToggleAutoLockVotes => engine.toggle_auto_lock(ts, caller),
            Command::ToggleMarkedDead(player) => engine.toggle_marked_dead(ts, caller, player),
            Command::ToggleCanVote(player) => engine.toggle_can_vote(ts, caller, player),
            Command::ToggleBanshee(player) => engine.toggle_banshee(ts, caller, player),
            Command::VoteModifier { voter, modifier } => {
                engine.toggle_vote_modifier(ts, caller, voter, *modifier)
            }
            Command::SetupTownSquare { .. }
            | Command::EndGame
            | Command::Show
            | Command::Help => Ok(Applied::default()),
        }
    }
}

/// Sessions by game, each persisted at `<data_dir>/<game>/townsquare.json`.
pub struct SessionRegistry {
    data_dir: PathBuf,
    sessions: Mutex<HashMap<GameId, Arc<Session>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn snapshot_path(&self, game: &GameId) -> PathBuf {
        self.data_dir
            .join(game.as_str())
            .join(JsonFileStore::FILENAME)
    }

    /// The game's session, loading it from disk on first use.
    pub fn get(&self, game: &GameId) -> Result<Arc<Session>, StoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get(game) {
            return Ok(Arc::clone(session));
        }
        let store = JsonFileStore::new(self.snapshot_path(game));
        let session = Arc::new(Session::open(game.clone(), Box::new(store))?);
        sessions.insert(game.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Forget cached sessions so the next `get` reloads from disk.
    pub fn evict(&self, game: &GameId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(game)
            .is_some()
    }
}
