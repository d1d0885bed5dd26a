//! Typed failures for engine operations.
//!
//! Every rejection happens before any mutation, so callers can report the
//! error and move on without rolling anything back.

use thiserror::Error;

use townsquare_types::{ParticipantId, TextError};

/// Coarse classification hosts use to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotAuthorized,
    NotFound,
    Ambiguous,
    IllegalState,
    /// Clockhand guidance: the participant at the cursor has not voted.
    NotVoted,
    /// Clockhand guidance: the vote at the cursor is neither yes nor no.
    UnrecognizedVote,
    /// In-memory state changed but could not be saved.
    Persistence,
}

impl ErrorKind {
    /// Expected outcomes that only need operator guidance.
    #[must_use]
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::NotVoted | Self::UnrecognizedVote)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("{0:?} is a reserved string for internal handling and cannot be cast as a vote")]
    ReservedVote(String),
    #[error("participant {0} appears more than once in the seating order")]
    DuplicatePlayer(ParticipantId),
    #[error("{0} is already a participant")]
    AlreadyParticipant(String),
    #[error("a storyteller must name the nominator")]
    NominatorRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("only a storyteller may do this")]
    StorytellerOnly,
    #[error("you must participate in the game to do this")]
    NotAParticipant,
    #[error("player nominations are disabled; ask a storyteller to nominate")]
    PlayerNominationsDisabled,
    #[error("you may not nominate in the name of others")]
    NominateOnBehalf,
    #[error("you may not vote in the name of others")]
    VoteOnBehalf,
    #[error("you must be the storyteller or nominator to set the accusation")]
    NotNominator,
    #[error("you must be the storyteller or nominee to set the defense")]
    NotNominee,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{identifier:?} is not a usable participant identifier")]
    Malformed { identifier: String },
    #[error("could not find any participant matching {identifier:?}")]
    NotFound { identifier: String },
    #[error("{identifier:?} matches more than one participant; be more specific")]
    Ambiguous {
        identifier: String,
        candidates: Vec<ParticipantId>,
    },
}

impl ResolveError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalState {
    #[error("town square has not been set up for this game")]
    NoTownSquare,
    #[error("a nomination is already underway; wait until it has finished before starting another")]
    NominationInProgress,
    #[error("no ongoing nomination")]
    NoOpenNomination,
    #[error("{alias} is not seated in the town square")]
    NotSeated { alias: String },
    #[error("{alias} has no vote left to spend")]
    CannotVote { alias: String },
    #[error("{alias}'s vote is already locked in and cannot be changed")]
    VoteLocked { alias: String },
    #[error("there is no seat under the clockhand")]
    NoSeatAtClockhand,
}

/// Expected, recoverable outcomes of one clockhand lock attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockFailure {
    #[error("{alias} has not voted yet; lock it manually by supplying the vote, e.g. 'LockVote yes'")]
    NotVoted { voter: ParticipantId, alias: String },
    #[error("unable to lock {alias}'s vote {text:?}; it must be 'yes' or 'no'")]
    UnrecognizedVote {
        voter: ParticipantId,
        alias: String,
        text: String,
    },
}

impl LockFailure {
    #[must_use]
    pub fn voter(&self) -> ParticipantId {
        match self {
            Self::NotVoted { voter, .. } | Self::UnrecognizedVote { voter, .. } => *voter,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotVoted { .. } => ErrorKind::NotVoted,
            Self::UnrecognizedVote { .. } => ErrorKind::UnrecognizedVote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotAuthorized(#[from] Denial),
    #[error("the nominee must be a game participant: {0}")]
    InvalidNominee(ResolveError),
    #[error("the nominator must be a game participant: {0}")]
    InvalidNominator(ResolveError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    IllegalState(#[from] IllegalState),
    #[error(transparent)]
    Clockhand(#[from] LockFailure),
}

impl From<TextError> for EngineError {
    fn from(err: TextError) -> Self {
        Self::Validation(ValidationError::Text(err))
    }
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotAuthorized(_) => ErrorKind::NotAuthorized,
            Self::InvalidNominee(err) | Self::InvalidNominator(err) | Self::Resolve(err) => {
                err.kind()
            }
            Self::IllegalState(_) => ErrorKind::IllegalState,
            Self::Clockhand(failure) => failure.kind(),
        }
    }
}
