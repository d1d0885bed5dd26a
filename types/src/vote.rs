use serde::{Deserialize, Serialize};

/// Textual forms that carry control meaning and may never be cast as a vote.
pub const NOT_VOTED_SENTINEL: &str = "-";
pub const CONFIRMED_YES_SENTINEL: &str = "confirmed_yes_vote";
pub const CONFIRMED_NO_SENTINEL: &str = "confirmed_no_vote";

const RESERVED_VOTE_TEXT: [&str; 3] = [
    NOT_VOTED_SENTINEL,
    CONFIRMED_YES_SENTINEL,
    CONFIRMED_NO_SENTINEL,
];

#[must_use]
pub fn is_reserved_vote_text(text: &str) -> bool {
    RESERVED_VOTE_TEXT.contains(&text)
}

/// Where one participant's vote stands within a nomination.
///
/// `ConfirmedYes` and `ConfirmedNo` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum VoteState {
    #[default]
    NotVoted,
    /// Free text supplied by the voter; may be a condition rather than yes/no.
    Pending(String),
    ConfirmedYes,
    ConfirmedNo,
}

impl VoteState {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::ConfirmedYes | Self::ConfirmedNo)
    }

    /// Sentinel-compatible text form, as shown in logs.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::NotVoted => NOT_VOTED_SENTINEL,
            Self::Pending(text) => text,
            Self::ConfirmedYes => CONFIRMED_YES_SENTINEL,
            Self::ConfirmedNo => CONFIRMED_NO_SENTINEL,
        }
    }
}

/// A vote entry plus its tally modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Vote {
    pub state: VoteState,
    /// Affirmative vote counts three times.
    #[serde(default)]
    pub bureaucrat: bool,
    /// Affirmative vote counts against the nomination.
    #[serde(default)]
    pub thief: bool,
    /// Affirmative vote counts twice.
    #[serde(default)]
    pub banshee: bool,
}

impl Vote {
    #[must_use]
    pub fn not_voted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            state: VoteState::Pending(text.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.state.is_confirmed()
    }

    /// Signed contribution of this vote to the running tally.
    ///
    /// Only a confirmed yes counts. Bureaucrat triples, banshee doubles, thief
    /// flips the sign; the modifiers compose multiplicatively.
    #[must_use]
    pub fn weight(&self) -> i64 {
        if self.state != VoteState::ConfirmedYes {
            return 0;
        }
        let mut value = 1;
        if self.bureaucrat {
            value *= 3;
        }
        if self.banshee {
            value *= 2;
        }
        if self.thief {
            value = -value;
        }
        value
    }
}

/// Modifier an operator may toggle on a vote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteModifier {
    Bureaucrat,
    Thief,
    Banshee,
}

impl VoteModifier {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bureaucrat" => Some(Self::Bureaucrat),
            "thief" => Some(Self::Thief),
            "banshee" => Some(Self::Banshee),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bureaucrat => "bureaucrat",
            Self::Thief => "thief",
            Self::Banshee => "banshee",
        }
    }

    /// Flip the modifier on `vote`, returning the new value.
    pub fn toggle(self, vote: &mut Vote) -> bool {
        let flag = match self {
            Self::Bureaucrat => &mut vote.bureaucrat,
            Self::Thief => &mut vote.thief,
            Self::Banshee => &mut vote.banshee,
        };
        *flag = !*flag;
        *flag
    }
}
