//! Command table and parser for the text host.
//!
//! A command line is a command name followed by arguments. Arguments are split
//! on whitespace; double quotes group words into one argument. Command names
//! are case-insensitive and accept the short aliases players already know.

use std::mem;

use thiserror::Error;
use townsquare_types::{ParticipantId, VoteModifier, parse_mention};

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
    pub storyteller_only: bool,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        name: "SetupTownSquare",
        aliases: &["CreateTS"],
        usage: "SetupTownSquare <player>...",
        description: "Create the town square with players in seating order",
        storyteller_only: true,
    },
    CommandSpec {
        name: "UpdateTownSquare",
        aliases: &[],
        usage: "UpdateTownSquare <player>...",
        description: "Replace the seating order, keeping aliases and status",
        storyteller_only: true,
    },
    CommandSpec {
        name: "SubstitutePlayer",
        aliases: &["SubPlayer"],
        usage: "SubstitutePlayer <player> <substitute>",
        description: "Hand a seat to a substitute",
        storyteller_only: true,
    },
    CommandSpec {
        name: "Nominate",
        aliases: &["Nom"],
        usage: "Nominate <nominee> [nominator]",
        description: "Open a nomination",
        storyteller_only: false,
    },
    CommandSpec {
        name: "AddAccusation",
        aliases: &[],
        usage: "AddAccusation <text>",
        description: "Set the accusation of the open nomination",
        storyteller_only: false,
    },
    CommandSpec {
        name: "AddDefense",
        aliases: &["AddDefence"],
        usage: "AddDefense <text>",
        description: "Set the defense of the open nomination",
        storyteller_only: false,
    },
    CommandSpec {
        name: "Vote",
        aliases: &[],
        usage: "Vote <vote> [voter]",
        description: "Cast or change a vote",
        storyteller_only: false,
    },
    CommandSpec {
        name: "LockVote",
        aliases: &[],
        usage: "LockVote [vote]",
        description: "Lock the vote under the clockhand",
        storyteller_only: true,
    },
    CommandSpec {
        name: "CloseNomination",
        aliases: &["CloseNom"],
        usage: "CloseNomination",
        description: "Close the open nomination",
        storyteller_only: true,
    },
    CommandSpec {
        name: "SetVoteThreshold",
        aliases: &[],
        usage: "SetVoteThreshold <votes>",
        description: "Set votes needed; 0 derives it from living players",
        storyteller_only: true,
    },
    CommandSpec {
        name: "SetAlias",
        aliases: &[],
        usage: "SetAlias <alias>",
        description: "Set the name you go by in this game",
        storyteller_only: false,
    },
    CommandSpec {
        name: "ToggleOrganGrinder",
        aliases: &["TOrganGrinder"],
        usage: "ToggleOrganGrinder",
        description: "Hide or show vote content",
        storyteller_only: true,
    },
    CommandSpec {
        name: "TogglePlayerNoms",
        aliases: &["TPlayerNoms"],
        usage: "TogglePlayerNoms",
        description: "Allow or forbid player nominations",
        storyteller_only: true,
    },
    CommandSpec {
        name: "ToggleMarkedDead",
        aliases: &["TMarkedDead", "ToggleMarkDead"],
        usage: "ToggleMarkedDead <player>",
        description: "Mark a player dead or alive",
        storyteller_only: true,
    },
    CommandSpec {
        name: "ToggleCanVote",
        aliases: &["TCanVote"],
        usage: "ToggleCanVote <player>",
        description: "Give or take a player's vote",
        storyteller_only: true,
    },
    CommandSpec {
        name: "ToggleBanshee",
        aliases: &["Banshee"],
        usage: "ToggleBanshee <player>",
        description: "Grant or revoke banshee voting rights",
        storyteller_only: true,
    },
    CommandSpec {
        name: "Bureaucrat",
        aliases: &[],
        usage: "Bureaucrat <player>",
        description: "Toggle the bureaucrat on a vote of the open nomination",
        storyteller_only: true,
    },
    CommandSpec {
        name: "Thief",
        aliases: &[],
        usage: "Thief <player>",
        description: "Toggle the thief on a vote of the open nomination",
        storyteller_only: true,
    },
    CommandSpec {
        name: "ToggleAutoLockVotes",
        aliases: &["TAutoLockVotes", "TALV"],
        usage: "ToggleAutoLockVotes",
        description: "Toggle automatic vote locking",
        storyteller_only: true,
    },
    CommandSpec {
        name: "EndGame",
        aliases: &[],
        usage: "EndGame",
        description: "Discard the town square",
        storyteller_only: true,
    },
    CommandSpec {
        name: "Show",
        aliases: &["ShowNomination"],
        usage: "Show",
        description: "Show the open nomination",
        storyteller_only: false,
    },
    CommandSpec {
        name: "Help",
        aliases: &[],
        usage: "Help",
        description: "Show available commands",
        storyteller_only: false,
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[must_use]
pub fn find_spec(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_SPECS.iter().find(|spec| {
        spec.name.eq_ignore_ascii_case(name)
            || spec.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

#[must_use]
pub fn command_help() -> String {
    COMMAND_SPECS
        .iter()
        .map(|spec| {
            let marker = if spec.storyteller_only { " (ST)" } else { "" };
            format!("{:<40} {}{marker}", spec.usage, spec.description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("unknown command {0:?}; try Help")]
    Unknown(String),
    #[error("usage: {usage}")]
    Usage { usage: &'static str },
    #[error("{0:?} is not a member id or mention")]
    InvalidMember(String),
    #[error("{0:?} is not a non-negative number")]
    InvalidNumber(String),
}

/// Parsed command with owned arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetupTownSquare { players: Vec<ParticipantId> },
    UpdateTownSquare { players: Vec<ParticipantId> },
    SubstitutePlayer { old: ParticipantId, new: ParticipantId },
    Nominate { nominee: String, nominator: Option<String> },
    AddAccusation(String),
    AddDefense(String),
    Vote { vote: String, voter: Option<String> },
    LockVote(Option<String>),
    CloseNomination,
    SetVoteThreshold(u32),
    SetAlias(String),
    ToggleOrganGrinder,
    TogglePlayerNoms,
    ToggleMarkedDead(String),
    ToggleCanVote(String),
    ToggleBanshee(String),
    VoteModifier { voter: String, modifier: VoteModifier },
    ToggleAutoLockVotes,
    EndGame,
    Show,
    Help,
}

/// Split on whitespace, keeping double-quoted runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err(ParseError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// A member reference: `<@id>`, `<@!id>` or a bare id.
pub fn parse_member(token: &str) -> Result<ParticipantId, ParseError> {
    parse_mention(token)
        .or_else(|| token.parse::<u64>().ok().map(ParticipantId::new))
        .ok_or_else(|| ParseError::InvalidMember(token.to_string()))
}

fn members(args: &[String]) -> Result<Vec<ParticipantId>, ParseError> {
    args.iter().map(|arg| parse_member(arg)).collect()
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Err(ParseError::Empty);
        };
        let spec = find_spec(name).ok_or_else(|| ParseError::Unknown(name.clone()))?;
        let usage = || ParseError::Usage { usage: spec.usage };
        let rest = || (!args.is_empty()).then(|| args.join(" "));

        let command = match (spec.name, args) {
            ("SetupTownSquare", players) => Self::SetupTownSquare {
                players: members(players)?,
            },
            ("UpdateTownSquare", players) => Self::UpdateTownSquare {
                players: members(players)?,
            },
            ("SubstitutePlayer", [old, new]) => Self::SubstitutePlayer {
                old: parse_member(old)?,
                new: parse_member(new)?,
            },
            ("Nominate", [nominee]) => Self::Nominate {
                nominee: nominee.clone(),
                nominator: None,
            },
            ("Nominate", [nominee, nominator]) => Self::Nominate {
                nominee: nominee.clone(),
                nominator: Some(nominator.clone()),
            },
            ("AddAccusation", _) => Self::AddAccusation(rest().ok_or_else(usage)?),
            ("AddDefense", _) => Self::AddDefense(rest().ok_or_else(usage)?),
            ("Vote", [vote]) => Self::Vote {
                vote: vote.clone(),
                voter: None,
            },
            ("Vote", [vote, voter]) => Self::Vote {
                vote: vote.clone(),
                voter: Some(voter.clone()),
            },
            ("LockVote", []) => Self::LockVote(None),
            ("LockVote", [vote]) => Self::LockVote(Some(vote.clone())),
            ("CloseNomination", []) => Self::CloseNomination,
            ("SetVoteThreshold", [votes]) => Self::SetVoteThreshold(
                votes
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber(votes.clone()))?,
            ),
            ("SetAlias", _) => Self::SetAlias(rest().ok_or_else(usage)?),
            ("ToggleOrganGrinder", []) => Self::ToggleOrganGrinder,
            ("TogglePlayerNoms", []) => Self::TogglePlayerNoms,
            ("ToggleMarkedDead", [player]) => Self::ToggleMarkedDead(player.clone()),
            ("ToggleCanVote", [player]) => Self::ToggleCanVote(player.clone()),
            ("ToggleBanshee", [player]) => Self::ToggleBanshee(player.clone()),
            ("Bureaucrat", [voter]) => Self::VoteModifier {
                voter: voter.clone(),
                modifier: VoteModifier::Bureaucrat,
            },
            ("Thief", [voter]) => Self::VoteModifier {
                voter: voter.clone(),
                modifier: VoteModifier::Thief,
            },
            ("ToggleAutoLockVotes", []) => Self::ToggleAutoLockVotes,
            ("EndGame", []) => Self::EndGame,
            ("Show", []) => Self::Show,
            ("Help", _) => Self::Help,
            _ => return Err(usage()),
        };
        Ok(command)
    }

    /// Whether the command can change the town square.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Show | Self::Help)
    }
}
