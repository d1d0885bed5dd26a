//! Participant resolution from free-text identifiers.
//!
//! Players are told to refer to each other by alias, so the alias field is
//! consulted first. Platform display names and usernames only break ties or
//! fill in when the alias finds nothing. Resolution never guesses: anything
//! still ambiguous after every stage is reported as such.

use std::collections::HashMap;

use townsquare_types::{Participant, ParticipantId, TownSquare, is_mention, parse_mention};

use crate::error::ResolveError;

/// Platform-side names of guild members.
pub trait MemberDirectory {
    fn display_name(&self, id: ParticipantId) -> Option<&str>;
    fn username(&self, id: ParticipantId) -> Option<&str>;
}

/// Directory that knows nothing beyond aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDirectory;

impl MemberDirectory for NoDirectory {
    fn display_name(&self, _id: ParticipantId) -> Option<&str> {
        None
    }

    fn username(&self, _id: ParticipantId) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNames {
    pub display_name: String,
    pub username: String,
}

/// In-memory directory keyed by participant id.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: HashMap<ParticipantId, MemberNames>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        id: ParticipantId,
        display_name: impl Into<String>,
        username: impl Into<String>,
    ) {
        self.members.insert(
            id,
            MemberNames {
                display_name: display_name.into(),
                username: username.into(),
            },
        );
    }

    #[must_use]
    pub fn with(
        mut self,
        id: ParticipantId,
        display_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        self.insert(id, display_name, username);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MemberDirectory for StaticDirectory {
    fn display_name(&self, id: ParticipantId) -> Option<&str> {
        self.members.get(&id).map(|m| m.display_name.as_str())
    }

    fn username(&self, id: ParticipantId) -> Option<&str> {
        self.members.get(&id).map(|m| m.username.as_str())
    }
}

/// Result of running the precision cascade over one name field.
#[derive(Debug, Default)]
struct Cascade {
    matches: Vec<ParticipantId>,
    /// Candidates of the first stage when it produced more than one.
    contenders: Vec<ParticipantId>,
}

impl Cascade {
    fn unique(&self) -> Option<ParticipantId> {
        match self.matches.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    fn contested(&self) -> bool {
        !self.contenders.is_empty()
    }
}

type Field<'a> = (ParticipantId, &'a str);

fn keep<'a>(fields: &[Field<'a>], pred: impl Fn(&str) -> bool) -> Vec<Field<'a>> {
    fields.iter().copied().filter(|(_, f)| pred(f)).collect()
}

fn ids(fields: &[Field<'_>]) -> Vec<ParticipantId> {
    fields.iter().map(|(id, _)| *id).collect()
}

/// Narrow from loose to strict: case-insensitive substring, then
/// case-insensitive prefix, case-sensitive substring or prefix, and finally
/// exact equality.
fn cascade(fields: &[Field<'_>], identifier: &str) -> Cascade {
    let lowered = identifier.to_lowercase();
    let substring = keep(fields, |f| f.to_lowercase().contains(&lowered));
    if substring.len() <= 1 {
        return Cascade {
            matches: ids(&substring),
            contenders: Vec::new(),
        };
    }

    let prefix = keep(&substring, |f| f.to_lowercase().starts_with(&lowered));
    let narrowed = match prefix.len() {
        0 => keep(&substring, |f| f.contains(identifier)),
        1 => prefix,
        _ => {
            let exact_prefix = keep(&prefix, |f| f.starts_with(identifier));
            match exact_prefix.len() {
                0 => keep(&prefix, |f| f.to_lowercase() == lowered),
                1 => exact_prefix,
                _ => keep(&exact_prefix, |f| f == identifier),
            }
        }
    };

    Cascade {
        matches: ids(&narrowed),
        contenders: ids(&substring),
    }
}

fn intersect_unique(a: &[ParticipantId], b: &[ParticipantId]) -> Option<ParticipantId> {
    let both: Vec<ParticipantId> = a.iter().copied().filter(|id| b.contains(id)).collect();
    match both.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Resolves identifiers against the participants of one town square.
pub struct Resolver<'a> {
    participants: Vec<&'a Participant>,
    directory: &'a dyn MemberDirectory,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(town_square: &'a TownSquare, directory: &'a dyn MemberDirectory) -> Self {
        Self {
            participants: town_square.participants().collect(),
            directory,
        }
    }

    pub fn resolve_participant(&self, identifier: &str) -> Result<&'a Participant, ResolveError> {
        let id = self.resolve(identifier)?;
        self.participants
            .iter()
            .copied()
            .find(|p| p.id == id)
            .ok_or_else(|| ResolveError::NotFound {
                identifier: identifier.to_string(),
            })
    }

    pub fn resolve(&self, identifier: &str) -> Result<ParticipantId, ResolveError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResolveError::Malformed {
                identifier: identifier.to_string(),
            });
        }

        if is_mention(identifier) {
            let id = parse_mention(identifier).ok_or_else(|| ResolveError::Malformed {
                identifier: identifier.to_string(),
            })?;
            return if self.participants.iter().any(|p| p.id == id) {
                Ok(id)
            } else {
                Err(ResolveError::NotFound {
                    identifier: identifier.to_string(),
                })
            };
        }

        let aliases: Vec<Field<'_>> = self
            .participants
            .iter()
            .map(|p| (p.id, p.alias.as_str()))
            .collect();
        let display_names: Vec<Field<'_>> = self
            .participants
            .iter()
            .filter_map(|p| Some((p.id, self.directory.display_name(p.id)?)))
            .collect();
        let usernames: Vec<Field<'_>> = self
            .participants
            .iter()
            .filter_map(|p| Some((p.id, self.directory.username(p.id)?)))
            .collect();

        let by_alias = cascade(&aliases, identifier);
        let by_display = cascade(&display_names, identifier);
        let by_username = cascade(&usernames, identifier);

        let resolved = match by_alias.matches.len() {
            1 => by_alias.unique(),
            0 => match by_display.matches.len() {
                1 => by_display.unique(),
                0 => by_username.unique(),
                _ => intersect_unique(&by_display.matches, &by_username.matches),
            },
            _ => intersect_unique(&by_alias.matches, &by_display.matches)
                .or_else(|| intersect_unique(&by_alias.matches, &by_username.matches))
                .or_else(|| intersect_unique(&by_display.matches, &by_username.matches)),
        };

        if let Some(id) = resolved {
            tracing::debug!(identifier, %id, "Resolved participant");
            return Ok(id);
        }

        let contested = [&by_alias, &by_display, &by_username]
            .into_iter()
            .find(|c| c.matches.len() > 1 || c.contested());
        match contested {
            Some(c) => {
                let candidates = if c.matches.len() > 1 {
                    c.matches.clone()
                } else {
                    c.contenders.clone()
                };
                Err(ResolveError::Ambiguous {
                    identifier: identifier.to_string(),
                    candidates,
                })
            }
            None => Err(ResolveError::NotFound {
                identifier: identifier.to_string(),
            }),
        }
    }
}
