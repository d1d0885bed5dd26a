//! Explicit platform references ("mentions").
//!
//! A mention is the structurally recognizable token `<@123>` (or the nickname
//! form `<@!123>`) that embeds a participant id directly.

use std::sync::LazyLock;

use regex::Regex;

use crate::ParticipantId;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?([0-9]+)>$").expect("mention pattern is valid"));

#[must_use]
pub fn is_mention(raw: &str) -> bool {
    MENTION.is_match(raw)
}

/// Extract the id embedded in a mention token.
///
/// Returns `None` for anything that is not a mention, including mentions whose
/// digits overflow a `u64`.
#[must_use]
pub fn parse_mention(raw: &str) -> Option<ParticipantId> {
    let caps = MENTION.captures(raw)?;
    caps.get(1)?.as_str().parse::<u64>().ok().map(ParticipantId::new)
}

#[must_use]
pub fn mention(id: ParticipantId) -> String {
    format!("<@{id}>")
}
