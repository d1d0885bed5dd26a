//! Line-oriented host: `<caller> <Command> [args...]`.
//!
//! The host vouches for caller identity and roles from the configuration,
//! then hands parsed commands to the game session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use townsquare_config::TownsquareConfig;
use townsquare_core::{Audience, Caller, Role, StaticDirectory};
use townsquare_engine::commands::{parse_member, tokenize};
use townsquare_engine::{Command, CommandContext, Session, SessionRegistry, command_help};
use townsquare_types::{GameId, ParticipantId};

use crate::render;

pub struct Host {
    config: TownsquareConfig,
    directory: StaticDirectory,
    storytellers: Vec<ParticipantId>,
    registry: SessionRegistry,
    game: GameId,
}

impl Host {
    pub fn new(config: TownsquareConfig, data_dir: impl Into<PathBuf>, game: GameId) -> Self {
        let mut directory = StaticDirectory::new();
        for member in &config.members {
            directory.insert(
                ParticipantId::new(member.id),
                member.display_name.clone(),
                member.username(),
            );
        }
        let storytellers = config
            .roles
            .storytellers
            .iter()
            .copied()
            .map(ParticipantId::new)
            .collect();
        Self {
            config,
            directory,
            storytellers,
            registry: SessionRegistry::new(data_dir),
            game,
        }
    }

    fn role_of(&self, id: ParticipantId) -> Role {
        let roles = &self.config.roles;
        let raw = id.value();
        if roles.is_owner(raw) {
            Role::Owner
        } else if roles.is_moderator(raw) {
            Role::Moderator
        } else if roles.is_storyteller(raw) {
            Role::Storyteller
        } else if self.config.members.iter().any(|m| m.id == raw) {
            Role::Player
        } else {
            Role::Spectator
        }
    }

    fn session(&self) -> Result<Arc<Session>> {
        self.registry
            .get(&self.game)
            .with_context(|| format!("failed to open game {}", self.game))
    }

    /// Handle one input line and return the lines to print.
    pub fn handle_line(&self, line: &str) -> Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Vec::new());
        }
        let Some((caller, rest)) = trimmed.split_once(char::is_whitespace) else {
            return Ok(vec!["error: expected '<caller> <Command> [args...]'".to_string()]);
        };
        let caller = match tokenize(caller).ok().and_then(|t| t.into_iter().next()) {
            Some(token) => match parse_member(&token) {
                Ok(id) => Caller::new(id, self.role_of(id)),
                Err(err) => return Ok(vec![format!("error: {err}")]),
            },
            None => return Ok(vec!["error: missing caller".to_string()]),
        };
        let command = match Command::parse(rest) {
            Ok(command) => command,
            Err(err) => return Ok(vec![format!("error: {err}")]),
        };

        let session = self.session()?;
        let audience = if caller.is_storyteller() {
            Audience::Storytellers
        } else {
            Audience::Public
        };

        match command {
            Command::Help => Ok(vec![command_help()]),
            Command::Show => Ok(vec![match session.view(audience) {
                Some(view) => render::nomination(&view),
                None => "No nomination.".to_string(),
            }]),
            command => {
                let ctx = CommandContext {
                    caller,
                    directory: &self.directory,
                    storytellers: &self.storytellers,
                };
                let mut lines = match session.execute(&ctx, &command) {
                    Ok(outcome) => render::outcome(&outcome),
                    Err(err) => vec![render::error(&err)],
                };
                if let Some(view) = session.view(Audience::Public)
                    && !lines.iter().any(|l| l.starts_with("denied") || l.starts_with("invalid"))
                {
                    lines.push(render::nomination(&view));
                }
                Ok(lines)
            }
        }
    }
}
