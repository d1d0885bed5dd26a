//! Nomination lifecycle transitions.
//!
//! ```text
//! NoActiveNomination --create--> Open --lock last seat / close--> Finished
//!        ^                                                           |
//!        +------------------------ create ---------------------------+
//! ```
//!
//! Every operation validates completely before it touches the town square, so
//! an `Err` always means "nothing changed".

use townsquare_types::{
    ACCUSATION_LIMIT, Alias, BoundedText, DEFENSE_LIMIT, Nomination, Participant, ParticipantId,
    TownSquare, VOTE_TEXT_LIMIT, Vote, VoteModifier, VoteState, is_reserved_vote_text, mention,
};

use crate::caller::Caller;
use crate::clockhand::{advance, clockhand_participant, lock_next, settle_cursor};
use crate::error::{Denial, EngineError, IllegalState, ResolveError, ValidationError};
use crate::events::{Applied, GameEvent};
use crate::resolver::{MemberDirectory, Resolver};

type Result<T> = std::result::Result<T, EngineError>;

/// Applies engine operations to a town square.
///
/// Holds only the member directory used for name resolution; the town square
/// itself is passed to every call.
pub struct NominationEngine<'d> {
    directory: &'d dyn MemberDirectory,
}

fn require_storyteller(caller: &Caller) -> Result<()> {
    if caller.is_storyteller() {
        Ok(())
    } else {
        Err(Denial::StorytellerOnly.into())
    }
}

fn open_nomination(town_square: &TownSquare) -> Result<&Nomination> {
    Ok(town_square
        .open_nomination()
        .ok_or(IllegalState::NoOpenNomination)?)
}

fn open_nomination_mut(town_square: &mut TownSquare) -> Result<&mut Nomination> {
    Ok(town_square
        .open_nomination_mut()
        .ok_or(IllegalState::NoOpenNomination)?)
}

impl<'d> NominationEngine<'d> {
    #[must_use]
    pub fn new(directory: &'d dyn MemberDirectory) -> Self {
        Self { directory }
    }

    fn resolver<'a>(&'a self, town_square: &'a TownSquare) -> Resolver<'a> {
        Resolver::new(town_square, self.directory)
    }

    /// Name used for the caller in the game log.
    fn caller_name(&self, town_square: &TownSquare, caller: &Caller) -> String {
        town_square
            .participant(caller.id)
            .map(|p| p.alias.clone())
            .or_else(|| self.directory.display_name(caller.id).map(str::to_string))
            .unwrap_or_else(|| mention(caller.id))
    }

    fn default_alias(&self, id: ParticipantId) -> String {
        self.directory
            .display_name(id)
            .map_or_else(|| id.to_string(), str::to_string)
    }

    fn seated_player(&self, town_square: &TownSquare, identifier: &str) -> Result<ParticipantId> {
        let participant = self.resolver(town_square).resolve_participant(identifier)?;
        if town_square.is_seated(participant.id) {
            Ok(participant.id)
        } else {
            Err(IllegalState::NotSeated {
                alias: participant.alias.clone(),
            }
            .into())
        }
    }

    // ------------------------------------------------------------------
    // Town square lifecycle
    // ------------------------------------------------------------------

    /// Build a fresh town square, discarding any previous nomination state.
    pub fn setup(
        &self,
        caller: &Caller,
        players: &[ParticipantId],
        sts: &[ParticipantId],
    ) -> Result<(TownSquare, Applied)> {
        require_storyteller(caller)?;
        for (i, id) in players.iter().enumerate() {
            if players[..i].contains(id) {
                return Err(ValidationError::DuplicatePlayer(*id).into());
            }
        }

        let to_participant = |id: &ParticipantId| Participant::new(*id, self.default_alias(*id));
        let mut st_list: Vec<Participant> = Vec::with_capacity(sts.len());
        for st in sts.iter().map(to_participant) {
            if !st_list.contains(&st) {
                st_list.push(st);
            }
        }
        let town_square = TownSquare::new(players.iter().map(to_participant).collect(), st_list);
        let aliases = town_square
            .players
            .iter()
            .map(|p| p.alias.clone())
            .collect();
        tracing::info!(players = players.len(), sts = sts.len(), "Town square created");
        Ok((
            town_square,
            Applied::event(GameEvent::TownSquareCreated { players: aliases }),
        ))
    }

    /// Replace the seating order, keeping aliases and status of players who
    /// stay seated.
    pub fn update_roster(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        players: &[ParticipantId],
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        for (i, id) in players.iter().enumerate() {
            if players[..i].contains(id) {
                return Err(ValidationError::DuplicatePlayer(*id).into());
            }
        }

        let seated: Vec<Participant> = players
            .iter()
            .map(|id| {
                town_square
                    .player(*id)
                    .cloned()
                    .unwrap_or_else(|| Participant::new(*id, self.default_alias(*id)))
            })
            .collect();
        let removed: Vec<ParticipantId> = town_square
            .players
            .iter()
            .filter(|p| !seated.contains(p))
            .map(|p| p.id)
            .collect();
        let added: Vec<ParticipantId> = seated
            .iter()
            .filter(|p| !town_square.players.contains(p))
            .map(|p| p.id)
            .collect();

        let by = self.caller_name(town_square, caller);
        town_square.players = seated;
        let seats = town_square.players.len();
        if let Some(nom) = town_square.current_nomination.as_mut() {
            for id in &removed {
                nom.votes.remove(id);
            }
            for id in added {
                nom.votes.entry(id).or_insert_with(Vote::not_voted);
            }
            if nom.is_open() {
                settle_cursor(nom, &town_square.players);
            }
        }

        tracing::info!(seats, removed = removed.len(), "Town square updated");
        Ok(Applied::event(GameEvent::TownSquareUpdated {
            by,
            players: town_square
                .players
                .iter()
                .map(|p| p.alias.clone())
                .collect(),
        }))
    }

    /// Hand a seat (or a storyteller slot) to a different participant.
    pub fn substitute(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        old: ParticipantId,
        new: ParticipantId,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        let Some(old_alias) = town_square.participant(old).map(|p| p.alias.clone()) else {
            return Err(ResolveError::NotFound {
                identifier: mention(old),
            }
            .into());
        };
        if let Some(existing) = town_square.participant(new) {
            return Err(ValidationError::AlreadyParticipant(existing.alias.clone()).into());
        }

        let by = self.caller_name(town_square, caller);
        let new_alias = self.default_alias(new);
        for record in town_square
            .players
            .iter_mut()
            .chain(town_square.sts.iter_mut())
            .filter(|p| p.id == old)
        {
            record.id = new;
            record.alias.clone_from(&new_alias);
        }
        if let Some(nom) = town_square.current_nomination.as_mut() {
            if let Some(vote) = nom.votes.remove(&old) {
                nom.votes.insert(new, vote);
            }
            for side in [&mut nom.nominator, &mut nom.nominee] {
                if side.id == old {
                    side.id = new;
                    side.alias.clone_from(&new_alias);
                }
            }
        }

        tracing::info!(%old, %new, "Participant substituted");
        Ok(Applied::event(GameEvent::Substituted {
            by,
            old: old_alias,
            new: new_alias,
        }))
    }

    // ------------------------------------------------------------------
    // Nomination lifecycle
    // ------------------------------------------------------------------

    pub fn nominate(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        nominee: &str,
        nominator: Option<&str>,
    ) -> Result<Applied> {
        if !caller.participates() {
            return Err(Denial::NotAParticipant.into());
        }
        if !caller.is_storyteller() && !town_square.player_noms_allowed {
            return Err(Denial::PlayerNominationsDisabled.into());
        }
        if town_square.open_nomination().is_some() {
            return Err(IllegalState::NominationInProgress.into());
        }

        let resolver = self.resolver(town_square);
        let nominee = resolver
            .resolve_participant(nominee)
            .map_err(EngineError::InvalidNominee)?
            .clone();
        let nominator = match nominator {
            Some(identifier) => {
                let nominator = resolver
                    .resolve_participant(identifier)
                    .map_err(EngineError::InvalidNominator)?;
                if !caller.is_storyteller() && nominator.id != caller.id {
                    return Err(Denial::NominateOnBehalf.into());
                }
                nominator.clone()
            }
            None if caller.is_storyteller() => {
                return Err(ValidationError::NominatorRequired.into());
            }
            None => town_square
                .participant(caller.id)
                .cloned()
                .ok_or_else(|| {
                    EngineError::InvalidNominator(ResolveError::NotFound {
                        identifier: mention(caller.id),
                    })
                })?,
        };

        let event = GameEvent::Nominated {
            nominator: nominator.alias.clone(),
            nominee: nominee.alias.clone(),
        };
        let nomination = Nomination::new(nominator, nominee, &town_square.players);
        tracing::debug!(
            nominator = %nomination.nominator.id,
            nominee = %nomination.nominee.id,
            seats = nomination.votes.len(),
            "Nomination opened"
        );
        town_square.current_nomination = Some(nomination);
        Ok(Applied::event(event))
    }

    pub fn set_accusation(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        text: &str,
    ) -> Result<Applied> {
        let text = BoundedText::new(text, ACCUSATION_LIMIT)?;
        let nom = open_nomination(town_square)?;
        if !(caller.is_storyteller() || nom.nominator.is(caller.id)) {
            return Err(Denial::NotNominator.into());
        }
        let by = self.caller_name(town_square, caller);
        let nom = open_nomination_mut(town_square)?;
        nom.accusation = text.into_inner();
        Ok(Applied::event(GameEvent::AccusationSet {
            by,
            nominee: nom.nominee.alias.clone(),
            text: nom.accusation.clone(),
        }))
    }

    pub fn set_defense(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        text: &str,
    ) -> Result<Applied> {
        let text = BoundedText::new(text, DEFENSE_LIMIT)?;
        let nom = open_nomination(town_square)?;
        if !(caller.is_storyteller() || nom.nominee.is(caller.id)) {
            return Err(Denial::NotNominee.into());
        }
        let by = self.caller_name(town_square, caller);
        let nom = open_nomination_mut(town_square)?;
        nom.defense = text.into_inner();
        Ok(Applied::event(GameEvent::DefenseSet {
            by,
            nominee: nom.nominee.alias.clone(),
            text: nom.defense.clone(),
        }))
    }

    /// Record a vote; if the voter sits under the clockhand, lock as far as
    /// the already-cast votes allow.
    pub fn cast_vote(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        text: &str,
        voter: Option<&str>,
    ) -> Result<Applied> {
        let text = BoundedText::new(text, VOTE_TEXT_LIMIT)?;
        if is_reserved_vote_text(text.as_str().trim()) {
            return Err(ValidationError::ReservedVote(text.into_inner()).into());
        }
        if !caller.participates() {
            return Err(Denial::NotAParticipant.into());
        }

        let voter_id = match voter {
            Some(identifier) => self.resolver(town_square).resolve(identifier)?,
            None => caller.id,
        };
        if !caller.is_storyteller() && voter_id != caller.id {
            return Err(Denial::VoteOnBehalf.into());
        }
        let Some(voter) = town_square.player(voter_id) else {
            let alias = town_square
                .participant(voter_id)
                .map_or_else(|| mention(voter_id), |p| p.alias.clone());
            return Err(IllegalState::NotSeated { alias }.into());
        };
        if !voter.can_vote {
            return Err(IllegalState::CannotVote {
                alias: voter.alias.clone(),
            }
            .into());
        }
        let nom = open_nomination(town_square)?;
        if nom.vote_of(voter_id).is_some_and(Vote::is_confirmed) {
            return Err(IllegalState::VoteLocked {
                alias: voter.alias.clone(),
            }
            .into());
        }

        let voter_alias = voter.alias.clone();
        let voter_banshee = voter.banshee;
        let at_clockhand =
            clockhand_participant(nom, &town_square.players).is_some_and(|p| p.id == voter_id);
        let by = self.caller_name(town_square, caller);

        let nom = open_nomination_mut(town_square)?;
        let nominee = nom.nominee.alias.clone();
        let entry = nom.votes.entry(voter_id).or_default();
        entry.state = VoteState::Pending(text.as_str().to_string());
        entry.banshee = voter_banshee;

        let mut applied = Applied::event(GameEvent::VoteCast {
            by,
            voter: voter_alias,
            nominee: nominee.clone(),
            text: text.into_inner(),
        });

        if at_clockhand {
            let outcome = advance(town_square);
            for locked in &outcome.locked {
                applied.push(GameEvent::VoteLocked {
                    voter: locked.alias.clone(),
                    nominee: nominee.clone(),
                    yes: locked.yes,
                });
            }
            if outcome.locked.last().is_some_and(|l| l.finished) {
                applied.push(GameEvent::NominationFinished { nominee });
            }
            applied.notice = outcome.stalled;
        }
        Ok(applied)
    }

    /// Lock the vote under the clockhand, optionally overriding its text.
    pub fn lock_vote(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        override_text: Option<&str>,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        let override_text = override_text
            .map(|text| BoundedText::new(text, VOTE_TEXT_LIMIT))
            .transpose()?;
        let nominee = open_nomination(town_square)?.nominee.alias.clone();
        let locked = lock_next(town_square, override_text.as_deref())?;

        let mut applied = Applied::event(GameEvent::VoteLocked {
            voter: locked.alias,
            nominee: nominee.clone(),
            yes: locked.yes,
        });
        if locked.finished {
            applied.push(GameEvent::NominationFinished { nominee });
        }
        Ok(applied)
    }

    pub fn close(&self, town_square: &mut TownSquare, caller: &Caller) -> Result<Applied> {
        require_storyteller(caller)?;
        let by = self.caller_name(town_square, caller);
        let nom = open_nomination_mut(town_square)?;
        nom.finished = true;
        tracing::debug!(nominee = %nom.nominee.id, "Nomination closed");
        Ok(Applied::event(GameEvent::NominationClosed {
            by,
            nominee: nom.nominee.alias.clone(),
        }))
    }

    pub fn toggle_vote_modifier(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        voter: &str,
        modifier: VoteModifier,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        open_nomination(town_square)?;
        let voter_id = self.seated_player(town_square, voter)?;
        let by = self.caller_name(town_square, caller);
        let voter_alias = town_square
            .player(voter_id)
            .map(|p| p.alias.clone())
            .unwrap_or_default();

        let nom = open_nomination_mut(town_square)?;
        let entry = nom.votes.entry(voter_id).or_default();
        let enabled = modifier.toggle(entry);
        Ok(Applied::event(GameEvent::VoteModifierToggled {
            by,
            voter: voter_alias,
            modifier: modifier.as_str(),
            enabled,
        }))
    }

    // ------------------------------------------------------------------
    // Town-square settings
    // ------------------------------------------------------------------

    pub fn set_vote_threshold(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        threshold: u32,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        town_square.vote_threshold = threshold;
        Ok(Applied::event(GameEvent::ThresholdSet {
            by: self.caller_name(town_square, caller),
            threshold,
        }))
    }

    pub fn toggle_organ_grinder(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        town_square.organ_grinder = !town_square.organ_grinder;
        Ok(Applied::event(GameEvent::OrganGrinderToggled {
            enabled: town_square.organ_grinder,
        }))
    }

    pub fn toggle_player_noms(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        town_square.player_noms_allowed = !town_square.player_noms_allowed;
        Ok(Applied::event(GameEvent::PlayerNominationsToggled {
            enabled: town_square.player_noms_allowed,
        }))
    }

    pub fn toggle_auto_lock(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
    ) -> Result<Applied> {
        require_storyteller(caller)?;
        town_square.auto_lock_votes = !town_square.auto_lock_votes;
        Ok(Applied::event(GameEvent::AutoLockToggled {
            enabled: town_square.auto_lock_votes,
        }))
    }

    // ------------------------------------------------------------------
    // Participant status
    // ------------------------------------------------------------------

    fn toggle_player_flag(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        identifier: &str,
        flag: fn(&mut Participant) -> &mut bool,
    ) -> Result<(String, String, bool)> {
        require_storyteller(caller)?;
        let id = self.seated_player(town_square, identifier)?;
        let by = self.caller_name(town_square, caller);
        let player = town_square
            .player_mut(id)
            .ok_or(IllegalState::NotSeated { alias: mention(id) })?;
        let value = flag(player);
        *value = !*value;
        let enabled = *value;
        Ok((by, player.alias.clone(), enabled))
    }

    pub fn toggle_marked_dead(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        player: &str,
    ) -> Result<Applied> {
        let (by, player, dead) =
            self.toggle_player_flag(town_square, caller, player, |p| &mut p.dead)?;
        Ok(Applied::event(GameEvent::MarkedDead { by, player, dead }))
    }

    pub fn toggle_can_vote(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        player: &str,
    ) -> Result<Applied> {
        let (by, player, can_vote) =
            self.toggle_player_flag(town_square, caller, player, |p| &mut p.can_vote)?;
        Ok(Applied::event(GameEvent::CanVoteToggled {
            by,
            player,
            can_vote,
        }))
    }

    pub fn toggle_banshee(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        player: &str,
    ) -> Result<Applied> {
        let (by, player, banshee) =
            self.toggle_player_flag(town_square, caller, player, |p| &mut p.banshee)?;
        Ok(Applied::event(GameEvent::BansheeToggled {
            by,
            player,
            banshee,
        }))
    }

    /// Set the caller's own alias, as a player and as a storyteller.
    pub fn set_alias(
        &self,
        town_square: &mut TownSquare,
        caller: &Caller,
        alias: &str,
    ) -> Result<Applied> {
        let alias = Alias::new(alias)?;
        if !caller.participates() {
            return Err(Denial::NotAParticipant.into());
        }
        let Some(old) = town_square.participant(caller.id).map(|p| p.alias.clone()) else {
            return Err(IllegalState::NotSeated {
                alias: mention(caller.id),
            }
            .into());
        };

        let new = alias.into_inner();
        if let Some(player) = town_square.player_mut(caller.id) {
            player.alias.clone_from(&new);
        }
        if let Some(st) = town_square.st_mut(caller.id) {
            st.alias.clone_from(&new);
        }
        if let Some(nom) = town_square.current_nomination.as_mut() {
            for side in [&mut nom.nominator, &mut nom.nominee] {
                if side.id == caller.id {
                    side.alias.clone_from(&new);
                }
            }
        }
        Ok(Applied::event(GameEvent::AliasSet { old, new }))
    }

    /// Authorize ending the game; the caller drops the town square.
    pub fn end_game(&self, town_square: Option<&TownSquare>, caller: &Caller) -> Result<Applied> {
        require_storyteller(caller)?;
        let by = match town_square {
            Some(ts) => self.caller_name(ts, caller),
            None => self
                .directory
                .display_name(caller.id)
                .map_or_else(|| mention(caller.id), str::to_string),
        };
        Ok(Applied::event(GameEvent::GameEnded { by }))
    }
}
