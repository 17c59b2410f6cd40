//! Run orchestration: catalog lifetime, setup flow, command dispatch, the
//! end-of-day loop, persistence, and New Game Plus carry-over.
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GameStorage;
use crate::actions::{self, Command, CommandError, Resolution};
use crate::card::Card;
use crate::catalog::Catalog;
use crate::characters;
use crate::deck::{FILLER_SEQUENCE, build_decks};
use crate::narrative::{
    BossContext, IntroStory, Narrator, fallback_boss, fallback_epilogue, fallback_intro,
    validate_boss,
};
use crate::scaling::{ThemedCheckpoint, scale_catalog};
use crate::state::{GameState, LogKind, PLAYER_DECK_TARGET_SIZE, Status};
use crate::turn::{self, DayOutcome};

/// Scalars carried from a winning run into the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CarryOver {
    pub ng_plus: u32,
    pub gold: i32,
    pub deck_ids: Vec<String>,
    pub equipped_ids: Vec<String>,
    pub boss_defeated: bool,
}

/// A delayed store-slot refill, keyed by run so a stale timer from a dead
/// run cannot touch the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRestock {
    pub run_id: u64,
    pub slot: usize,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("command rejected: {0}")]
    Command(#[from] CommandError),
    #[error("not at the setup stage")]
    NotInSetup,
    #[error("the run is not in play")]
    NotPlaying,
    #[error("unknown character: {0}")]
    UnknownCharacter(String),
    #[error("character and name must be chosen before starting")]
    SetupIncomplete,
}

/// Owns the current run: scaled catalog, game state, narrative and storage
/// boundaries, and the queue of delayed store refills.
pub struct GameSession<N, S>
where
    N: Narrator,
    S: GameStorage,
{
    narrator: N,
    storage: S,
    catalog: Catalog,
    themed: Option<ThemedCheckpoint>,
    carry: Option<CarryOver>,
    augmentation: Vec<Card>,
    state: GameState,
    pending: Vec<PendingRestock>,
}

impl<N, S> GameSession<N, S>
where
    N: Narrator,
    S: GameStorage,
{
    /// Open a session: resume the persisted run when one parses cleanly,
    /// otherwise set up a fresh first run. Carry-over is left untouched
    /// until the player chooses how to continue.
    pub fn new(narrator: N, storage: S) -> Self {
        let themed = storage.load_theme().unwrap_or_else(|err| {
            log::warn!("themed catalog unreadable, ignoring: {err}");
            None
        });
        let mut session = Self {
            narrator,
            storage,
            catalog: Catalog::base().clone(),
            themed,
            carry: None,
            augmentation: Vec::new(),
            state: GameState::default(),
            pending: Vec::new(),
        };

        match session.storage.load_game() {
            Ok(Some(saved)) if saved.status != Status::Setup => {
                let mut state = saved.rehydrate();
                state.player.reset_daily_flags();
                state.log(LogKind::System, "Resumed the run from the saved ledger.");
                let (catalog, themed) = scale_catalog(
                    Catalog::base(),
                    state.ng_plus,
                    session.themed.as_ref(),
                    &session.narrator,
                );
                session.catalog = catalog;
                session.themed = themed;
                session.state = state;
                session.state.enforce_invariants();
            }
            Ok(Some(_)) | Ok(None) => session.new_run(0),
            Err(err) => {
                log::warn!("saved run unreadable, starting fresh: {err}");
                session.new_run(0);
            }
        }
        session
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn pending_restocks(&self) -> &[PendingRestock] {
        &self.pending
    }

    /// Set up a fresh run at the given progression level: scale the catalog,
    /// obtain a boss (with fallback), and deal the decks.
    fn new_run(&mut self, ng_plus: u32) {
        let (catalog, themed) = scale_catalog(
            Catalog::base(),
            ng_plus,
            self.themed.as_ref(),
            &self.narrator,
        );
        self.catalog = catalog;
        if let Some(theme) = &themed {
            if let Err(err) = self.storage.save_theme(theme) {
                log::warn!("could not persist themed catalog: {err}");
            }
        }
        self.themed = themed;

        let boss = self
            .narrator
            .generate_boss(&BossContext {
                player_name: None,
                character: None,
                ng_plus,
            })
            .and_then(validate_boss)
            .unwrap_or_else(|err| {
                log::warn!("boss generation failed, using the stock boss: {err}");
                fallback_boss(ng_plus)
            });

        let seed: u64 = rand::rng().random();
        let mut state = GameState::default().with_seed(seed);
        state.run_id = seed;
        state.ng_plus = ng_plus;
        state.player.ng_plus = ng_plus;
        state.log(LogKind::System, "Setting up a new run into the frontier.");

        let decks = {
            let rng = state.rng_mut();
            build_decks(&self.catalog, Some(boss.id.as_str()), ng_plus, rng)
        };
        state.event_deck = decks.event_deck;
        state.store_deck = decks.store_deck;
        state.store_display = decks.store_display;
        state.boss = Some(boss);
        self.augmentation = decks.augmentation;
        self.pending.clear();
        self.state = state;
        self.persist();
    }

    /// Choose a character during setup.
    ///
    /// # Errors
    ///
    /// Fails when the run is past setup or the id is unknown.
    pub fn select_character(&mut self, character_id: &str) -> Result<(), SessionError> {
        if self.state.status != Status::Setup {
            return Err(SessionError::NotInSetup);
        }
        let character = characters::get(character_id)
            .ok_or_else(|| SessionError::UnknownCharacter(character_id.to_string()))?;

        let ng_plus = self.state.ng_plus;
        let health = character.scaled_health(ng_plus);
        let gold = if ng_plus == 0 {
            character.gold
        } else {
            self.carry
                .as_ref()
                .map_or(character.gold, |carry| carry.gold)
        };
        let player = &mut self.state.player;
        player.character = Some(character.clone());
        player.health = health;
        player.max_health = health;
        player.gold = gold;
        self.state.log(
            LogKind::System,
            format!("{} selected. Health {health}, gold {gold}.", character.name),
        );
        self.persist();
        Ok(())
    }

    /// Name the character during setup.
    ///
    /// # Errors
    ///
    /// Fails when the run is past setup.
    pub fn confirm_name(&mut self, name: &str) -> Result<(), SessionError> {
        if self.state.status != Status::Setup {
            return Err(SessionError::NotInSetup);
        }
        self.state.player.name = Some(name.to_string());
        self.state
            .log(LogKind::System, format!("Name set to {name}."));
        self.persist();
        Ok(())
    }

    /// Finalize the player deck and move to the opening reveal. Returns the
    /// intro story, templated locally if the narrative backend fails.
    ///
    /// # Errors
    ///
    /// Fails when setup is incomplete.
    pub fn start_game(&mut self) -> Result<IntroStory, SessionError> {
        if self.state.status != Status::Setup {
            return Err(SessionError::NotInSetup);
        }
        let (Some(character), Some(name)) = (
            self.state.player.character.clone(),
            self.state.player.name.clone(),
        ) else {
            return Err(SessionError::SetupIncomplete);
        };

        let mut deck: Vec<Card> = character
            .starter_deck
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect();
        deck.append(&mut self.augmentation);

        if self.state.ng_plus > 0
            && let Some(carry) = self.carry.take()
        {
            let carried: Vec<Card> = carry
                .deck_ids
                .iter()
                .filter_map(|id| self.catalog.get(id).cloned())
                .collect();
            if !carried.is_empty() {
                self.state.log(
                    LogKind::System,
                    format!("{} cards carried over from the last run.", carried.len()),
                );
                deck.extend(carried);
            }
            for id in carry
                .equipped_ids
                .iter()
                .take(self.state.player.equip_slots)
            {
                if let Some(item) = self.catalog.get(id).cloned() {
                    self.state.player.apply_persistent(&item);
                    self.state.player.equipped.push(item);
                }
            }
        }

        let mut filler = FILLER_SEQUENCE.iter().cycle();
        while deck.len() < PLAYER_DECK_TARGET_SIZE {
            if let Some(card) = filler.next().and_then(|id| self.catalog.get(id)) {
                deck.push(card.clone());
            } else {
                break;
            }
        }

        {
            use rand::seq::SliceRandom;
            let rng = self.state.rng_mut();
            deck.shuffle(rng);
        }
        self.state.player.deck = deck;
        let hand_size = self.state.player.hand_size;
        let seed = self.state.seed;
        let mut rng = self
            .state
            .rng
            .take()
            .unwrap_or_else(|| rand_chacha::ChaCha20Rng::seed_from_u64(seed));
        self.state.player.draw_to_hand(hand_size, &mut rng);
        self.state.rng = Some(rng);
        self.state.player.sort_hand();

        self.state.status = Status::InitialReveal;
        self.state.log(
            LogKind::System,
            format!(
                "Deck finalized with {} cards. The run begins.",
                self.state.player.deck.len() + self.state.player.hand_count()
            ),
        );

        let boss = self.state.boss.clone().unwrap_or_else(|| fallback_boss(0));
        let intro = self
            .narrator
            .intro_story(&name, &character, &boss)
            .unwrap_or_else(|err| {
                log::warn!("intro story failed, using the template: {err}");
                fallback_intro(&name, &character, &boss)
            });
        self.persist();
        Ok(intro)
    }

    /// Reveal the opening event and enter play. A day-ending opening event
    /// leaves the first day already over.
    ///
    /// # Errors
    ///
    /// Fails when the run is not waiting on its opening reveal.
    pub fn reveal_opening_event(&mut self) -> Result<(), SessionError> {
        if self.state.status != Status::InitialReveal {
            return Err(SessionError::NotPlaying);
        }
        self.state.status = Status::Playing;
        if self.state.active_event.is_none()
            && !self.state.player.campfire_lit
            && let Some(card) = self.state.event_deck.pop()
        {
            self.state.active_event = Some(card);
            self.state.active_event_days = 1;
            let outcome = turn::resolve_reveal(&mut self.state);
            if outcome.day_over {
                self.state.player.turn_ended = true;
            }
        }
        self.state.refresh_trade_gate();
        self.state.enforce_invariants();
        if self.state.is_finished() {
            self.handle_finish();
        }
        self.persist();
        Ok(())
    }

    /// Apply one player command.
    ///
    /// # Errors
    ///
    /// Fails when the run is not in play or the command's preconditions are
    /// violated; rejected commands leave the state untouched.
    pub fn dispatch(&mut self, command: Command) -> Result<Resolution, SessionError> {
        if self.state.status != Status::Playing {
            return Err(SessionError::NotPlaying);
        }
        let resolution = actions::resolve(&mut self.state, command);
        match resolution {
            Ok(resolution) => {
                if let Some(slot) = resolution.refill_slot {
                    self.pending.push(PendingRestock {
                        run_id: self.state.run_id,
                        slot,
                    });
                }
                if self.state.is_finished() {
                    self.handle_finish();
                }
                self.state.enforce_invariants();
                self.persist();
                Ok(resolution)
            }
            Err(err) => {
                self.state.log(LogKind::Error, err.to_string());
                Err(err.into())
            }
        }
    }

    /// Close out the current day and resolve the night.
    ///
    /// # Errors
    ///
    /// Fails when the run is not in play.
    pub fn end_day(&mut self) -> Result<DayOutcome, SessionError> {
        if self.state.status != Status::Playing {
            return Err(SessionError::NotPlaying);
        }
        let outcome = turn::end_day(&mut self.state);
        if outcome.finished {
            self.handle_finish();
        }
        self.persist();
        Ok(outcome)
    }

    /// Fire queued store refills whose delay has elapsed. Stale tasks from
    /// an earlier run, a finished run, or an already-refilled slot are
    /// dropped without effect.
    pub fn fire_pending(&mut self) {
        let tasks = std::mem::take(&mut self.pending);
        let mut changed = false;
        for task in tasks {
            if task.run_id != self.state.run_id || self.state.is_finished() {
                continue;
            }
            let slot_empty = self
                .state
                .store_display
                .get(task.slot)
                .is_some_and(Option::is_none);
            if slot_empty
                && let Some(card) = self.state.store_deck.pop()
            {
                self.state.store_display[task.slot] = Some(card);
                changed = true;
            }
        }
        if changed {
            self.persist();
        }
    }

    /// Closing narration for a finished run, templated locally when the
    /// backend fails.
    #[must_use]
    pub fn epilogue(&self) -> String {
        let outcome = self
            .state
            .win_reason
            .clone()
            .unwrap_or_else(|| String::from("The trail ran out before the story did."));
        self.narrator
            .epilogue(&self.state.log, &outcome)
            .unwrap_or_else(|err| {
                log::warn!("epilogue failed, using the template: {err}");
                fallback_epilogue(&outcome)
            })
    }

    /// Start over. `continue_ng` carries the last win's progression into
    /// the next run; otherwise progression and themes reset to the start.
    pub fn reset(&mut self, continue_ng: bool) {
        if let Err(err) = self.storage.clear_game() {
            log::warn!("could not clear the saved run: {err}");
        }
        if continue_ng {
            self.carry = self.storage.load_carry().unwrap_or_else(|err| {
                log::warn!("carry-over unreadable, starting level zero: {err}");
                None
            });
            let ng_plus = self.carry.as_ref().map_or(0, |c| c.ng_plus);
            self.new_run(ng_plus);
        } else {
            if let Err(err) = self.storage.clear_carry() {
                log::warn!("could not clear carry-over: {err}");
            }
            if let Err(err) = self.storage.clear_theme() {
                log::warn!("could not clear themed catalog: {err}");
            }
            self.themed = None;
            self.carry = None;
            self.new_run(0);
        }
    }

    /// Record carry-over for a won run, or wipe progression for a lost one,
    /// then drop the persisted mid-run blob.
    fn handle_finish(&mut self) {
        if self.state.player.health > 0 {
            let player = &self.state.player;
            let mut deck_ids: Vec<String> = player.deck.iter().map(|c| c.id.clone()).collect();
            deck_ids.extend(player.discard.iter().map(|c| c.id.clone()));
            deck_ids.extend(player.hand_cards().map(|c| c.id.clone()));
            let carry = CarryOver {
                ng_plus: self.state.ng_plus + 1,
                gold: player.gold,
                deck_ids,
                equipped_ids: player.equipped.iter().map(|c| c.id.clone()).collect(),
                boss_defeated: self.state.boss_defeated,
            };
            if let Err(err) = self.storage.save_carry(&carry) {
                log::warn!("could not persist carry-over: {err}");
            }
        } else {
            if let Err(err) = self.storage.clear_carry() {
                log::warn!("could not clear carry-over: {err}");
            }
            if let Err(err) = self.storage.clear_theme() {
                log::warn!("could not clear themed catalog: {err}");
            }
            self.themed = None;
        }
        if let Err(err) = self.storage.clear_game() {
            log::warn!("could not clear the saved run: {err}");
        }
    }

    /// Persist after every mutation; storage trouble is logged, never fatal.
    /// Setup states are not worth keeping and finished runs are cleared by
    /// `handle_finish`, so only live play is written.
    fn persist(&mut self) {
        if matches!(self.state.status, Status::Setup | Status::Finished) {
            return;
        }
        if let Err(err) = self.storage.save_game(&self.state) {
            log::warn!("could not save the run: {err}");
            self.state
                .log(LogKind::Error, "Progress could not be saved.");
        }
    }
}
