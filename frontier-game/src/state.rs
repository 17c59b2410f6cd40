//! Run state: the player aggregate, the session root, logging, and the
//! UI-facing signal queue.
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::card::{Card, UpgradeKind};
use crate::characters::Character;

pub const PLAYER_ID: &str = "player1";
pub const HAND_LIMIT: usize = 6;
pub const EQUIP_LIMIT: usize = 3;
pub const STORE_DISPLAY_LIMIT: usize = 3;
pub const EVENT_DECK_SIZE: usize = 20;
pub const PLAYER_DECK_TARGET_SIZE: usize = 13;
pub const STORE_DECK_TARGET_SIZE: usize = 20;
pub const MAX_LOG_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Setup,
    /// Decks are dealt; the opening event has not been revealed yet.
    InitialReveal,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Error,
    Action,
    System,
    Turn,
    Event,
    Gold,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub day: u32,
    pub kind: LogKind,
    pub message: String,
}

/// Bounded ring of log entries; oldest entries fall off the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
}

impl GameLog {
    pub fn push(&mut self, day: u32, kind: LogKind, message: impl Into<String>) {
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            day,
            kind,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, fragment: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(fragment))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    EventAlert,
    ThreatDefeated,
    GenericInfo,
}

/// Presentation hints produced by the core and drained by the shell. The
/// core never waits on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    Banner { message: String, kind: BannerKind },
    GoldFlash,
    PlayerDamage { amount: i32, source: String },
    PlayerHeal { amount: i32 },
    LightningFlash,
    SkunkSpray,
    TrapSprung,
    EventItemTaken,
    HatSaved,
}

pub type Equipped = SmallVec<[Card; EQUIP_LIMIT]>;
pub type Satchel = SmallVec<[Card; 4]>;

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character: Option<Character>,
    pub health: i32,
    pub max_health: i32,
    pub gold: i32,
    /// Fixed-length sparse hand; `None` marks an empty slot.
    pub hand: Vec<Option<Card>>,
    #[serde(default)]
    pub equipped: Equipped,
    #[serde(default)]
    pub active_trap: Option<Card>,
    #[serde(default)]
    pub satchel: Satchel,
    pub deck: Vec<Card>,
    pub discard: Vec<Card>,
    pub hand_size: usize,
    pub equip_slots: usize,
    #[serde(default)]
    pub campfire_lit: bool,
    #[serde(default)]
    pub turn_ended: bool,
    #[serde(default)]
    pub took_action_today: bool,
    #[serde(default)]
    pub equipped_today: bool,
    #[serde(default)]
    pub restocked_today: bool,
    #[serde(default)]
    pub unsorted_hand: bool,
    #[serde(default)]
    pub hat_negation_ready: bool,
    #[serde(default)]
    pub hat_negation_spent_today: bool,
    #[serde(default)]
    pub ng_plus: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            name: None,
            character: None,
            health: 0,
            max_health: 0,
            gold: 10,
            hand: vec![None; HAND_LIMIT],
            equipped: Equipped::new(),
            active_trap: None,
            satchel: Satchel::new(),
            deck: Vec::new(),
            discard: Vec::new(),
            hand_size: HAND_LIMIT,
            equip_slots: EQUIP_LIMIT,
            campfire_lit: false,
            turn_ended: false,
            took_action_today: false,
            equipped_today: false,
            restocked_today: false,
            unsorted_hand: false,
            hat_negation_ready: false,
            hat_negation_spent_today: false,
            ng_plus: 0,
        }
    }
}

impl PlayerState {
    #[must_use]
    pub fn hand_count(&self) -> usize {
        self.hand.iter().filter(|c| c.is_some()).count()
    }

    pub fn hand_cards(&self) -> impl Iterator<Item = &Card> {
        self.hand.iter().filter_map(Option::as_ref)
    }

    #[must_use]
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.hand.iter().position(Option::is_none)
    }

    /// Resort the hand into the fixed category order, compacting cards to
    /// the front and empty slots to the back.
    pub fn sort_hand(&mut self) {
        let mut cards: Vec<Card> = self.hand.iter_mut().filter_map(Option::take).collect();
        cards.sort_by(|a, b| {
            a.hand_sort_rank()
                .cmp(&b.hand_sort_rank())
                .then_with(|| a.name.cmp(&b.name))
        });
        for (slot, card) in self.hand.iter_mut().zip(cards) {
            *slot = Some(card);
        }
        self.unsorted_hand = false;
    }

    /// Discard every card in hand, leaving all slots empty.
    pub fn discard_hand(&mut self) {
        for slot in &mut self.hand {
            if let Some(card) = slot.take() {
                self.discard.push(card);
            }
        }
    }

    /// Draw up to `count` cards into the first empty hand slots, reshuffling
    /// the discard pile into the deck on exhaustion. Returns how many cards
    /// actually landed.
    pub fn draw_to_hand(&mut self, count: usize, rng: &mut ChaCha20Rng) -> usize {
        let mut drawn = 0;
        for _ in 0..count {
            if self.deck.is_empty() {
                if self.discard.is_empty() {
                    break;
                }
                self.deck.append(&mut self.discard);
                self.deck.shuffle(rng);
            }
            let Some(slot) = self.first_empty_slot() else {
                break;
            };
            if let Some(card) = self.deck.pop() {
                self.hand[slot] = Some(card);
                drawn += 1;
            }
        }
        if drawn > 0 {
            self.unsorted_hand = true;
        }
        drawn
    }

    /// Capacity of the first equipped storage upgrade, if any.
    #[must_use]
    pub fn storage_capacity(&self) -> usize {
        self.equipped
            .iter()
            .find_map(|c| match c.upgrade_kind() {
                Some(UpgradeKind::Storage { capacity }) => Some(capacity),
                _ => None,
            })
            .unwrap_or(0)
    }

    #[must_use]
    pub fn damage_reduction(&self) -> i32 {
        self.equipped
            .iter()
            .filter_map(|c| match c.upgrade_kind() {
                Some(UpgradeKind::DamageReduction { amount }) => Some(amount),
                _ => None,
            })
            .sum()
    }

    #[must_use]
    pub fn sell_bonus(&self) -> i32 {
        self.equipped
            .iter()
            .filter_map(|c| match c.upgrade_kind() {
                Some(UpgradeKind::SellBoost { amount }) => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Index of the equipped damage-negation hat, if one is worn.
    #[must_use]
    pub fn negation_hat_index(&self) -> Option<usize> {
        self.equipped.iter().position(|c| {
            matches!(c.upgrade_kind(), Some(UpgradeKind::DamageNegation { .. }))
        })
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.min(self.max_health - self.health).max(0);
        self.health += healed;
        healed
    }

    /// Apply a persistent upgrade's effects the moment it is equipped.
    pub fn apply_persistent(&mut self, card: &Card) {
        match card.upgrade_kind() {
            Some(UpgradeKind::MaxHealth { amount }) => {
                self.max_health += amount;
                self.health += amount;
            }
            Some(UpgradeKind::DamageNegation { bonus_health }) => {
                self.hat_negation_ready = true;
                self.max_health += bonus_health;
                self.health += bonus_health;
            }
            _ => {}
        }
    }

    /// Unwind a persistent upgrade's effects when it leaves the equipped
    /// slots, mirroring `apply_persistent`. Satchel overflow from a removed
    /// storage upgrade spills into the discard pile.
    pub fn unwind_persistent(&mut self, card: &Card) {
        match card.upgrade_kind() {
            Some(UpgradeKind::MaxHealth { amount }) => {
                self.max_health = (self.max_health - amount).max(1);
                self.health = self.health.min(self.max_health);
            }
            Some(UpgradeKind::DamageNegation { bonus_health }) => {
                self.max_health = (self.max_health - bonus_health).max(1);
                self.health = self.health.min(self.max_health);
                let still_hatted = self.negation_hat_index().is_some();
                self.hat_negation_ready = self.hat_negation_ready && still_hatted;
            }
            Some(UpgradeKind::Storage { .. }) => {
                let capacity = self.storage_capacity();
                while self.satchel.len() > capacity {
                    if let Some(spilled) = self.satchel.pop() {
                        self.discard.push(spilled);
                    }
                }
            }
            _ => {}
        }
    }

    /// Reset the turn-scoped flags for a fresh day.
    pub fn reset_daily_flags(&mut self) {
        self.turn_ended = false;
        self.took_action_today = false;
        self.equipped_today = false;
        self.restocked_today = false;
        self.hat_negation_spent_today = false;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub status: Status,
    pub player: PlayerState,
    pub event_deck: Vec<Card>,
    pub event_discard: Vec<Card>,
    #[serde(default)]
    pub active_event: Option<Card>,
    /// Consecutive days the active event has stayed in play.
    #[serde(default)]
    pub active_event_days: u32,
    /// Whether the active event was attacked during the current day.
    #[serde(default)]
    pub active_event_attacked: bool,
    pub store_deck: Vec<Card>,
    pub store_display: Vec<Option<Card>>,
    #[serde(default)]
    pub store_discard: Vec<Card>,
    pub day: u32,
    #[serde(default)]
    pub log: GameLog,
    #[serde(default)]
    pub ng_plus: u32,
    #[serde(default)]
    pub boss: Option<Card>,
    #[serde(default)]
    pub boss_defeated: bool,
    #[serde(default)]
    pub win_reason: Option<String>,
    #[serde(default)]
    pub trade_blocked: bool,
    #[serde(default)]
    pub signals: Vec<Signal>,
    /// Serial for minted trophy ids, unique within the run.
    #[serde(default)]
    pub minted: u32,
    #[serde(default)]
    pub run_id: u64,
    #[serde(default)]
    pub seed: u64,
    #[serde(skip)]
    pub rng: Option<ChaCha20Rng>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            status: Status::Setup,
            player: PlayerState::default(),
            event_deck: Vec::new(),
            event_discard: Vec::new(),
            active_event: None,
            active_event_days: 0,
            active_event_attacked: false,
            store_deck: Vec::new(),
            store_display: vec![None; STORE_DISPLAY_LIMIT],
            store_discard: Vec::new(),
            day: 1,
            log: GameLog::default(),
            ng_plus: 0,
            boss: None,
            boss_defeated: false,
            win_reason: None,
            trade_blocked: false,
            signals: Vec::new(),
            minted: 0,
            run_id: 0,
            seed: 0,
            rng: None,
        }
    }
}

impl GameState {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Some(ChaCha20Rng::seed_from_u64(seed));
        self
    }

    /// Re-attach the RNG after deserialization.
    #[must_use]
    pub fn rehydrate(mut self) -> Self {
        self.rng = Some(ChaCha20Rng::seed_from_u64(self.seed));
        self
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha20Rng {
        let seed = self.seed;
        self.rng
            .get_or_insert_with(|| ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.log.push(self.day, kind, message);
    }

    pub fn signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn banner(&mut self, message: impl Into<String>, kind: BannerKind) {
        let message = message.into();
        self.signals.push(Signal::Banner { message, kind });
    }

    /// Drain pending presentation hints for the shell to play out.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    /// Mint the next trophy serial.
    pub fn next_serial(&mut self) -> u32 {
        self.minted += 1;
        self.minted
    }

    #[must_use]
    pub fn player_label(&self) -> String {
        self.player
            .name
            .clone()
            .unwrap_or_else(|| String::from(PLAYER_ID))
    }

    /// Recompute whether the active event locks down trade.
    pub fn refresh_trade_gate(&mut self) {
        self.trade_blocked = self
            .active_event
            .as_ref()
            .is_some_and(Card::is_hostile_event);
    }

    pub fn finish(&mut self, reason: impl Into<String>) {
        if self.status != Status::Finished {
            let reason = reason.into();
            self.log(LogKind::System, reason.clone());
            self.win_reason = Some(reason);
            self.status = Status::Finished;
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }

    /// Defensive consistency check. Inconsistent states are logged loudly
    /// and forced into `Finished` rather than allowed to keep playing.
    pub fn enforce_invariants(&mut self) {
        if self.player.hand.len() != self.player.hand_size {
            self.log(
                LogKind::Error,
                format!(
                    "hand slot count {} drifted from hand size {}; repairing",
                    self.player.hand.len(),
                    self.player.hand_size
                ),
            );
            self.player.hand.resize(self.player.hand_size, None);
        }
        if self.player.health <= 0 && self.status != Status::Finished {
            self.log(
                LogKind::Error,
                "player is down but the run is still marked live; forcing the end",
            );
            self.finish("The frontier claimed another soul.");
            return;
        }
        let out_of_cards = self.player.deck.is_empty()
            && self.player.discard.is_empty()
            && self.player.hand_count() == 0;
        if out_of_cards && self.status == Status::Playing && self.player.health > 0 {
            self.log(
                LogKind::Error,
                "no cards left anywhere for a living player; forcing the end",
            );
            self.finish("Stranded with empty hands, the run is over.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn card(id: &str) -> Card {
        Catalog::base().get(id).unwrap().clone()
    }

    fn fixture_player() -> PlayerState {
        PlayerState {
            health: 10,
            max_health: 10,
            ..PlayerState::default()
        }
    }

    #[test]
    fn log_ring_is_bounded() {
        let mut log = GameLog::default();
        for i in 0..(MAX_LOG_ENTRIES + 25) {
            log.push(1, LogKind::Debug, format!("entry {i}"));
        }
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        assert!(!log.contains("entry 0"));
        assert!(log.contains(&format!("entry {}", MAX_LOG_ENTRIES + 24)));
    }

    #[test]
    fn sort_hand_orders_categories_and_compacts() {
        let mut player = fixture_player();
        player.hand[1] = Some(card("provision_steak"));
        player.hand[3] = Some(card("item_rifle_t1"));
        player.hand[5] = Some(card("upgrade_bearskin_coat"));
        player.sort_hand();
        assert_eq!(player.hand[0].as_ref().unwrap().id, "upgrade_bearskin_coat");
        assert_eq!(player.hand[1].as_ref().unwrap().id, "item_rifle_t1");
        assert_eq!(player.hand[2].as_ref().unwrap().id, "provision_steak");
        assert!(player.hand[3].is_none());
        assert_eq!(player.hand.len(), HAND_LIMIT);
    }

    #[test]
    fn draw_reshuffles_discard_when_deck_runs_out() {
        let mut player = fixture_player();
        player.deck = vec![card("provision_steak")];
        player.discard = vec![card("provision_water_t1"), card("provision_hardtack")];
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let drawn = player.draw_to_hand(3, &mut rng);
        assert_eq!(drawn, 3);
        assert!(player.discard.is_empty());
        assert_eq!(player.hand_count(), 3);
    }

    #[test]
    fn draw_stops_at_full_hand() {
        let mut player = fixture_player();
        player.deck = (0..10).map(|_| card("provision_water_t1")).collect();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let drawn = player.draw_to_hand(10, &mut rng);
        assert_eq!(drawn, HAND_LIMIT);
        assert_eq!(player.hand_count(), HAND_LIMIT);
        assert_eq!(player.deck.len(), 10 - HAND_LIMIT);
    }

    #[test]
    fn persistent_max_health_applies_and_unwinds() {
        let mut player = fixture_player();
        let coat = card("upgrade_bearskin_coat");
        player.apply_persistent(&coat);
        assert_eq!(player.max_health, 17);
        assert_eq!(player.health, 17);
        player.unwind_persistent(&coat);
        assert_eq!(player.max_health, 10);
        assert_eq!(player.health, 10);
    }

    #[test]
    fn removing_storage_spills_satchel_overflow() {
        let mut player = fixture_player();
        let satchel = card("upgrade_canvas_satchel_t1");
        player.equipped.push(satchel.clone());
        player.satchel.push(card("provision_steak"));
        player.satchel.push(card("provision_water_t1"));
        player.equipped.clear();
        player.unwind_persistent(&satchel);
        assert!(player.satchel.is_empty());
        assert_eq!(player.discard.len(), 2);
    }

    #[test]
    fn invariant_check_forces_finish_on_dead_player() {
        let mut state = GameState::default();
        state.status = Status::Playing;
        state.player.health = 0;
        state.enforce_invariants();
        assert_eq!(state.status, Status::Finished);
        assert!(state.win_reason.is_some());
    }

    #[test]
    fn invariant_check_forces_finish_when_out_of_cards() {
        let mut state = GameState::default();
        state.status = Status::Playing;
        state.player.health = 5;
        state.enforce_invariants();
        assert_eq!(state.status, Status::Finished);
    }
}
