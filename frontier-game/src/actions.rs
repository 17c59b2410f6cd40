//! Player command validation and application.
//!
//! Every command validates all of its preconditions before touching state:
//! a rejected command is a pure rejection, never a partial apply.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{Card, CardEffect, CardKind, make_trophy};
use crate::combat::{FIRE_ARROW_DAMAGE, PlaySource, attack_power, has_bow, heal_amount};
use crate::state::{BannerKind, GameState, LogKind, Signal};

/// Price multiplier applied to store purchases on a first run. Repeat runs
/// buy at face value.
pub const FIRST_RUN_PRICE_FACTOR: i32 = 2;
pub const RESTOCK_COST: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSource {
    Hand,
    Equipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Play { source: CardSource, index: usize },
    Equip { index: usize },
    Stash { index: usize },
    UseStashed { index: usize },
    Buy { slot: usize },
    Sell { source: CardSource, index: usize },
    TakeEventItem,
    DiscardEquipped { index: usize },
    RestockStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("the run is already finished")]
    GameFinished,
    #[error("the day is already over")]
    DayEnded,
    #[error("no card in the chosen slot")]
    EmptySlot,
    #[error("index {0} is out of range")]
    OutOfRange(usize),
    #[error("that card cannot be played for an effect")]
    Unplayable,
    #[error("no living threat to attack")]
    NoActiveThreat,
    #[error("fire arrows need a bow in hand or equipped")]
    NeedsBow,
    #[error("only one piece of gear can be equipped per day")]
    AlreadyEquippedToday,
    #[error("no free equip slot")]
    EquipSlotsFull,
    #[error("no storage upgrade equipped")]
    NoStorage,
    #[error("the satchel is full")]
    SatchelFull,
    #[error("only provisions fit in the satchel")]
    NotAProvision,
    #[error("that effect cannot be used from the satchel")]
    UnsupportedFromSatchel,
    #[error("a hostile event blocks trade")]
    TradeBlocked,
    #[error("not enough gold: {needed} needed")]
    InsufficientGold { needed: i32 },
    #[error("that card has no sale value")]
    NothingToSell,
    #[error("the store slot is empty")]
    EmptyStoreSlot,
    #[error("no event item to take")]
    NoEventItem,
    #[error("an action was already taken today")]
    ActionAlreadyTaken,
    #[error("the store was already restocked today")]
    AlreadyRestocked,
}

/// Side effects the session owes after a successful command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Store display slot to refill after the sold-out delay.
    pub refill_slot: Option<usize>,
    /// Card previewed by a scouting action; it stays on the event deck.
    pub scouted: Option<Card>,
}

/// Apply one player command to the state, or reject it with no mutation.
///
/// # Errors
///
/// Returns a [`CommandError`] naming the violated precondition; the state
/// is untouched on any error.
pub fn resolve(state: &mut GameState, command: Command) -> Result<Resolution, CommandError> {
    if state.is_finished() {
        return Err(CommandError::GameFinished);
    }
    if state.player.turn_ended {
        return Err(CommandError::DayEnded);
    }

    let resolution = match command {
        Command::Play { source, index } => play(state, source, index)?,
        Command::Equip { index } => equip(state, index)?,
        Command::Stash { index } => stash(state, index)?,
        Command::UseStashed { index } => use_stashed(state, index)?,
        Command::Buy { slot } => buy(state, slot)?,
        Command::Sell { source, index } => sell(state, source, index)?,
        Command::TakeEventItem => take_event_item(state)?,
        Command::DiscardEquipped { index } => discard_equipped(state, index)?,
        Command::RestockStore => restock(state)?,
    };

    if state.player.unsorted_hand {
        state.player.sort_hand();
    }
    Ok(resolution)
}

fn card_at(state: &GameState, source: CardSource, index: usize) -> Result<Card, CommandError> {
    match source {
        CardSource::Hand => {
            let slot = state
                .player
                .hand
                .get(index)
                .ok_or(CommandError::OutOfRange(index))?;
            slot.clone().ok_or(CommandError::EmptySlot)
        }
        CardSource::Equipped => state
            .player
            .equipped
            .get(index)
            .cloned()
            .ok_or(CommandError::OutOfRange(index)),
    }
}

fn remove_card(state: &mut GameState, source: CardSource, index: usize) -> Option<Card> {
    match source {
        CardSource::Hand => state.player.hand.get_mut(index).and_then(Option::take),
        CardSource::Equipped => {
            if index < state.player.equipped.len() {
                Some(state.player.equipped.remove(index))
            } else {
                None
            }
        }
    }
}

fn living_threat(state: &GameState) -> Result<(), CommandError> {
    match state.active_event.as_ref() {
        Some(event) if event.is_threat() && event.health.unwrap_or(0) > 0 => Ok(()),
        _ => Err(CommandError::NoActiveThreat),
    }
}

fn with_rng<R>(state: &mut GameState, f: impl FnOnce(&mut GameState, &mut ChaCha20Rng) -> R) -> R {
    let seed = state.seed;
    let mut rng = state
        .rng
        .take()
        .unwrap_or_else(|| ChaCha20Rng::seed_from_u64(seed));
    let out = f(state, &mut rng);
    state.rng = Some(rng);
    out
}

/// Apply weapon damage to the active threat, paying out and minting a
/// trophy when it dies. A dead boss ends the run immediately.
fn strike_threat(state: &mut GameState, power: i32, weapon_name: &str) {
    let Some(mut threat) = state.active_event.take() else {
        return;
    };
    let label = state.player_label();
    let remaining = (threat.health.unwrap_or(0) - power).max(0);
    threat.health = Some(remaining);
    state.active_event_attacked = true;
    state.log(
        LogKind::Action,
        format!(
            "{label} attacks {} with {weapon_name} for {power} damage.",
            threat.name
        ),
    );

    if remaining > 0 {
        state.active_event = Some(threat);
        return;
    }

    let bounty = threat.gold_value.unwrap_or(0);
    if bounty > 0 {
        state.player.gold += bounty;
        state.log(LogKind::Gold, format!("Gained {bounty} gold."));
        state.signal(Signal::GoldFlash);
    }
    state.log(LogKind::Event, format!("{} defeated!", threat.name));
    state.banner(format!("{} Defeated!", threat.name), BannerKind::ThreatDefeated);
    let serial = state.next_serial();
    state.player.discard.push(make_trophy(&threat, serial));

    let is_boss = state.boss.as_ref().is_some_and(|b| b.id == threat.id);
    state.event_discard.push(threat);
    state.active_event = None;
    state.active_event_days = 0;
    state.refresh_trade_gate();
    if is_boss {
        state.boss_defeated = true;
        let boss_name = state
            .boss
            .as_ref()
            .map_or_else(String::new, |b| b.name.clone());
        state.finish(format!("{label} defeated {boss_name}! The frontier is free."));
    }
}

fn cure_active_illness(state: &mut GameState, remedy: &str) {
    let is_illness = state
        .active_event
        .as_ref()
        .is_some_and(|e| matches!(e.threat, Some(crate::card::ThreatKind::Illness)));
    if !is_illness {
        return;
    }
    if let Some(illness) = state.active_event.take() {
        let label = state.player_label();
        state.log(
            LogKind::Info,
            format!("{remedy} cures {label} of {}!", illness.name),
        );
        state.event_discard.push(illness);
        state.active_event_days = 0;
        state.refresh_trade_gate();
    }
}

fn apply_heal_card(state: &mut GameState, card: &Card) {
    let amount = heal_amount(card, &state.player);
    let healed = state.player.heal(amount);
    let label = state.player_label();
    if healed > 0 {
        state.log(
            LogKind::Info,
            format!(
                "{label} heals {healed} from {}. Health: {}/{}",
                card.name, state.player.health, state.player.max_health
            ),
        );
        state.signal(Signal::PlayerHeal { amount: healed });
    }
    if matches!(card.effect, Some(CardEffect::Heal { cures: true, .. })) {
        cure_active_illness(state, &card.name);
    }
}

#[allow(clippy::too_many_lines)]
fn play(state: &mut GameState, source: CardSource, index: usize) -> Result<Resolution, CommandError> {
    let card = card_at(state, source, index)?;
    let effect = card.effect.ok_or(CommandError::Unplayable)?;

    // Preconditions first; nothing below this block may fail.
    match effect {
        CardEffect::Weapon { .. } | CardEffect::ConditionalWeapon { .. } => {
            living_threat(state)?;
        }
        CardEffect::FireArrow => {
            living_threat(state)?;
            if !has_bow(&state.player) {
                return Err(CommandError::NeedsBow);
            }
        }
        CardEffect::Heal { .. }
        | CardEffect::Campfire
        | CardEffect::Gold { .. }
        | CardEffect::Draw { .. }
        | CardEffect::Trap { .. }
        | CardEffect::Scout => {}
        CardEffect::Upgrade(_)
        | CardEffect::Damage { .. }
        | CardEffect::Poison { .. }
        | CardEffect::DamagePercent { .. } => return Err(CommandError::Unplayable),
    }

    let mut resolution = Resolution::default();
    let label = state.player_label();
    match effect {
        CardEffect::Heal { .. } => apply_heal_card(state, &card),
        CardEffect::Weapon { .. } | CardEffect::ConditionalWeapon { .. } => {
            let play_source = match source {
                CardSource::Hand => PlaySource::Hand,
                CardSource::Equipped => PlaySource::Equipped,
            };
            let power = attack_power(&card, &state.player, play_source);
            strike_threat(state, power, &card.name);
        }
        CardEffect::FireArrow => {
            strike_threat(state, FIRE_ARROW_DAMAGE, &card.name);
        }
        CardEffect::Campfire => {
            state.player.campfire_lit = true;
            state.log(
                LogKind::Action,
                format!("{label} builds a campfire; the night will be quiet."),
            );
        }
        CardEffect::Gold { min, max } => {
            let found = with_rng(state, |_, rng| rng.random_range(min..=max.max(min)));
            state.player.gold += found;
            state.log(
                LogKind::Action,
                format!("{label} pans the gravel and comes up with {found} gold."),
            );
            state.signal(Signal::GoldFlash);
        }
        CardEffect::Draw { count } => {
            let drawn = with_rng(state, |state, rng| state.player.draw_to_hand(count, rng));
            if drawn > 0 {
                state.log(
                    LogKind::Action,
                    format!("{label} uses {} to draw {drawn} card(s).", card.name),
                );
            } else {
                state.log(
                    LogKind::Info,
                    format!("{} yields nothing; deck and hands are spent.", card.name),
                );
            }
        }
        CardEffect::Trap { .. } => {
            if let Some(old) = state.player.active_trap.take() {
                state.log(
                    LogKind::Action,
                    format!("{label} swaps the {} for the {}.", old.name, card.name),
                );
                state.player.discard.push(old);
            } else {
                state.log(LogKind::Action, format!("{label} sets the {}.", card.name));
            }
        }
        CardEffect::Scout => {
            if let Some(next) = state.event_deck.last().cloned() {
                state.log(
                    LogKind::Action,
                    format!("{label} scouts ahead and spots: {}.", next.name),
                );
                state.banner(format!("Next on the trail: {}", next.name), BannerKind::GenericInfo);
                resolution.scouted = Some(next);
            } else {
                state.log(LogKind::Info, "Nothing left to scout; the trail is bare.");
            }
        }
        // Upgrade and threat effects were rejected above.
        _ => {}
    }

    // Move the spent card: traps arm instead of discarding, persistent
    // gear played from its slot stays equipped.
    let is_trap = matches!(effect, CardEffect::Trap { .. });
    let keep_equipped = source == CardSource::Equipped && card.is_persistent_upgrade();
    if !keep_equipped
        && let Some(spent) = remove_card(state, source, index)
    {
        if is_trap {
            state.player.active_trap = Some(spent);
            state.signal(Signal::TrapSprung);
        } else {
            state.player.discard.push(spent);
        }
    }
    Ok(resolution)
}

fn equip(state: &mut GameState, index: usize) -> Result<Resolution, CommandError> {
    if state.player.equipped_today {
        return Err(CommandError::AlreadyEquippedToday);
    }
    if state.player.equipped.len() >= state.player.equip_slots {
        return Err(CommandError::EquipSlotsFull);
    }
    let card = card_at(state, CardSource::Hand, index)?;

    let label = state.player_label();
    state.player.hand[index] = None;
    state.player.equipped.push(card.clone());
    state.player.equipped_today = true;
    state.log(LogKind::Action, format!("{label} equips the {}.", card.name));
    if card.is_persistent_upgrade() {
        state.player.apply_persistent(&card);
        match card.upgrade_kind() {
            Some(crate::card::UpgradeKind::MaxHealth { amount }) => {
                state.log(
                    LogKind::Info,
                    format!("{} raises max health by {amount}.", card.name),
                );
            }
            Some(crate::card::UpgradeKind::DamageNegation { bonus_health }) => {
                state.log(
                    LogKind::Info,
                    format!(
                        "{} will turn aside one blow and adds {bonus_health} max health.",
                        card.name
                    ),
                );
            }
            Some(crate::card::UpgradeKind::Storage { capacity }) => {
                state.log(
                    LogKind::Info,
                    format!("{} opens {capacity} satchel slots.", card.name),
                );
            }
            _ => {}
        }
    }
    Ok(Resolution::default())
}

fn stash(state: &mut GameState, index: usize) -> Result<Resolution, CommandError> {
    let card = card_at(state, CardSource::Hand, index)?;
    if card.kind != CardKind::Provision {
        return Err(CommandError::NotAProvision);
    }
    let capacity = state.player.storage_capacity();
    if capacity == 0 {
        return Err(CommandError::NoStorage);
    }
    if state.player.satchel.len() >= capacity {
        return Err(CommandError::SatchelFull);
    }

    state.player.hand[index] = None;
    let label = state.player_label();
    state.log(
        LogKind::Action,
        format!("{label} tucks the {} into the satchel.", card.name),
    );
    state.player.satchel.push(card);
    Ok(Resolution::default())
}

fn use_stashed(state: &mut GameState, index: usize) -> Result<Resolution, CommandError> {
    let card = state
        .player
        .satchel
        .get(index)
        .cloned()
        .ok_or(CommandError::OutOfRange(index))?;
    match card.effect {
        Some(CardEffect::Heal { .. }) => {
            apply_heal_card(state, &card);
        }
        Some(CardEffect::Draw { count }) => {
            let drawn = with_rng(state, |state, rng| state.player.draw_to_hand(count, rng));
            let label = state.player_label();
            state.log(
                LogKind::Action,
                format!("{label} uses {} from the satchel, drawing {drawn}.", card.name),
            );
        }
        _ => return Err(CommandError::UnsupportedFromSatchel),
    }
    let spent = state.player.satchel.remove(index);
    state.player.discard.push(spent);
    Ok(Resolution::default())
}

fn buy(state: &mut GameState, slot: usize) -> Result<Resolution, CommandError> {
    if state.trade_blocked {
        return Err(CommandError::TradeBlocked);
    }
    let card = state
        .store_display
        .get(slot)
        .ok_or(CommandError::OutOfRange(slot))?
        .clone()
        .ok_or(CommandError::EmptyStoreSlot)?;
    let factor = if state.ng_plus > 0 {
        1
    } else {
        FIRST_RUN_PRICE_FACTOR
    };
    let cost = card.buy_cost * factor;
    if state.player.gold < cost {
        return Err(CommandError::InsufficientGold { needed: cost });
    }

    state.player.gold -= cost;
    state.store_display[slot] = None;
    let label = state.player_label();
    state.log(
        LogKind::Action,
        format!("{label} buys the {} for {cost} gold; it lands in the discard pile.", card.name),
    );
    state.signal(Signal::GoldFlash);
    state.player.discard.push(card);
    Ok(Resolution {
        refill_slot: Some(slot),
        scouted: None,
    })
}

fn sell(state: &mut GameState, source: CardSource, index: usize) -> Result<Resolution, CommandError> {
    if state.trade_blocked {
        return Err(CommandError::TradeBlocked);
    }
    let card = card_at(state, source, index)?;
    if card.sell_value <= 0 {
        return Err(CommandError::NothingToSell);
    }

    let price = card.sell_value + state.player.sell_bonus();
    state.player.gold += price;
    let label = state.player_label();
    state.log(
        LogKind::Action,
        format!("{label} sells the {} for {price} gold; it is gone for good.", card.name),
    );
    state.signal(Signal::GoldFlash);
    // Sold cards leave the game entirely; equipped upgrades unwind first.
    if let Some(sold) = remove_card(state, source, index)
        && source == CardSource::Equipped
    {
        state.player.unwind_persistent(&sold);
    }
    Ok(Resolution::default())
}

fn take_event_item(state: &mut GameState) -> Result<Resolution, CommandError> {
    if state.player.took_action_today {
        return Err(CommandError::ActionAlreadyTaken);
    }
    let takeable = state
        .active_event
        .as_ref()
        .is_some_and(|event| !event.is_threat());
    if !takeable {
        return Err(CommandError::NoEventItem);
    }

    if let Some(item) = state.active_event.take() {
        let label = state.player_label();
        state.log(
            LogKind::Action,
            format!("{label} takes the {}, adding it to the discard pile.", item.name),
        );
        state.player.discard.push(item);
    }
    state.active_event_days = 0;
    state.player.took_action_today = true;
    state.signal(Signal::EventItemTaken);
    state.refresh_trade_gate();
    Ok(Resolution::default())
}

fn discard_equipped(state: &mut GameState, index: usize) -> Result<Resolution, CommandError> {
    let card = card_at(state, CardSource::Equipped, index)?;
    let label = state.player_label();
    state.log(
        LogKind::Action,
        format!("{label} discards the equipped {}.", card.name),
    );
    if let Some(removed) = remove_card(state, CardSource::Equipped, index) {
        state.player.unwind_persistent(&removed);
        state.player.discard.push(removed);
    }
    Ok(Resolution::default())
}

fn restock(state: &mut GameState) -> Result<Resolution, CommandError> {
    if state.trade_blocked {
        return Err(CommandError::TradeBlocked);
    }
    if state.player.restocked_today {
        return Err(CommandError::AlreadyRestocked);
    }
    if state.player.gold < RESTOCK_COST {
        return Err(CommandError::InsufficientGold {
            needed: RESTOCK_COST,
        });
    }

    state.player.gold -= RESTOCK_COST;
    state.player.restocked_today = true;
    for slot in &mut state.store_display {
        if let Some(card) = slot.take() {
            state.store_deck.push(card);
        }
    }
    if state.store_deck.len() < state.store_display.len() && !state.store_discard.is_empty() {
        let mut leftovers = std::mem::take(&mut state.store_discard);
        state.store_deck.append(&mut leftovers);
    }
    with_rng(state, |state, rng| {
        use rand::seq::SliceRandom;
        state.store_deck.shuffle(rng);
    });
    for slot in &mut state.store_display {
        *slot = state.store_deck.pop();
    }
    let label = state.player_label();
    state.log(
        LogKind::Action,
        format!("{label} pays {RESTOCK_COST} gold to see fresh stock."),
    );
    state.signal(Signal::GoldFlash);
    Ok(Resolution::default())
}
