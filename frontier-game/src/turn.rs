//! The day state machine: damage pipeline, on-reveal resolution, trap
//! interception, and the end-of-day sequence.
//!
//! Ordering in `end_day` is load-bearing. Night attacks land before the hand
//! is discarded from play, the trap tests the deck before any new card is
//! drawn, and win/loss is re-checked after every step that can touch health.
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::card::{AnimalSize, Card, CardEffect, OnReveal, make_trophy};
use crate::combat::nightly_heal_amount;
use crate::state::{BannerKind, GameState, LogKind, Signal};

#[derive(Debug, Clone, Copy, Default)]
pub struct DamageReport {
    /// Damage actually applied to health after reduction.
    pub dealt: i32,
    /// A negation hat ate the whole hit.
    pub negated: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RevealOutcome {
    /// The revealed event ends the day on the spot.
    pub day_over: bool,
    /// The event resolved immediately and left the slot.
    pub removed: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DayOutcome {
    pub finished: bool,
    /// The freshly revealed event already ended the new day; the player
    /// cannot act before the next `end_day`.
    pub forced_day_end: bool,
}

/// Every point of damage from any source funnels through here: hat negation
/// first, then flat reduction from equipped gear, then health.
pub fn apply_damage(state: &mut GameState, amount: i32, source: &str) -> DamageReport {
    if amount <= 0 {
        return DamageReport::default();
    }
    let label = state.player_label();

    if state.player.hat_negation_ready
        && let Some(idx) = state.player.negation_hat_index()
    {
        let hat = state.player.equipped.remove(idx);
        state.player.unwind_persistent(&hat);
        state.player.hat_negation_ready = false;
        state.player.hat_negation_spent_today = true;
        state.log(
            LogKind::Info,
            format!("{label}'s {} deflects the blow from {source}!", hat.name),
        );
        state.player.discard.push(hat);
        state.signal(Signal::HatSaved);
        return DamageReport {
            dealt: 0,
            negated: true,
        };
    }

    let reduction = state.player.damage_reduction();
    let dealt = (amount - reduction).max(0);
    if dealt == 0 {
        state.log(
            LogKind::Info,
            format!("{label}'s gear turns aside the blow from {source}."),
        );
        return DamageReport::default();
    }
    if reduction > 0 {
        state.log(
            LogKind::Info,
            format!("{label}'s gear blunts {source} by {reduction}."),
        );
    }
    state.player.health = (state.player.health - dealt).max(0);
    state.log(
        LogKind::Event,
        format!(
            "{label} takes {dealt} damage from {source}. Health: {}/{}",
            state.player.health, state.player.max_health
        ),
    );
    state.signal(Signal::PlayerDamage {
        amount: dealt,
        source: source.to_string(),
    });
    DamageReport {
        dealt,
        negated: false,
    }
}

fn player_down(state: &mut GameState, source: &str) -> bool {
    if state.player.health <= 0 {
        let label = state.player_label();
        state.finish(format!("{label} was defeated by {source}."));
        true
    } else {
        false
    }
}

/// Tear non-immovable gear off the player, unwinding persistent effects.
fn strip_equipment(state: &mut GameState, cause: &str) {
    let (kept, torn): (Vec<Card>, Vec<Card>) = state
        .player
        .equipped
        .drain(..)
        .partition(|item| item.immovable);
    state.player.equipped.extend(kept);
    if torn.is_empty() {
        return;
    }
    let names: Vec<&str> = torn.iter().map(|c| c.name.as_str()).collect();
    state.log(
        LogKind::Event,
        format!("The {cause} tears away equipped gear: {}.", names.join(", ")),
    );
    for item in torn {
        state.player.unwind_persistent(&item);
        state.player.discard.push(item);
    }
}

/// Resolve a freshly revealed event's immediate effects: gold theft, reveal
/// attacks from non-nocturnal humans and large animals, and the day-ending
/// illness and environmental cards.
pub fn resolve_reveal(state: &mut GameState) -> RevealOutcome {
    let Some(event) = state.active_event.clone() else {
        return RevealOutcome::default();
    };
    let label = state.player_label();
    state.log(LogKind::Event, format!("Event revealed: {}.", event.name));
    if event.forces_day_end() || (event.is_human() && event.nocturnal) {
        state.banner(event.name.clone(), BannerKind::EventAlert);
    }

    if let Some(OnReveal::StealGold { max }) = event.on_reveal {
        let roll = state.rng_mut().random_range(0..=max.max(0));
        let stolen = roll.min(state.player.gold);
        if stolen > 0 {
            state.player.gold -= stolen;
            state.log(
                LogKind::Event,
                format!("{} snatches {stolen} gold from {label}!", event.name),
            );
            state.signal(Signal::GoldFlash);
        } else if roll > 0 {
            state.log(
                LogKind::Event,
                format!("{} tries to steal gold, but {label} has none.", event.name),
            );
        }
    }

    let strikes_on_reveal = (event.is_human() && !event.nocturnal)
        || matches!(event.animal_size(), Some(AnimalSize::Large));
    if strikes_on_reveal && event.attack_damage() > 0 {
        state.log(LogKind::Event, format!("{} attacks immediately!", event.name));
        apply_damage(state, event.attack_damage(), &event.name);
        if player_down(state, &event.name) {
            return RevealOutcome {
                day_over: true,
                removed: false,
            };
        }
    }

    if !event.forces_day_end() {
        return RevealOutcome::default();
    }

    // Illness and environmental events burn the rest of the day.
    state.log(
        LogKind::Event,
        format!("{} forces {label} to discard their hand; the day is lost.", event.name),
    );
    state.player.discard_hand();
    match event.effect {
        Some(CardEffect::Damage { amount, strips_gear }) => {
            apply_damage(state, amount, &event.name);
            if !player_down(state, &event.name) && strips_gear {
                strip_equipment(state, &event.name);
            }
        }
        Some(CardEffect::Poison { damage }) => {
            apply_damage(state, damage, &event.name);
            player_down(state, &event.name);
        }
        Some(CardEffect::DamagePercent { fraction }) => {
            state.signal(Signal::LightningFlash);
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let amount = (f64::from(state.player.health) * f64::from(fraction)).ceil() as i32;
            apply_damage(state, amount, &event.name);
            player_down(state, &event.name);
        }
        _ => {}
    }

    state.event_discard.push(event);
    state.active_event = None;
    state.active_event_days = 0;
    RevealOutcome {
        day_over: true,
        removed: true,
    }
}

/// Test the armed trap against the top of the event deck without drawing it.
///
/// The trap is consumed only when a catch or break attempt was actually
/// evaluated against an animal or human threat; anything else on top of the
/// deck leaves the trap untouched.
fn run_trap_interception(state: &mut GameState) {
    let Some(trap_card) = state.player.active_trap.clone() else {
        return;
    };
    let Some(CardEffect::Trap { size, break_damage }) = trap_card.effect else {
        return;
    };
    let Some(top) = state.event_deck.last() else {
        return;
    };
    if !(top.is_animal() || top.is_human()) {
        state.log(
            LogKind::Info,
            format!("The {} lies undisturbed; {} is no prey for it.", trap_card.name, top.name),
        );
        return;
    }

    let target = top.clone();
    let threshold = size.catch_threshold();
    if target.is_animal() && target.health.unwrap_or(0) <= threshold {
        state.log(
            LogKind::Event,
            format!("The {} caught the {}!", trap_card.name, target.name),
        );
        state.banner(format!("{} Defeated!", target.name), BannerKind::ThreatDefeated);
        state.signal(Signal::TrapSprung);
        let serial = state.next_serial();
        state.player.discard.push(make_trophy(&target, serial));
        if let Some(card) = state.event_deck.pop() {
            state.event_discard.push(card);
        }
    } else if break_damage > 0 {
        let remaining = (target.health.unwrap_or(0) - break_damage).max(0);
        state.log(
            LogKind::Event,
            format!(
                "The {} is broken by the {}, biting for {break_damage} on the way.",
                trap_card.name, target.name
            ),
        );
        if remaining <= 0 {
            state.log(
                LogKind::Event,
                format!("The breaking {} finished off the {}!", trap_card.name, target.name),
            );
            state.banner(format!("{} Defeated!", target.name), BannerKind::ThreatDefeated);
            let serial = state.next_serial();
            state.player.discard.push(make_trophy(&target, serial));
            if let Some(card) = state.event_deck.pop() {
                state.event_discard.push(card);
            }
        } else if let Some(card) = state.event_deck.last_mut() {
            card.health = Some(remaining);
            state.log(
                LogKind::Event,
                format!("The {} limps on with {remaining} health.", target.name),
            );
        }
    } else {
        state.log(
            LogKind::Event,
            format!("The {} tears free of the {} unharmed.", target.name, trap_card.name),
        );
    }

    state.player.active_trap = None;
    state.player.discard.push(trap_card);
}

/// Draw the next event into the empty slot, reshuffling the discard (boss
/// excluded) when the deck runs dry, or place the boss / end the run when
/// everything is exhausted. Returns whether the reveal ended the new day.
fn draw_next_event(state: &mut GameState) -> bool {
    if state.event_deck.is_empty() && !state.event_discard.is_empty() {
        let boss_id = state.boss.as_ref().map(|b| b.id.clone());
        let mut pile = std::mem::take(&mut state.event_discard);
        // Only live threats return to the trail. The boss, defeated
        // threats, and one-shot illness/environmental events are spent;
        // recycling them would keep the boss waiting forever.
        pile.retain(|c| {
            let spent =
                c.is_threat() && (c.health.unwrap_or(0) <= 0 || c.forces_day_end());
            Some(&c.id) != boss_id.as_ref() && !spent
        });
        if !pile.is_empty() {
            pile.shuffle(state.rng_mut());
            state.log(LogKind::Debug, "Reshuffling the event discard into the deck.");
        }
        state.event_deck = pile;
    }

    if let Some(card) = state.event_deck.pop() {
        state.active_event = Some(card);
        state.active_event_days = 1;
        return resolve_reveal(state).day_over;
    }

    if let Some(boss) = state.boss.clone()
        && !state.boss_defeated
    {
        state.log(
            LogKind::Event,
            "The air grows cold. The final confrontation is at hand!",
        );
        state.banner(boss.name.clone(), BannerKind::EventAlert);
        state.active_event = Some(boss);
        state.active_event_days = 1;
        return false;
    }

    if state.player.health > 0 {
        let label = state.player_label();
        state.finish(format!("{label} has conquered the frontier!"));
    }
    false
}

/// Resolve the end of the current day and set up the next one.
#[allow(clippy::too_many_lines)]
pub fn end_day(state: &mut GameState) -> DayOutcome {
    if state.is_finished() {
        return DayOutcome {
            finished: true,
            forced_day_end: false,
        };
    }

    let closing_day = state.day;
    state.log(LogKind::Turn, format!("--- End of Day {closing_day} ---"));
    state.player.hat_negation_spent_today = false;

    let attacked_today = state.active_event_attacked;
    let carried_over_id = state.active_event.as_ref().map(|c| c.id.clone());

    // Nocturnal threats left unresolved strike at dusk, then leave.
    if let Some(event) = state.active_event.clone()
        && event.nocturnal
        && !attacked_today
        && event.health.unwrap_or(0) > 0
    {
        if state.player.campfire_lit && event.is_animal() {
            state.log(
                LogKind::Info,
                format!("The campfire keeps the {} at bay; it wanders off.", event.name),
            );
        } else {
            state.log(
                LogKind::Event,
                format!("{} strikes as night falls!", event.name),
            );
            if event.is_animal() {
                state.signal(Signal::SkunkSpray);
            }
            apply_damage(state, event.attack_damage(), &event.name);
        }
        state.event_discard.push(event.clone());
        state.active_event = None;
        state.active_event_days = 0;
        if player_down(state, &event.name) {
            return DayOutcome {
                finished: true,
                forced_day_end: false,
            };
        }
    }

    if state.player.hand_count() > 0 {
        let label = state.player_label();
        state.log(
            LogKind::Info,
            format!("{label} discards their hand as the light fails."),
        );
        state.player.discard_hand();
    }

    // Small game that was left alone slips away overnight.
    if let Some(event) = state.active_event.clone()
        && matches!(event.animal_size(), Some(AnimalSize::Small))
        && event.health.unwrap_or(0) > 0
    {
        if attacked_today {
            state.log(
                LogKind::Event,
                format!("The wounded {} stays, hackles raised.", event.name),
            );
        } else {
            state.log(
                LogKind::Event,
                format!("The {} slips away at the end of the day.", event.name),
            );
            state.event_discard.push(event);
            state.active_event = None;
            state.active_event_days = 0;
        }
    }

    // An unclaimed item finds its way to the store instead of the dirt.
    if let Some(event) = state.active_event.clone()
        && !event.is_threat()
    {
        state.log(
            LogKind::Info,
            format!("The {} left on the trail turns up in the store.", event.name),
        );
        state.store_deck.insert(0, event);
        state.active_event = None;
        state.active_event_days = 0;
    }

    if state.player.health > 0 {
        let heal = nightly_heal_amount(&state.player);
        if heal > 0 {
            let healed = state.player.heal(heal);
            if healed > 0 {
                let label = state.player_label();
                state.log(
                    LogKind::Info,
                    format!(
                        "{label} recovers {healed} health overnight. Health: {}/{}",
                        state.player.health, state.player.max_health
                    ),
                );
                state.signal(Signal::PlayerHeal { amount: healed });
            }
        }
    }

    state.active_event_attacked = false;

    let mut forced_day_end = false;
    if state.active_event.is_none() {
        run_trap_interception(state);
        if state.active_event.is_none() {
            if state.player.campfire_lit {
                state.log(
                    LogKind::Info,
                    "The campfire keeps the wilderness quiet for the night.",
                );
            } else {
                forced_day_end = draw_next_event(state);
                if state.is_finished() {
                    return DayOutcome {
                        finished: true,
                        forced_day_end,
                    };
                }
            }
        }
    } else {
        state.active_event_days += 1;
    }

    // Morning attacks from whatever is still prowling the camp.
    if !state.is_finished()
        && let Some(event) = state.active_event.clone()
        && event.is_animal()
        && event.health.unwrap_or(0) > 0
        && !state.player.campfire_lit
    {
        let carried = carried_over_id.as_deref() == Some(event.id.as_str());
        let strikes = match event.animal_size() {
            Some(AnimalSize::Small) => carried && attacked_today,
            Some(AnimalSize::Medium) => !event.nocturnal && state.active_event_days == 2,
            Some(AnimalSize::Large) => carried && !attacked_today,
            None => false,
        };
        if strikes && event.attack_damage() > 0 {
            let cause = match event.animal_size() {
                Some(AnimalSize::Small) => "retaliates for yesterday's wound",
                Some(AnimalSize::Medium) => "has waited long enough and attacks",
                _ => "continues its assault",
            };
            state.log(LogKind::Event, format!("The {} {cause}!", event.name));
            apply_damage(state, event.attack_damage(), &event.name);
            if player_down(state, &event.name) {
                return DayOutcome {
                    finished: true,
                    forced_day_end,
                };
            }
        }
    }

    if state.player.campfire_lit {
        state.player.campfire_lit = false;
        state.log(LogKind::Info, "The campfire fades to embers.");
    }

    // A dead boss ends the run no matter what else is in flight.
    if state.boss_defeated && state.player.health > 0 && !state.is_finished() {
        let label = state.player_label();
        let boss_name = state
            .boss
            .as_ref()
            .map_or_else(|| String::from("the final threat"), |b| b.name.clone());
        state.finish(format!("{label} defeated {boss_name}!"));
    }

    if state.is_finished() {
        return DayOutcome {
            finished: true,
            forced_day_end,
        };
    }

    let hand_size = state.player.hand_size;
    let seed = state.seed;
    let mut rng = state
        .rng
        .take()
        .unwrap_or_else(|| ChaCha20Rng::seed_from_u64(seed));
    let drawn = state.player.draw_to_hand(hand_size, &mut rng);
    state.rng = Some(rng);
    if drawn > 0 {
        state.log(LogKind::Info, format!("Drawing {drawn} cards for the new day."));
    }
    state.player.sort_hand();
    state.player.reset_daily_flags();
    if forced_day_end {
        state.player.turn_ended = true;
    }

    state.day += 1;
    let new_day = state.day;
    state.log(LogKind::Turn, format!("--- Day {new_day} ---"));
    state.refresh_trade_gate();
    state.enforce_invariants();

    DayOutcome {
        finished: state.is_finished(),
        forced_day_end,
    }
}
