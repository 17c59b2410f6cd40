//! Progression-loop scenarios: winning a run, carrying gold, deck, and
//! equipment into the next one, and the delayed store refill window.
mod common;

use common::{MemoryStorage, clear_board, live_session};
use frontier_game::{
    CardSource, Catalog, Command, CommandError, GameSession, SessionError, SilentNarrator,
    state::PLAYER_DECK_TARGET_SIZE,
};

fn card(id: &str) -> frontier_game::Card {
    Catalog::base().get(id).unwrap().clone()
}

fn kill_the_boss(session: &mut GameSession<SilentNarrator, MemoryStorage>) {
    clear_board(session);
    session.with_state_mut(|state| {
        let mut boss = state.boss.clone().expect("run has a boss");
        boss.health = Some(1);
        state.active_event = Some(boss);
        state.active_event_days = 1;
        state.trade_blocked = true; // hostile boss blocks trade, not combat
        state.player.hand[0] = Some(card("item_knife_t1"));
    });
    session
        .dispatch(Command::Play {
            source: CardSource::Hand,
            index: 0,
        })
        .unwrap();
}

#[test]
fn winning_carries_gold_deck_and_equipment_into_the_next_run() {
    let mut session = live_session("gunslinger", "Ruth");

    // Wear a coat so the carry-over includes persistent gear.
    clear_board(&mut session);
    session.with_state_mut(|state| {
        state.player.hand[0] = Some(card("upgrade_bearskin_coat"));
        state.player.equipped_today = false;
    });
    session.dispatch(Command::Equip { index: 0 }).unwrap();

    session.with_state_mut(|state| state.player.gold = 77);
    kill_the_boss(&mut session);
    let state = session.state();
    assert!(state.is_finished());
    assert!(state.boss_defeated);
    let gold_at_win = state.player.gold; // 77 plus the boss bounty

    session.reset(true);
    assert_eq!(session.state().ng_plus, 1);
    session.select_character("gunslinger").unwrap();
    session.confirm_name("Ruth").unwrap();
    assert_eq!(session.state().player.gold, gold_at_win);
    session.start_game().unwrap();

    let player = &session.state().player;
    // Base 24 eroded by one level, plus the carried coat's +7.
    assert_eq!(player.max_health, 23 + 7);
    assert!(player.equipped.iter().any(|c| c.id == "upgrade_bearskin_coat"));
    // Starters, augmentation, and the carried deck stack up past the
    // single-run target.
    let deck_size = player.deck.len() + player.hand_count();
    assert!(
        deck_size > PLAYER_DECK_TARGET_SIZE,
        "carried cards missing: {deck_size}"
    );
}

#[test]
fn losing_resets_progression_to_the_first_run() {
    let mut session = live_session("prospector", "Gus");
    clear_board(&mut session);
    session.with_state_mut(|state| {
        state.player.health = 1;
        let mut bear = card("threat_grizzly_bear_t1");
        bear.health = Some(50);
        state.event_deck.clear();
        state.event_deck.push(bear);
    });
    // The bear's reveal attack finishes the run.
    session.end_day().unwrap();
    assert!(session.state().is_finished());
    assert_eq!(session.state().player.health, 0);

    session.reset(true);
    assert_eq!(session.state().ng_plus, 0, "a lost run carries nothing");
}

#[test]
fn bought_slots_stay_sold_out_until_the_refill_fires() {
    let mut session = live_session("explorer", "Kit");
    clear_board(&mut session);
    session.with_state_mut(|state| {
        state.store_display[0] = Some(card("item_rifle_t1"));
        state.player.gold = 200;
    });

    session.dispatch(Command::Buy { slot: 0 }).unwrap();
    assert!(session.state().store_display[0].is_none());

    // Buying the same slot during the sold-out window is a plain rejection.
    let err = session.dispatch(Command::Buy { slot: 0 });
    assert!(matches!(
        err,
        Err(SessionError::Command(CommandError::EmptyStoreSlot))
    ));

    let deck_before = session.state().store_deck.len();
    session.fire_pending();
    assert!(session.state().store_display[0].is_some());
    assert_eq!(session.state().store_deck.len(), deck_before - 1);
}

#[test]
fn curing_an_illness_through_the_session() {
    let mut session = live_session("doctor", "Ada");
    clear_board(&mut session);
    session.with_state_mut(|state| {
        state.active_event = Some(card("threat_malaria"));
        state.player.health = 5;
        state.player.max_health = 18;
        state.player.hand[0] = Some(card("provision_fever_tonic_t1"));
    });
    session
        .dispatch(Command::Play {
            source: CardSource::Hand,
            index: 0,
        })
        .unwrap();
    let state = session.state();
    assert_eq!(state.player.health, 7);
    assert!(state.active_event.is_none());
    assert!(state.event_discard.iter().any(|c| c.id == "threat_malaria"));
}
