//! End-to-end runs driven through the public session API with a simple
//! fight-or-sleep policy, checking the structural invariants every day.
mod common;

use common::{MemoryStorage, live_session};
use frontier_game::{
    CardSource, Catalog, Command, GameSession, GameState, SessionError, SilentNarrator, Status,
    characters,
};
use std::collections::BTreeSet;

fn assert_invariants(state: &GameState) {
    assert_eq!(
        state.player.hand.len(),
        state.player.hand_size,
        "hand slots drifted on day {}",
        state.day
    );
    assert!(
        state.player.hand_count() <= state.player.hand_size,
        "hand overfilled on day {}",
        state.day
    );
    assert!(
        state.player.equipped.len() <= state.player.equip_slots,
        "equip slots overfilled on day {}",
        state.day
    );
    assert!(state.player.health >= 0, "health below zero on day {}", state.day);
    assert!(
        state.player.health <= state.player.max_health,
        "health above max on day {}",
        state.day
    );
    assert!(
        state.player.satchel.len() <= state.player.storage_capacity(),
        "satchel over capacity on day {}",
        state.day
    );
}

fn setup(character: &str) -> GameSession<SilentNarrator, MemoryStorage> {
    live_session(character, "Jess")
}

fn weapon_in_hand(state: &GameState) -> Option<usize> {
    state
        .player
        .hand
        .iter()
        .position(|slot| slot.as_ref().is_some_and(|c| c.is_weapon()))
}

fn heal_in_hand(state: &GameState) -> Option<usize> {
    state.player.hand.iter().position(|slot| {
        slot.as_ref().is_some_and(|c| {
            matches!(
                c.effect,
                Some(frontier_game::CardEffect::Heal { .. })
            )
        })
    })
}

fn threat_alive(state: &GameState) -> bool {
    state
        .active_event
        .as_ref()
        .is_some_and(|e| e.is_threat() && e.health.unwrap_or(0) > 0)
}

/// Fight anything that bleeds, eat when hurt, sleep otherwise.
fn drive_to_completion(session: &mut GameSession<SilentNarrator, MemoryStorage>) {
    let mut safety = 0;
    loop {
        safety += 1;
        assert!(safety < 5_000, "run failed to terminate");
        assert_invariants(session.state());
        if session.state().status == Status::Finished {
            break;
        }
        if session.state().player.turn_ended {
            session.end_day().unwrap();
            continue;
        }

        let wounded =
            session.state().player.health < session.state().player.max_health / 2;
        if wounded && let Some(idx) = heal_in_hand(session.state()) {
            session
                .dispatch(Command::Play { source: CardSource::Hand, index: idx })
                .unwrap();
            continue;
        }
        if threat_alive(session.state())
            && let Some(idx) = weapon_in_hand(session.state())
        {
            let result = session.dispatch(Command::Play { source: CardSource::Hand, index: idx });
            match result {
                Ok(_) => continue,
                Err(SessionError::Command(_)) => {}
                Err(other) => panic!("unexpected session error: {other}"),
            }
        }
        match session.end_day() {
            Ok(_) => {}
            Err(SessionError::NotPlaying) => break,
            Err(other) => panic!("unexpected end-of-day error: {other}"),
        }
    }
    assert_eq!(session.state().status, Status::Finished);
    assert!(session.state().win_reason.is_some());
}

#[test]
fn a_full_run_terminates_with_invariants_held() {
    for character in ["hunter", "gunslinger", "preacher"] {
        let mut session = setup(character);
        drive_to_completion(&mut session);
        let epilogue = session.epilogue();
        assert!(!epilogue.is_empty());
    }
}

#[test]
fn decks_stay_disjoint_after_session_setup() {
    let session = setup("trapper");
    let state = session.state();
    let starters: BTreeSet<String> = characters::all_starter_ids();

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let event_ids = state.event_deck.iter().map(|c| c.id.as_str());
    let store_ids = state
        .store_deck
        .iter()
        .chain(state.store_display.iter().flatten())
        .map(|c| c.id.as_str());
    let player_ids = state
        .player
        .deck
        .iter()
        .chain(state.player.hand_cards())
        .map(|c| c.id.as_str());

    for id in event_ids.chain(store_ids) {
        assert!(seen.insert(id), "{id} appears in more than one deck");
    }
    for id in player_ids {
        // Starters and filler copies may repeat inside the player deck, but
        // must never collide with the event or store decks.
        if !starters.contains(id) && !frontier_game::deck::FILLER_SEQUENCE.contains(&id) {
            assert!(!seen.contains(id), "{id} leaked into the player deck");
        }
    }
}

#[test]
fn trap_threshold_boundary_through_a_real_day() {
    // A small trap takes an animal at exactly its threshold, but not one
    // point over, and never a human of any health.
    let mut session = setup("trapper");
    session.with_state_mut(|state| {
        let beaver = Catalog::base().get("threat_beaver_t1").unwrap().clone();
        state.active_event = None;
        state.active_event_days = 0;
        state.trade_blocked = false;
        state.player.turn_ended = false;
        state.player.active_trap =
            Some(Catalog::base().get("item_small_trap_t1").unwrap().clone());
        state.event_deck.push(beaver); // health 4: exactly the threshold
    });
    session.end_day().unwrap();
    assert!(
        session
            .state()
            .player
            .discard
            .iter()
            .any(|c| c.id.starts_with("trophy_threat_beaver")),
        "health-4 animal should be caught by a small trap"
    );

    let mut session = setup("trapper");
    session.with_state_mut(|state| {
        let fox = Catalog::base().get("threat_fox_t1").unwrap().clone();
        state.active_event = None;
        state.active_event_days = 0;
        state.player.turn_ended = false;
        state.player.active_trap =
            Some(Catalog::base().get("item_small_trap_t1").unwrap().clone());
        state.event_deck.push(fox); // health 5: one over
    });
    session.end_day().unwrap();
    assert!(
        !session
            .state()
            .player
            .discard
            .iter()
            .any(|c| c.id.starts_with("trophy_threat_fox")),
        "health-5 animal must not be caught by a small trap"
    );
}

#[test]
fn resumed_sessions_continue_the_same_run() {
    let storage = MemoryStorage::default();
    let day_reached;
    {
        let mut session = GameSession::new(SilentNarrator, storage.clone());
        session.select_character("doctor").unwrap();
        session.confirm_name("Ada").unwrap();
        session.start_game().unwrap();
        session.reveal_opening_event().unwrap();
        if !session.state().player.turn_ended && session.state().status == Status::Playing {
            // Let one quiet day pass when possible.
            let _ = session.end_day();
        }
        day_reached = session.state().day;
    }
    let resumed = GameSession::new(SilentNarrator, storage);
    if resumed.state().status != Status::Setup {
        assert_eq!(resumed.state().day, day_reached);
        assert_eq!(resumed.state().player.name.as_deref(), Some("Ada"));
    }
}
