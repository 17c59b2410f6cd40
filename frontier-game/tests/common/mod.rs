//! Shared fixtures for the integration suites.
#![allow(dead_code)]
use frontier_game::{CarryOver, GameSession, GameState, GameStorage, SilentNarrator, ThemedCheckpoint};
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub game: Rc<RefCell<Option<String>>>,
    pub carry: Rc<RefCell<Option<CarryOver>>>,
    pub theme: Rc<RefCell<Option<ThemedCheckpoint>>>,
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn save_game(&self, state: &GameState) -> Result<(), Self::Error> {
        *self.game.borrow_mut() = serde_json::to_string(state).ok();
        Ok(())
    }

    fn load_game(&self) -> Result<Option<GameState>, Self::Error> {
        Ok(self
            .game
            .borrow()
            .as_deref()
            .and_then(|blob| serde_json::from_str(blob).ok()))
    }

    fn clear_game(&self) -> Result<(), Self::Error> {
        *self.game.borrow_mut() = None;
        Ok(())
    }

    fn save_carry(&self, carry: &CarryOver) -> Result<(), Self::Error> {
        *self.carry.borrow_mut() = Some(carry.clone());
        Ok(())
    }

    fn load_carry(&self) -> Result<Option<CarryOver>, Self::Error> {
        Ok(self.carry.borrow().clone())
    }

    fn clear_carry(&self) -> Result<(), Self::Error> {
        *self.carry.borrow_mut() = None;
        Ok(())
    }

    fn save_theme(&self, theme: &ThemedCheckpoint) -> Result<(), Self::Error> {
        *self.theme.borrow_mut() = Some(theme.clone());
        Ok(())
    }

    fn load_theme(&self) -> Result<Option<ThemedCheckpoint>, Self::Error> {
        Ok(self.theme.borrow().clone())
    }

    fn clear_theme(&self) -> Result<(), Self::Error> {
        *self.theme.borrow_mut() = None;
        Ok(())
    }
}

/// A session taken through setup into live play.
pub fn live_session(character: &str, name: &str) -> GameSession<SilentNarrator, MemoryStorage> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = GameSession::new(SilentNarrator, MemoryStorage::default());
    session.select_character(character).unwrap();
    session.confirm_name(name).unwrap();
    session.start_game().unwrap();
    session.reveal_opening_event().unwrap();
    session
}

/// Clear the board for a scripted scenario: no active event, no gates.
pub fn clear_board(session: &mut GameSession<SilentNarrator, MemoryStorage>) {
    session.with_state_mut(|state| {
        if let Some(event) = state.active_event.take() {
            state.event_discard.push(event);
        }
        state.active_event_days = 0;
        state.active_event_attacked = false;
        state.trade_blocked = false;
        state.player.turn_ended = false;
    });
}
