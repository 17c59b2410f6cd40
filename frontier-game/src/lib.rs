//! Frontier Run Game Engine
//!
//! Platform-agnostic core logic for the Frontier Run survival card game.
//! This crate provides the full turn and event resolution engine without UI
//! or platform-specific dependencies: the shell renders snapshots of
//! [`GameState`] and feeds commands back through [`GameSession`].

pub mod actions;
pub mod card;
pub mod catalog;
pub mod characters;
pub mod combat;
pub mod deck;
pub mod narrative;
pub mod scaling;
pub mod session;
pub mod state;
pub mod turn;

// Re-export commonly used types
pub use actions::{CardSource, Command, CommandError, Resolution};
pub use card::{
    AnimalSize, Card, CardEffect, CardKind, OnReveal, ThreatKind, TrapSize, UpgradeKind,
    WeaponCondition, WeaponKind, make_trophy,
};
pub use catalog::Catalog;
pub use characters::{Character, roster};
pub use combat::{PlaySource, attack_power, heal_amount, nightly_heal_amount};
pub use deck::{DeckSet, build_decks};
pub use narrative::{
    BossContext, IntroStory, Narrator, NarrativeError, SilentNarrator, fallback_boss,
    fallback_epilogue, fallback_intro,
};
pub use scaling::{ThemedCheckpoint, apply_manual_scaling, scale_catalog};
pub use session::{CarryOver, GameSession, PendingRestock, SessionError};
pub use state::{
    BannerKind, GameLog, GameState, LogEntry, LogKind, PlayerState, Signal, Status,
};
pub use turn::{DamageReport, DayOutcome, RevealOutcome, apply_damage, end_day, resolve_reveal};

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this.
///
/// A session persists three things: the live [`GameState`] blob, the small
/// [`CarryOver`] record written by a winning run, and the themed catalog
/// checkpoint captured at progression milestones. All three are
/// last-write-wins; failures are recovered by the session, never fatal.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the live run.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, state: &GameState) -> Result<(), Self::Error>;

    /// Load the persisted run, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self) -> Result<Option<GameState>, Self::Error>;

    /// Drop the persisted run.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn clear_game(&self) -> Result<(), Self::Error>;

    /// Persist carry-over from a winning run.
    ///
    /// # Errors
    ///
    /// Returns an error if the carry-over cannot be saved.
    fn save_carry(&self, carry: &CarryOver) -> Result<(), Self::Error>;

    /// Load carry-over from the last winning run, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the carry-over cannot be loaded.
    fn load_carry(&self) -> Result<Option<CarryOver>, Self::Error>;

    /// Drop recorded carry-over.
    ///
    /// # Errors
    ///
    /// Returns an error if the carry-over cannot be deleted.
    fn clear_carry(&self) -> Result<(), Self::Error>;

    /// Persist a themed catalog checkpoint. Optional; the default keeps
    /// themes in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be saved.
    fn save_theme(&self, theme: &ThemedCheckpoint) -> Result<(), Self::Error> {
        let _ = theme;
        Ok(())
    }

    /// Load the themed catalog checkpoint, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be loaded.
    fn load_theme(&self) -> Result<Option<ThemedCheckpoint>, Self::Error> {
        Ok(None)
    }

    /// Drop the themed catalog checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be deleted.
    fn clear_theme(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
