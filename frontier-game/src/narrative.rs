//! Boundary to the generative narrative subsystem.
//!
//! The engine only knows this trait. Every call site degrades to one of the
//! deterministic fallbacks below, so an absent or failing backend can never
//! block or crash a run.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{Card, CardEffect, CardKind, ThreatKind};
use crate::catalog::Catalog;
use crate::characters::Character;
use crate::state::GameLog;

pub const FALLBACK_BOSS_ID: &str = "boss_pale_rider";
const FALLBACK_BOSS_HEALTH: i32 = 25;
const FALLBACK_BOSS_DAMAGE: i32 = 15;
const FALLBACK_BOSS_GOLD: i32 = 50;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative backend unavailable")]
    Unavailable,
    #[error("narrative response malformed: {0}")]
    Malformed(String),
    #[error("narrative backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroStory {
    pub title: String,
    pub paragraph: String,
}

/// Context handed to boss generation; everything is optional because the
/// boss may be produced before the player has picked a character.
#[derive(Debug, Clone, Copy, Default)]
pub struct BossContext<'a> {
    pub player_name: Option<&'a str>,
    pub character: Option<&'a Character>,
    pub ng_plus: u32,
}

pub trait Narrator {
    /// Produce the run's final boss as a threat card.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable or its response
    /// cannot be shaped into a threat card.
    fn generate_boss(&self, ctx: &BossContext<'_>) -> Result<Card, NarrativeError>;

    /// Produce a re-themed catalog for a progression milestone.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable or the remixed
    /// catalog is malformed.
    fn remix_catalog(&self, base: &Catalog, ng_plus: u32) -> Result<Catalog, NarrativeError>;

    /// Produce the title and opening paragraph shown before the run.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot produce a story.
    fn intro_story(
        &self,
        player_name: &str,
        character: &Character,
        boss: &Card,
    ) -> Result<IntroStory, NarrativeError>;

    /// Produce the closing narration for a finished run.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot produce an epilogue.
    fn epilogue(&self, log: &GameLog, outcome: &str) -> Result<String, NarrativeError>;
}

/// The no-backend narrator: every request fails, so every caller lands on
/// its deterministic fallback. This is the default for tests and headless
/// play.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn generate_boss(&self, _ctx: &BossContext<'_>) -> Result<Card, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }

    fn remix_catalog(&self, _base: &Catalog, _ng_plus: u32) -> Result<Catalog, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }

    fn intro_story(
        &self,
        _player_name: &str,
        _character: &Character,
        _boss: &Card,
    ) -> Result<IntroStory, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }

    fn epilogue(&self, _log: &GameLog, _outcome: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }
}

/// The stock boss used whenever generation fails, scaled to the progression
/// level so repeat runs stay dangerous.
#[must_use]
pub fn fallback_boss(ng_plus: u32) -> Card {
    let level = i32::try_from(ng_plus).unwrap_or(0);
    Card {
        id: String::from(FALLBACK_BOSS_ID),
        name: String::from("The Pale Rider"),
        kind: CardKind::Threat,
        threat: Some(ThreatKind::Human),
        health: Some(FALLBACK_BOSS_HEALTH + level),
        gold_value: Some(FALLBACK_BOSS_GOLD + level),
        effect: Some(CardEffect::Damage {
            amount: FALLBACK_BOSS_DAMAGE + level,
            strips_gear: false,
        }),
        on_reveal: None,
        sell_value: 0,
        buy_cost: 0,
        nocturnal: false,
        herbal: false,
        immovable: false,
        desc: String::from(
            "A gaunt figure on a grey horse, spoken of only around dying fires. \
             Trails twist and go cold wherever it has passed.",
        ),
    }
}

/// Check a narrator-provided boss before letting it into the run.
///
/// # Errors
///
/// Returns `Malformed` when the card is not a fightable threat.
pub fn validate_boss(card: Card) -> Result<Card, NarrativeError> {
    if !card.is_threat() {
        return Err(NarrativeError::Malformed(String::from(
            "boss is not a threat card",
        )));
    }
    if card.health.unwrap_or(0) <= 0 {
        return Err(NarrativeError::Malformed(String::from(
            "boss has no health",
        )));
    }
    if card.attack_damage() <= 0 {
        return Err(NarrativeError::Malformed(String::from(
            "boss deals no damage",
        )));
    }
    Ok(card)
}

/// Templated intro used when story generation fails.
#[must_use]
pub fn fallback_intro(player_name: &str, character: &Character, boss: &Card) -> IntroStory {
    IntroStory {
        title: String::from("The Weight of the West"),
        paragraph: format!(
            "The grit of the trail clung to {player_name} like a second skin, earned \
             over miles of hard country. Around flickering campfires a new name had \
             begun to surface, spoken low and spat after: {boss}. For a {class} who \
             had already faced down their share of devils, turning back was never on \
             the table. Somewhere out past the last marked waterhole, a reckoning was \
             waiting, and {player_name} aimed to deliver it.",
            boss = boss.name,
            class = character.name,
        ),
    }
}

/// Templated epilogue used when narration fails.
#[must_use]
pub fn fallback_epilogue(outcome: &str) -> String {
    format!(
        "The ink ran dry before the whole tale could be set down, but the ledger \
         keeps its last line plain enough: {outcome} The rest, the dust and the \
         distance and the nights between, belongs to the trail."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters;

    #[test]
    fn fallback_boss_scales_with_level() {
        let base = fallback_boss(0);
        let deep = fallback_boss(12);
        assert_eq!(base.health, Some(25));
        assert_eq!(deep.health, Some(37));
        assert_eq!(deep.attack_damage(), 27);
        assert!(validate_boss(deep).is_ok());
    }

    #[test]
    fn validate_boss_rejects_toothless_cards() {
        let mut boss = fallback_boss(0);
        boss.effect = None;
        assert!(matches!(
            validate_boss(boss),
            Err(NarrativeError::Malformed(_))
        ));
    }

    #[test]
    fn silent_narrator_always_fails() {
        let narrator = SilentNarrator;
        assert!(narrator.generate_boss(&BossContext::default()).is_err());
        let character = characters::get("hunter").unwrap();
        let boss = fallback_boss(0);
        assert!(narrator.intro_story("Jess", character, &boss).is_err());
    }

    #[test]
    fn fallback_intro_mentions_both_parties() {
        let character = characters::get("doctor").unwrap();
        let boss = fallback_boss(0);
        let story = fallback_intro("Ada", character, &boss);
        assert!(story.paragraph.contains("Ada"));
        assert!(story.paragraph.contains(&boss.name));
    }
}
