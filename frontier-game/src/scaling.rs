//! Content scaling across New Game Plus levels.
//!
//! Numbers compound from the nearest themed checkpoint, never from the
//! absolute base, so a long chain of repeat runs stays bounded: a milestone
//! swaps in a re-themed catalog and later levels add small deltas on top of
//! it.
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardEffect};
use crate::catalog::Catalog;
use crate::narrative::{Narrator, NarrativeError};

/// Levels between wholesale themed catalog refreshes.
pub const THEME_MILESTONE_INTERVAL: u32 = 10;

/// A themed catalog captured at a milestone; incremental scaling between
/// milestones works from this snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemedCheckpoint {
    pub level: u32,
    pub catalog: Catalog,
}

/// Nearest milestone at or below the previous level, i.e. the checkpoint a
/// non-milestone level scales from.
#[must_use]
pub const fn milestone_for(level: u32) -> u32 {
    if level == 0 {
        0
    } else {
        (level - 1) / THEME_MILESTONE_INTERVAL * THEME_MILESTONE_INTERVAL
    }
}

fn scale_card(card: &mut Card, delta: i32) {
    if card.is_animal() || card.is_human() {
        if let Some(health) = card.health.as_mut() {
            *health = (*health + delta).max(1);
        }
        match card.effect.as_mut() {
            Some(CardEffect::Damage { amount, .. }) => *amount += delta,
            Some(CardEffect::Poison { damage }) => *damage += delta,
            _ => {}
        }
        if let Some(gold) = card.gold_value.as_mut() {
            *gold += delta;
        }
    } else if let Some(
        CardEffect::Weapon { attack, .. } | CardEffect::ConditionalWeapon { attack, .. },
    ) = card.effect.as_mut()
    {
        *attack += delta;
    }
    if card.sell_value > 0 {
        card.sell_value += delta;
    }
    if card.buy_cost > 0 {
        card.buy_cost += delta;
    }
}

/// Flat numeric scaling pass. The same rule serves both the from-base path
/// and the incremental from-checkpoint path; only the input catalog and the
/// delta differ.
#[must_use]
pub fn apply_manual_scaling(from: &Catalog, delta: u32) -> Catalog {
    let mut scaled = from.clone();
    if delta == 0 {
        return scaled;
    }
    let delta = i32::try_from(delta).unwrap_or(i32::MAX);
    for card in scaled.cards_mut() {
        scale_card(card, delta);
    }
    scaled
}

/// Produce the catalog for a run at the given progression level, along with
/// the themed checkpoint the session should keep for later levels.
///
/// Narrative failures at a milestone fall back to manual scaling of the
/// absolute base; they are logged and never surface to the caller.
#[must_use]
pub fn scale_catalog(
    base: &Catalog,
    level: u32,
    checkpoint: Option<&ThemedCheckpoint>,
    narrator: &dyn Narrator,
) -> (Catalog, Option<ThemedCheckpoint>) {
    if level == 0 {
        return (base.clone(), None);
    }

    if level % THEME_MILESTONE_INTERVAL == 0 {
        match narrator
            .remix_catalog(base, level)
            .and_then(|remixed| {
                if remixed.is_empty() {
                    Err(NarrativeError::Malformed(String::from(
                        "remixed catalog is empty",
                    )))
                } else {
                    Ok(remixed)
                }
            }) {
            Ok(remixed) => {
                let fresh = ThemedCheckpoint {
                    level,
                    catalog: remixed.clone(),
                };
                return (remixed, Some(fresh));
            }
            Err(err) => {
                log::warn!("catalog remix failed at level {level}, scaling manually: {err}");
                return (apply_manual_scaling(base, level), None);
            }
        }
    }

    let milestone = milestone_for(level);
    if milestone > 0
        && let Some(cp) = checkpoint
        && cp.level == milestone
    {
        let scaled = apply_manual_scaling(&cp.catalog, level - milestone);
        return (scaled, Some(cp.clone()));
    }

    (apply_manual_scaling(base, level), checkpoint.cloned())
}
