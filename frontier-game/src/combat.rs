//! Attack and healing math: pure functions over a card and the player's
//! current gear.
use crate::card::{Card, CardEffect, UpgradeKind, WeaponCondition, WeaponKind};
use crate::state::PlayerState;

/// Fixed damage dealt by fire arrows.
pub const FIRE_ARROW_DAMAGE: i32 = 2;
/// Flat bonus for striking with an equipped weapon instead of one in hand.
pub const EQUIPPED_STRIKE_BONUS: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaySource {
    Hand,
    Equipped,
}

fn other_firearm_ready(player: &PlayerState, except_id: &str) -> bool {
    player
        .hand_cards()
        .chain(player.equipped.iter())
        .any(|c| c.id != except_id && c.is_firearm())
}

#[must_use]
pub fn has_bow(player: &PlayerState) -> bool {
    player
        .hand_cards()
        .chain(player.equipped.iter())
        .any(|c| matches!(c.weapon_kind(), Some(WeaponKind::Bow)))
}

/// Total attack power of a weapon or conditional weapon in the player's
/// current situation. Additive bonuses land first; the double-fire and
/// quiver multipliers apply last.
#[must_use]
pub fn attack_power(card: &Card, player: &PlayerState, source: PlaySource) -> i32 {
    let mut attack = match card.effect {
        Some(CardEffect::Weapon { attack, .. }) => attack,
        Some(CardEffect::ConditionalWeapon {
            attack,
            bonus,
            condition,
        }) => match condition {
            WeaponCondition::AnotherFirearmReady => {
                if other_firearm_ready(player, &card.id) {
                    attack + bonus
                } else {
                    attack
                }
            }
        },
        _ => return 0,
    };

    if source == PlaySource::Equipped {
        attack += EQUIPPED_STRIKE_BONUS;
    }

    let kind = card.weapon_kind();
    for upgrade in &player.equipped {
        match (upgrade.upgrade_kind(), kind) {
            (Some(UpgradeKind::BowBoost { amount }), Some(WeaponKind::Bow))
            | (Some(UpgradeKind::KnifeBoost { amount }), Some(WeaponKind::Knife)) => {
                attack += amount;
            }
            _ => {}
        }
    }

    if matches!(kind, Some(WeaponKind::Firearm)) {
        // The boost counts once: from the equipped copy if present, else
        // from a copy held in hand.
        let equipped_boost = player.equipped.iter().find_map(|c| match c.upgrade_kind() {
            Some(UpgradeKind::FirearmBoost { amount }) => Some(amount),
            _ => None,
        });
        let boost = equipped_boost.or_else(|| {
            player.hand_cards().find_map(|c| match c.upgrade_kind() {
                Some(UpgradeKind::FirearmBoost { amount }) => Some(amount),
                _ => None,
            })
        });
        attack += boost.unwrap_or(0);
    }

    let doubled_firearm = matches!(kind, Some(WeaponKind::Firearm))
        && player
            .equipped
            .iter()
            .any(|c| matches!(c.upgrade_kind(), Some(UpgradeKind::DoubleFire)));
    let doubled_bow = matches!(kind, Some(WeaponKind::Bow))
        && player
            .equipped
            .iter()
            .any(|c| matches!(c.upgrade_kind(), Some(UpgradeKind::QuiverBoost)));
    if doubled_firearm || doubled_bow {
        attack *= 2;
    }

    attack
}

/// Healing delivered by playing a provision: base amount plus provision
/// boosts, plus herb boosts when the card is herbal.
#[must_use]
pub fn heal_amount(card: &Card, player: &PlayerState) -> i32 {
    let Some(CardEffect::Heal { amount, .. }) = card.effect else {
        return 0;
    };
    let mut heal = amount;
    for upgrade in &player.equipped {
        match upgrade.upgrade_kind() {
            Some(UpgradeKind::ProvisionHealBoost { amount }) => heal += amount,
            Some(UpgradeKind::HerbBoost { amount }) if card.herbal => heal += amount,
            _ => {}
        }
    }
    heal
}

/// End-of-day healing from an equipped nightly-heal upgrade, with provision
/// boosts applied. Zero when nothing of the sort is worn.
#[must_use]
pub fn nightly_heal_amount(player: &PlayerState) -> i32 {
    let base: i32 = player
        .equipped
        .iter()
        .filter_map(|c| match c.upgrade_kind() {
            Some(UpgradeKind::NightlyHeal { amount }) => Some(amount),
            _ => None,
        })
        .sum();
    if base == 0 {
        return 0;
    }
    let boost: i32 = player
        .equipped
        .iter()
        .filter_map(|c| match c.upgrade_kind() {
            Some(UpgradeKind::ProvisionHealBoost { amount }) => Some(amount),
            _ => None,
        })
        .sum();
    base + boost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn card(id: &str) -> Card {
        Catalog::base().get(id).unwrap().clone()
    }

    fn player_with(equipped: &[&str], hand: &[&str]) -> PlayerState {
        let mut player = PlayerState {
            health: 10,
            max_health: 10,
            ..PlayerState::default()
        };
        for id in equipped {
            player.equipped.push(card(id));
        }
        for (slot, id) in hand.iter().enumerate() {
            player.hand[slot] = Some(card(id));
        }
        player
    }

    #[test]
    fn base_attack_from_hand() {
        let player = player_with(&[], &[]);
        assert_eq!(attack_power(&card("item_rifle_t1"), &player, PlaySource::Hand), 3);
    }

    #[test]
    fn equipped_strike_bonus_applies() {
        let player = player_with(&[], &[]);
        assert_eq!(
            attack_power(&card("item_knife_t1"), &player, PlaySource::Equipped),
            2
        );
    }

    #[test]
    fn conditional_weapon_needs_another_firearm() {
        let alone = player_with(&[], &[]);
        assert_eq!(
            attack_power(&card("action_trick_shot"), &alone, PlaySource::Hand),
            3
        );
        let armed = player_with(&["item_six_shooter_t1"], &[]);
        assert_eq!(
            attack_power(&card("action_trick_shot"), &armed, PlaySource::Hand),
            6
        );
    }

    #[test]
    fn firearm_boost_does_not_stack_across_locations() {
        let both = player_with(&["upgrade_lucky_bullet"], &["upgrade_lucky_bullet"]);
        assert_eq!(
            attack_power(&card("item_six_shooter_t1"), &both, PlaySource::Hand),
            3
        );
        let hand_only = player_with(&[], &["upgrade_lucky_bullet"]);
        assert_eq!(
            attack_power(&card("item_six_shooter_t1"), &hand_only, PlaySource::Hand),
            3
        );
    }

    #[test]
    fn multipliers_apply_after_additive_bonuses() {
        let player = player_with(&["upgrade_bandolier_t1", "upgrade_lucky_bullet"], &[]);
        // (2 base + 1 boost) * 2
        assert_eq!(
            attack_power(&card("item_six_shooter_t1"), &player, PlaySource::Hand),
            6
        );
        let archer = player_with(&["upgrade_quiver_t1", "upgrade_lucky_arrowhead"], &[]);
        // (2 base + 1 bow boost) * 2
        assert_eq!(attack_power(&card("item_bow_t1"), &archer, PlaySource::Hand), 6);
    }

    #[test]
    fn bandolier_leaves_bows_alone() {
        let player = player_with(&["upgrade_bandolier_t1"], &[]);
        assert_eq!(attack_power(&card("item_bow_t1"), &player, PlaySource::Hand), 2);
    }

    #[test]
    fn heal_boosts_stack_for_herbs_only() {
        let player = player_with(&["upgrade_medical_journal", "upgrade_herb_pouch"], &[]);
        // Juniper: 1 base + 1 journal + 2 herb pouch.
        assert_eq!(heal_amount(&card("provision_juniper_t1"), &player), 4);
        // Laudanum: 4 base + 1 journal, no herb bonus.
        assert_eq!(heal_amount(&card("provision_laudanum_t1"), &player), 5);
    }

    #[test]
    fn nightly_heal_comes_from_canteen() {
        let bare = player_with(&[], &[]);
        assert_eq!(nightly_heal_amount(&bare), 0);
        let canteen = player_with(&["upgrade_waterskin_canteen_t1"], &[]);
        assert_eq!(nightly_heal_amount(&canteen), 2);
        let boosted = player_with(
            &["upgrade_waterskin_canteen_t1", "upgrade_medical_journal"],
            &[],
        );
        assert_eq!(nightly_heal_amount(&boosted), 3);
    }
}
