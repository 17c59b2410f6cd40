//! Playable characters and their starter kits.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const NG_HEALTH_BOOST_INTERVAL: u32 = 10;
pub const NG_HEALTH_BOOST_AMOUNT: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub health: i32,
    pub gold: i32,
    pub ability: String,
    pub starter_deck: Vec<String>,
    pub story: String,
}

impl Character {
    /// Max health for this character at the given progression level:
    /// a boost every full interval, eroded one point per level, never
    /// below one.
    #[must_use]
    pub fn scaled_health(&self, ng_plus: u32) -> i32 {
        let boosts = i32::try_from(ng_plus / NG_HEALTH_BOOST_INTERVAL).unwrap_or(0);
        let level = i32::try_from(ng_plus).unwrap_or(0);
        (self.health + boosts * NG_HEALTH_BOOST_AMOUNT - level).max(1)
    }
}

fn character(
    id: &str,
    name: &str,
    health: i32,
    gold: i32,
    ability: &str,
    starters: [&str; 4],
    story: &str,
) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        health,
        gold,
        ability: ability.to_string(),
        starter_deck: starters.iter().map(|s| (*s).to_string()).collect(),
        story: story.to_string(),
    }
}

static ROSTER: Lazy<Vec<Character>> = Lazy::new(|| {
    vec![
        character(
            "hunter", "Hunter", 20, 20,
            "A master of the wild; their aim is true as the northern star.",
            ["item_bow_t1", "upgrade_bearskin_coat", "provision_steak", "upgrade_lucky_arrowhead"],
            "Clad in patchwork deer hide and worn leather, a hawk feather in the band of a faded hat. Their eyes miss nothing.",
        ),
        character(
            "trapper", "Trapper", 18, 25,
            "Knows every trail and snare; a survivor who lives off the land.",
            ["item_knife_t1", "upgrade_bearskin_coat", "provision_dried_meat", "upgrade_worn_whetstone"],
            "They smell of pine and smoke. Thick, calloused hands fidget with the handle of a well-used skinning knife.",
        ),
        character(
            "gunslinger", "Gunslinger", 24, 20,
            "Their reputation is written in smoke, their legend told in thunder.",
            ["item_six_shooter_t1", "upgrade_bandolier_t1", "provision_laudanum_t1", "upgrade_lucky_bullet"],
            "A long duster caked with the dust of a dozen towns. A steady gaze, a hand never far from the worn pistol grip.",
        ),
        character(
            "doctor", "Doctor", 18, 25,
            "A steady hand that can mend flesh or end a life with grim precision.",
            ["item_knife_t1", "upgrade_duster_coat_t1", "provision_miracle_cure_t1", "upgrade_medical_journal"],
            "Spectacles and a wrinkled-but-clean shirt even in the wild. Their bag smells sharply of carbolic acid.",
        ),
        character(
            "herbalist", "Herbalist", 18, 20,
            "Finds life and remedy where others see only weeds and dirt.",
            ["item_knife_t1", "upgrade_leather_satchel_t1", "provision_juniper_t1", "upgrade_herb_pouch"],
            "Homespun linen stained with berry juice, dried flowers woven into their hair, a deerskin pouch always at hand.",
        ),
        character(
            "explorer", "Explorer", 18, 28,
            "Driven by wanderlust and the promise of what lies over the next hill.",
            ["item_six_shooter_t1", "upgrade_sturdy_boots_t1", "provision_water_t1", "upgrade_treasure_map"],
            "A sun-faded canvas shirt worn thin, boots caked with the mud of countless miles, eyes always on the horizon.",
        ),
        character(
            "preacher", "Preacher", 22, 25,
            "Wields scripture and judgment with equal, unwavering conviction.",
            ["item_knife_t1", "upgrade_iron_will", "provision_laudanum_t1", "upgrade_tattered_bible"],
            "A gaunt figure in threadbare black, all sharp angles and hollow cheeks, clutching a worn leather-bound book.",
        ),
        character(
            "prospector", "Prospector", 16, 30,
            "Haunted by the glimmer of gold and the ghosts of the mountains.",
            ["item_sawed_off_t1", "upgrade_leather_satchel_t1", "provision_water_t1", "item_gold_pan"],
            "More patch than fabric, a wild grey beard stained with tobacco, sunken eyes that glitter with desperate hope.",
        ),
    ]
});

/// The full playable roster, in selection order.
#[must_use]
pub fn roster() -> &'static [Character] {
    &ROSTER
}

#[must_use]
pub fn get(id: &str) -> Option<&'static Character> {
    ROSTER.iter().find(|c| c.id == id)
}

/// Union of every character's starter card ids; these are guaranteed by
/// selection and excluded from deck sampling.
#[must_use]
pub fn all_starter_ids() -> std::collections::BTreeSet<String> {
    ROSTER
        .iter()
        .flat_map(|c| c.starter_deck.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn starter_decks_resolve_against_base_catalog() {
        let base = Catalog::base();
        for character in roster() {
            assert_eq!(character.starter_deck.len(), 4, "{}", character.id);
            for id in &character.starter_deck {
                assert!(base.contains(id), "{} starter {id} missing", character.id);
            }
        }
    }

    #[test]
    fn scaled_health_boosts_and_erodes() {
        let hunter = get("hunter").unwrap();
        assert_eq!(hunter.scaled_health(0), 20);
        assert_eq!(hunter.scaled_health(3), 17);
        // At the boost interval the bonus lands before the erosion.
        assert_eq!(hunter.scaled_health(10), 20);
        assert_eq!(hunter.scaled_health(25), 15);
    }

    #[test]
    fn scaled_health_never_drops_below_one() {
        let prospector = get("prospector").unwrap();
        assert_eq!(prospector.scaled_health(9), 7);
        assert!(prospector.scaled_health(200) >= 1);
    }
}
