//! The card catalog: id-keyed registry of every card definition in a run.
//!
//! The base catalog is static content; scaled and themed catalogs are derived
//! from it per run and passed by value to the deck builder and resolvers.
use crate::card::{
    Card, CardEffect, CardKind, OnReveal, ThreatKind, TrapSize, UpgradeKind, WeaponCondition,
    WeaponKind,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static BASE: Lazy<Catalog> = Lazy::new(|| Catalog::from_cards(base_cards()));

/// Registry of card definitions keyed by id. Iteration order is stable so
/// that deck sampling is reproducible under a fixed RNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    cards: BTreeMap<String, Card>,
}

impl Catalog {
    /// The unscaled content set every run starts from.
    #[must_use]
    pub fn base() -> &'static Self {
        &BASE
    }

    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Load a catalog from JSON, e.g. a themed set handed back by the
    /// narrative subsystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into card definitions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    pub fn insert(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn blank(id: &str, name: &str, kind: CardKind, desc: &str) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        threat: None,
        health: None,
        gold_value: None,
        effect: None,
        on_reveal: None,
        sell_value: 0,
        buy_cost: 0,
        nocturnal: false,
        herbal: false,
        immovable: false,
        desc: desc.to_string(),
    }
}

fn animal(id: &str, name: &str, health: i32, gold: i32, damage: i32, desc: &str) -> Card {
    let mut c = blank(id, name, CardKind::Threat, desc);
    c.threat = Some(ThreatKind::Animal);
    c.health = Some(health);
    c.gold_value = Some(gold);
    c.effect = Some(CardEffect::Damage {
        amount: damage,
        strips_gear: false,
    });
    c
}

fn human(id: &str, name: &str, health: i32, gold: i32, damage: i32, desc: &str) -> Card {
    let mut c = blank(id, name, CardKind::Threat, desc);
    c.threat = Some(ThreatKind::Human);
    c.health = Some(health);
    c.gold_value = Some(gold);
    c.effect = Some(CardEffect::Damage {
        amount: damage,
        strips_gear: false,
    });
    c
}

/// Thieving humans snatch gold on reveal and strike at nightfall.
fn robber(id: &str, name: &str, health: i32, gold: i32, damage: i32, steal: i32, desc: &str) -> Card {
    let mut c = human(id, name, health, gold, damage, desc);
    c.on_reveal = Some(OnReveal::StealGold { max: steal });
    c.nocturnal = true;
    c
}

fn affliction(id: &str, name: &str, kind: ThreatKind, effect: CardEffect, desc: &str) -> Card {
    let mut c = blank(id, name, CardKind::Threat, desc);
    c.threat = Some(kind);
    c.effect = Some(effect);
    c
}

fn priced(mut c: Card, sell: i32, buy: i32) -> Card {
    c.sell_value = sell;
    c.buy_cost = buy;
    c
}

fn weapon(id: &str, name: &str, sell: i32, buy: i32, attack: i32, kind: WeaponKind, desc: &str) -> Card {
    let mut c = priced(blank(id, name, CardKind::Item, desc), sell, buy);
    c.effect = Some(CardEffect::Weapon { attack, kind });
    c
}

fn trap(id: &str, name: &str, sell: i32, buy: i32, size: TrapSize, break_damage: i32, desc: &str) -> Card {
    let mut c = priced(blank(id, name, CardKind::Item, desc), sell, buy);
    c.effect = Some(CardEffect::Trap { size, break_damage });
    c
}

fn valuable(id: &str, name: &str, sell: i32, desc: &str) -> Card {
    let mut c = blank(id, name, CardKind::Item, desc);
    c.sell_value = sell;
    c
}

fn upgrade(id: &str, name: &str, sell: i32, buy: i32, kind: UpgradeKind, desc: &str) -> Card {
    let mut c = priced(blank(id, name, CardKind::Upgrade, desc), sell, buy);
    c.effect = Some(CardEffect::Upgrade(kind));
    c
}

fn provision(id: &str, name: &str, sell: i32, buy: i32, heal: i32, cures: bool, desc: &str) -> Card {
    let mut c = priced(blank(id, name, CardKind::Provision, desc), sell, buy);
    c.effect = Some(CardEffect::Heal {
        amount: heal,
        cures,
    });
    c
}

fn herb(id: &str, name: &str, sell: i32, buy: i32, heal: i32, cures: bool, desc: &str) -> Card {
    let mut c = provision(id, name, sell, buy, heal, cures, desc);
    c.herbal = true;
    c
}

#[allow(clippy::too_many_lines)]
fn base_cards() -> Vec<Card> {
    let mut cards = vec![
        // Animal threats. Small game flees at nightfall, medium game bides
        // its time, big game attacks the moment it appears.
        animal("threat_squirrel_t1", "Squirrel", 1, 1, 0, "A chattering nuisance, more noise than menace."),
        animal("threat_rabbit_t1", "Rabbit", 2, 2, 0, "Quick to bolt at the first sign of trouble."),
        animal("threat_rabbit_t3", "Plump Rabbit", 3, 2, 0, "Slower than its kin, but not by much."),
        animal("threat_skunk_t1", "Skunk", 2, 2, 2, "A striped critter, best avoided. Sprays at nightfall."),
        animal("threat_muskrat_t1", "Muskrat", 2, 2, 1, "A nippy little thing from the riverbank."),
        animal("threat_opossum_t1", "Opossum", 2, 2, 1, "Plays dead until it doesn't."),
        animal("threat_raccoon_t1", "Raccoon", 3, 4, 1, "A masked bandit of the night."),
        animal("threat_beaver_t1", "Beaver", 4, 4, 4, "Territorial, with a bite to prove it."),
        animal("threat_fox_t1", "Fox", 5, 4, 2, "Sly, and more trouble than it looks."),
        animal("threat_coyote_t1", "Coyote", 6, 6, 2, "A wary pack hunter circling the camp."),
        animal("threat_wolf_t1", "Wolf", 6, 6, 3, "A lone wolf with hunger in its eyes."),
        animal("threat_deer_t1", "Deer", 6, 6, 2, "Graceful, but dangerous when cornered."),
        animal("threat_wolf_t2", "Wolf (Alpha)", 8, 8, 4, "Leader of a small and vicious pack."),
        animal("threat_buck_t1", "Buck", 8, 8, 4, "A powerful rack of antlers, lowered."),
        animal("threat_buck_t2", "Territorial Buck", 8, 8, 5, "This one holds its ground."),
        animal("threat_wolf_t3", "Dire Wolf", 10, 10, 3, "Strong and cunning, a true test."),
        animal("threat_boar_t1", "Boar", 10, 10, 4, "Sharp tusks and a mean temper."),
        animal("threat_boar_t2", "Enraged Boar", 10, 10, 6, "It charges with pure fury."),
        animal("threat_cougar_t1", "Cougar", 10, 15, 8, "A silent killer of the high country."),
        animal("threat_moose_t1", "Moose", 12, 10, 5, "King of the northern forests."),
        animal("threat_elk_t1", "Elk", 12, 10, 5, "Its bugle echoes down the valley."),
        animal("threat_cougar_t2", "Hungry Cougar", 12, 15, 10, "Lean, hungry, and stalking."),
        animal("threat_black_bear_t1", "Black Bear", 15, 20, 12, "A formidable test of survival."),
        animal("threat_black_bear_t2", "Wary Black Bear", 16, 20, 10, "Cautious, yet terribly strong."),
        animal("threat_wolf_pack_t1", "Wolf Pack", 18, 25, 15, "A coordinated, deadly encounter."),
        animal("threat_wolf_pack_t2", "Large Wolf Pack", 20, 25, 16, "The circle tightens from all sides."),
        animal("threat_grizzly_bear_t1", "Grizzly Bear", 25, 30, 18, "An enormous titan of the wild."),
        // Human threats.
        robber("threat_vagabond_t1", "Vagabond", 5, 5, 2, 3, "A desperate drifter after your coin."),
        robber("threat_vagabond_t2", "Aggressive Vagabond", 7, 8, 3, 4, "Looking for trouble or coin, likely both."),
        robber("threat_thief_t1", "Thief", 6, 10, 3, 5, "Nimble fingers, steals on sight."),
        robber("threat_thief_t2", "Experienced Thief", 8, 12, 4, 6, "A bold cutpurse, hits harder come dark."),
        robber("threat_thief_t3", "Desperate Thief", 5, 8, 2, 4, "Reckless; not much of a fighter."),
        human("threat_outlaw_t1", "Outlaw", 8, 16, 8, "A hardened desperado, quick on the draw."),
        human("threat_outlaw_t2", "Notorious Outlaw", 10, 18, 7, "Wanted dead or alive, tough as nails."),
        human("threat_outlaw_t3", "Trigger-Happy Outlaw", 9, 15, 9, "Shoots first and asks later."),
        human("threat_bandit_t1", "Bandit", 10, 20, 8, "A ruthless road agent preying on travelers."),
        human("threat_bandit_t2", "Bandit Leader", 12, 22, 9, "Well-armed, with a gang at their back."),
        human("threat_bandit_camp_t1", "Bandit Camp", 15, 30, 10, "A rough encampment, heavily guarded."),
        // Illness and environmental events. All of them end the day.
        affliction("threat_malaria", "Malaria", ThreatKind::Illness,
            CardEffect::Damage { amount: 2, strips_gear: false },
            "A mosquito's bite brings raging fever. The day is lost."),
        affliction("threat_scarlet_fever", "Scarlet Fever", ThreatKind::Illness,
            CardEffect::Damage { amount: 3, strips_gear: false },
            "Crimson rash and high fever. The day is lost."),
        affliction("threat_snake_bite", "Snake Bite", ThreatKind::Illness,
            CardEffect::Poison { damage: 2 },
            "Fangs of fire from underfoot. The day is lost."),
        affliction("threat_dysentery", "Dysentery", ThreatKind::Illness,
            CardEffect::Poison { damage: 2 },
            "Tainted water brings debilitating sickness. The day is lost."),
        affliction("threat_lightning_strike", "Lightning Strike", ThreatKind::Environmental,
            CardEffect::DamagePercent { fraction: 0.5 },
            "The sky splits with a deafening crack. The day is lost."),
        affliction("threat_rockslide", "Rockslide", ThreatKind::Environmental,
            CardEffect::Damage { amount: 2, strips_gear: true },
            "The mountain groans and sheds its stones. Gear is lost with the day."),
        // Weapons.
        weapon("item_sawed_off_t1", "Sawed Off", 20, 40, 5, WeaponKind::Firearm,
            "A scattergun cut short for close-quarters mayhem."),
        weapon("item_rifle_t1", "Rifle", 25, 50, 3, WeaponKind::Firearm,
            "A trusty long gun for taking game or targets."),
        weapon("item_six_shooter_t1", "Six Shooter", 15, 30, 2, WeaponKind::Firearm,
            "The iconic revolver of the trail."),
        weapon("item_bow_t1", "Bow", 10, 20, 2, WeaponKind::Bow,
            "A silent hunter's tool; arrows fly true."),
        weapon("item_knife_t1", "Knife", 5, 10, 1, WeaponKind::Knife,
            "A versatile blade for utility or defense."),
        // Traps.
        trap("item_small_trap_t1", "Small Trap", 5, 10, TrapSize::Small, 0,
            "A simple snare. Takes animals up to 4 health."),
        trap("item_medium_trap_t1", "Medium Trap", 8, 16, TrapSize::Medium, 2,
            "A sturdier trap. Takes animals up to 6 health; bites what breaks it."),
        trap("item_large_trap_t1", "Large Trap", 12, 24, TrapSize::Large, 3,
            "Heavy-duty jaws. Takes animals up to 8 health; bites what breaks it."),
        // Valuables.
        valuable("item_gold_nugget_t1", "Gold Nugget", 20, "A gleaming chunk of pure gold."),
        valuable("item_gold_nugget_t2", "Large Gold Nugget", 25, "An exceptionally valuable find."),
        valuable("item_gold_nugget_t3", "Gold Dust", 10, "A pouch of fine dust, panned from a stream."),
        valuable("item_jewelry_t1", "Tarnished Locket", 10, "A tarnished piece of finery."),
        valuable("item_jewelry_t2", "Ornate Silver Ring", 15, "An ornate ring with a small stone."),
        valuable("item_jewelry_t3", "Simple Gold Band", 12, "A plain band, worn smooth with time."),
        // Sundries and actions.
        blank("item_wood_t1", "Firewood", CardKind::Item,
            "Dry wood for a warm fire. Keeps the night quiet."),
        blank("item_fire_arrows_t1", "Fire Arrows", CardKind::Item,
            "Arrows tipped with burning pitch. Needs a bow."),
        blank("item_gold_pan", "Gold Pan", CardKind::Item,
            "Swirl river dirt for a chance at gold flakes."),
        blank("action_scout_ahead", "Scout Ahead", CardKind::Action,
            "Take a cautious look at what waits on the trail."),
        blank("action_trick_shot", "Trick Shot", CardKind::Action,
            "A daring shot, deadlier with another iron ready."),
    ];

    // Effects and prices for the sundries above.
    for card in &mut cards {
        match card.id.as_str() {
            "item_wood_t1" => {
                card.effect = Some(CardEffect::Campfire);
                card.sell_value = 1;
                card.buy_cost = 2;
            }
            "item_fire_arrows_t1" => {
                card.effect = Some(CardEffect::FireArrow);
                card.sell_value = 10;
                card.buy_cost = 20;
            }
            "item_gold_pan" => {
                card.effect = Some(CardEffect::Gold { min: 1, max: 3 });
                card.sell_value = 10;
                card.buy_cost = 15;
            }
            "action_scout_ahead" => {
                card.effect = Some(CardEffect::Scout);
                card.sell_value = 10;
                card.buy_cost = 20;
            }
            "action_trick_shot" => {
                card.effect = Some(CardEffect::ConditionalWeapon {
                    attack: 3,
                    bonus: 3,
                    condition: WeaponCondition::AnotherFirearmReady,
                });
                card.sell_value = 12;
                card.buy_cost = 24;
            }
            _ => {}
        }
    }

    cards.extend([
        // Coats, boots, and other persistent gear.
        upgrade("upgrade_deer_skin_coat_t1", "Deer Skin Coat", 18, 35,
            UpgradeKind::MaxHealth { amount: 3 }, "A light coat of deerskin."),
        upgrade("upgrade_boar_skin_coat_t1", "Boar Skin Coat", 20, 40,
            UpgradeKind::MaxHealth { amount: 4 }, "Rugged boar hide, surprisingly sturdy."),
        upgrade("upgrade_wolf_fur_coat_t1", "Wolf Fur Coat", 28, 55,
            UpgradeKind::MaxHealth { amount: 6 }, "Warm and intimidating in equal measure."),
        upgrade("upgrade_elk_skin_coat_t1", "Elk Skin Coat", 32, 65,
            UpgradeKind::MaxHealth { amount: 7 }, "Supple elk skin, strong yet flexible."),
        upgrade("upgrade_bearskin_coat", "Bearskin Coat", 30, 60,
            UpgradeKind::MaxHealth { amount: 7 }, "A heavy coat from a great bear."),
        upgrade("upgrade_moose_hide_coat_t1", "Moose Hide Coat", 35, 70,
            UpgradeKind::MaxHealth { amount: 8 }, "Thick hide, a formidable bulwark."),
        upgrade("upgrade_canvas_duster_t1", "Canvas Duster", 15, 30,
            UpgradeKind::MaxHealth { amount: 3 }, "A lighter duster for dusty trails."),
        upgrade("upgrade_duster_coat_t1", "Duster Coat", 25, 50,
            UpgradeKind::MaxHealth { amount: 5 }, "A long coat against the elements."),
        upgrade("upgrade_leather_gloves_t1", "Leather Gloves", 8, 16,
            UpgradeKind::MaxHealth { amount: 1 }, "A sure grip for calloused hands."),
        upgrade("upgrade_worn_out_boots_t1", "Worn Out Boots", 5, 10,
            UpgradeKind::MaxHealth { amount: 1 }, "Too many miles, but they still serve."),
        upgrade("upgrade_sturdy_boots_t1", "Sturdy Boots", 25, 50,
            UpgradeKind::MaxHealth { amount: 5 }, "Well-made boots for the miles ahead."),
        upgrade("upgrade_reinforced_boots_t1", "Reinforced Boots", 30, 60,
            UpgradeKind::MaxHealth { amount: 6 }, "Built for the harshest terrain."),
        upgrade("upgrade_iron_will", "Iron Will", 40, 80,
            UpgradeKind::MaxHealth { amount: 10 }, "Unflinching resolve, bolted to the soul."),
        // Hats: one hit negated, then gone.
        upgrade("upgrade_beaver_fur_hat_t1", "Beaver Fur Hat", 10, 20,
            UpgradeKind::DamageNegation { bonus_health: 2 }, "Might just save your scalp once."),
        upgrade("upgrade_racoon_skin_hat_t1", "Racoon Skin Hat", 12, 24,
            UpgradeKind::DamageNegation { bonus_health: 2 }, "A classic cap, surprisingly lucky."),
        upgrade("upgrade_fox_fur_hat_t1", "Fox Fur Hat", 15, 30,
            UpgradeKind::DamageNegation { bonus_health: 3 }, "Handsome fur that turns aside a blow."),
        // Satchels.
        upgrade("upgrade_canvas_satchel_t1", "Canvas Satchel", 10, 20,
            UpgradeKind::Storage { capacity: 2 }, "Room for a few extra provisions."),
        upgrade("upgrade_leather_satchel_t1", "Leather Satchel", 15, 30,
            UpgradeKind::Storage { capacity: 3 }, "A sturdy bag for the trail."),
        upgrade("upgrade_reinforced_satchel_t1", "Reinforced Satchel", 20, 40,
            UpgradeKind::Storage { capacity: 4 }, "Built to carry a heavy load."),
        // Combat multipliers and flat boosts.
        upgrade("upgrade_bandolier_t1", "Bandolier", 15, 30,
            UpgradeKind::DoubleFire, "Extra ammo at the ready doubles firearm damage."),
        upgrade("upgrade_quiver_t1", "Quiver", 15, 30,
            UpgradeKind::QuiverBoost, "Extra arrows let a bow loose twice."),
        upgrade("upgrade_lucky_arrowhead", "Lucky Arrowhead", 5, 10,
            UpgradeKind::BowBoost { amount: 1 }, "An odd arrowhead that guides bow shots."),
        upgrade("upgrade_worn_whetstone", "Worn Whetstone", 5, 10,
            UpgradeKind::KnifeBoost { amount: 1 }, "Keeps a knife's edge razor sharp."),
        upgrade("upgrade_lucky_bullet", "Lucky Bullet", 5, 10,
            UpgradeKind::FirearmBoost { amount: 1 }, "Steadies firearm aim, equipped or in hand."),
        upgrade("upgrade_medical_journal", "Medical Journal", 5, 10,
            UpgradeKind::ProvisionHealBoost { amount: 1 }, "Well-read notes enhance every remedy."),
        upgrade("upgrade_herb_pouch", "Herb Pouch", 5, 10,
            UpgradeKind::HerbBoost { amount: 2 }, "Keeps medicinal herbs fresh and potent."),
        upgrade("upgrade_treasure_map", "Treasure Map", 5, 10,
            UpgradeKind::SellBoost { amount: 2 }, "Sharpens bartering, or hints at riches."),
        upgrade("upgrade_tattered_bible", "Tattered Bible", 5, 10,
            UpgradeKind::DamageReduction { amount: 1 }, "Words of comfort, a measure of protection."),
        upgrade("upgrade_waterskin_canteen_t1", "Waterskin Canteen", 12, 24,
            UpgradeKind::NightlyHeal { amount: 2 }, "A reliable waterskin, restorative each night."),
        // Provisions.
        herb("provision_juniper_t1", "Juniper Berries", 1, 2, 1, true,
            "Aromatic berries, purifying and restorative."),
        herb("provision_basil_t1", "Wild Basil", 1, 2, 1, true,
            "Fragrant leaves that fight infection."),
        herb("provision_peppermint_t1", "Peppermint", 2, 4, 2, true,
            "Refreshing mint that soothes the stomach."),
        herb("provision_sage_t1", "Wild Sage", 2, 4, 2, false,
            "Aromatic sage for cleansing or a simple tea."),
        provision("provision_fever_tonic_t1", "Fever Tonic", 2, 4, 2, true,
            "An old remedy to break fevers."),
        provision("provision_miracle_cure_t1", "Miracle Cure", 10, 20, 6, true,
            "A potent, mysterious elixir."),
        provision("provision_laudanum_t1", "Laudanum", 5, 10, 4, false,
            "Potent tincture for dulling severe pain."),
        provision("provision_health_tonic_t1", "Health Tonic", 3, 6, 3, false,
            "A restorative draught that mends wounds."),
        provision("provision_dried_meat", "Dried Meat", 1, 2, 1, false,
            "Tough preserved strips, a trail staple."),
        provision("provision_hardtack", "Hardtack", 1, 2, 2, false,
            "Lasts forever, tough to chew."),
        provision("provision_steak", "Steak", 2, 4, 3, false,
            "A hearty slab of fresh meat."),
        provision("provision_water_t1", "Clean Water", 1, 2, 1, false,
            "Clear, precious, essential."),
    ]);

    // Iron Will is the one piece of gear a rockslide cannot tear off; the
    // skunk is the one animal that waits for dark.
    for card in &mut cards {
        match card.id.as_str() {
            "upgrade_iron_will" => card.immovable = true,
            "threat_skunk_t1" => card.nocturnal = true,
            _ => {}
        }
    }
    let mut tonic = priced(
        blank(
            "provision_stamina_tonic_t1",
            "Stamina Tonic",
            CardKind::Provision,
            "A bitter brew that quickens the senses.",
        ),
        1,
        2,
    );
    tonic.effect = Some(CardEffect::Draw { count: 2 });
    cards.push(tonic);

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::AnimalSize;

    #[test]
    fn base_catalog_is_well_formed() {
        let base = Catalog::base();
        assert!(base.len() > 80, "catalog unexpectedly small: {}", base.len());
        for card in base.cards() {
            assert!(!card.id.is_empty());
            assert!(!card.name.is_empty());
            if card.is_threat() {
                assert!(card.threat.is_some(), "{} missing threat kind", card.id);
            }
            if card.is_animal() || card.is_human() {
                assert!(card.health.unwrap_or(0) > 0, "{} has no health", card.id);
                assert!(card.gold_value.unwrap_or(0) > 0, "{} has no bounty", card.id);
            }
        }
    }

    #[test]
    fn catalog_holds_quota_minimums_for_deck_building() {
        let base = Catalog::base();
        let animals = base.cards().filter(|c| c.is_animal()).count();
        let humans = base.cards().filter(|c| c.is_human()).count();
        let afflictions = base.cards().filter(|c| c.forces_day_end()).count();
        let valuables = base.cards().filter(|c| c.is_valuable()).count();
        assert!(animals >= 8);
        assert!(humans >= 7);
        assert!(afflictions >= 2);
        assert!(valuables >= 3);
    }

    #[test]
    fn nocturnal_flags_cover_robbers_and_skunk() {
        let base = Catalog::base();
        assert!(base.get("threat_skunk_t1").unwrap().nocturnal);
        assert!(base.get("threat_thief_t2").unwrap().nocturnal);
        assert!(base.get("threat_vagabond_t1").unwrap().nocturnal);
        assert!(!base.get("threat_outlaw_t1").unwrap().nocturnal);
    }

    #[test]
    fn skunk_is_a_small_nocturnal_animal() {
        let skunk = Catalog::base().get("threat_skunk_t1").unwrap();
        assert_eq!(skunk.animal_size(), Some(AnimalSize::Small));
        assert!(skunk.nocturnal);
    }

    #[test]
    fn json_round_trip_preserves_effects() {
        let base = Catalog::base();
        let json = serde_json::to_string(base).unwrap();
        let back = Catalog::from_json(&json).unwrap();
        assert_eq!(base, &back);
    }
}
