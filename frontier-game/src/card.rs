//! Card definitions: the closed effect model shared by every deck in a run.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health at or below which an animal counts as small.
pub const SMALL_ANIMAL_MAX_HEALTH: i32 = 4;
/// Health above which an animal counts as large (and attacks on reveal).
pub const LARGE_ANIMAL_MIN_HEALTH: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Threat,
    Provision,
    Item,
    Action,
    Upgrade,
    Trophy,
    BountyProof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    Animal,
    Human,
    Illness,
    Environmental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Firearm,
    Bow,
    Knife,
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Firearm => "firearm",
            Self::Bow => "bow",
            Self::Knife => "knife",
        };
        f.write_str(label)
    }
}

/// Condition gating the bonus attack of a conditional weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCondition {
    /// Another firearm sits ready in hand or among equipped gear.
    AnotherFirearmReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapSize {
    Small,
    Medium,
    Large,
}

impl TrapSize {
    /// Largest animal health this trap can catch outright.
    #[must_use]
    pub const fn catch_threshold(self) -> i32 {
        match self {
            Self::Small => 4,
            Self::Medium => 6,
            Self::Large => 8,
        }
    }
}

/// Persistent upgrade behaviors, applied while the card stays equipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeKind {
    MaxHealth { amount: i32 },
    /// One-shot full damage negation; the hat also grants bonus max health
    /// while worn and is torn off (losing that bonus) when it fires.
    DamageNegation { bonus_health: i32 },
    Storage { capacity: usize },
    DoubleFire,
    QuiverBoost,
    BowBoost { amount: i32 },
    KnifeBoost { amount: i32 },
    FirearmBoost { amount: i32 },
    ProvisionHealBoost { amount: i32 },
    HerbBoost { amount: i32 },
    SellBoost { amount: i32 },
    DamageReduction { amount: i32 },
    /// Heals the wearer at the end of every day.
    NightlyHeal { amount: i32 },
}

/// Closed set of card effects. Exactly one variant per effect kind; each
/// variant carries only its own fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardEffect {
    Heal {
        amount: i32,
        #[serde(default)]
        cures: bool,
    },
    Weapon {
        attack: i32,
        kind: WeaponKind,
    },
    ConditionalWeapon {
        attack: i32,
        bonus: i32,
        condition: WeaponCondition,
    },
    FireArrow,
    Campfire,
    Gold {
        min: i32,
        max: i32,
    },
    Draw {
        count: usize,
    },
    Trap {
        size: TrapSize,
        #[serde(default)]
        break_damage: i32,
    },
    Scout,
    Upgrade(UpgradeKind),
    Damage {
        amount: i32,
        /// Forces discard of equipped gear (rockslide-style events).
        #[serde(default)]
        strips_gear: bool,
    },
    Poison {
        damage: i32,
    },
    DamagePercent {
        /// Fraction of current health, applied rounded up.
        fraction: f32,
    },
}

/// Effect resolved once, the moment the card is revealed as an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnReveal {
    StealGold { max: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimalSize {
    Small,
    Medium,
    Large,
}

impl AnimalSize {
    #[must_use]
    pub const fn from_health(health: i32) -> Self {
        if health <= SMALL_ANIMAL_MAX_HEALTH {
            Self::Small
        } else if health < LARGE_ANIMAL_MIN_HEALTH {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// Immutable card definition. Decks hold clones of catalog entries; the only
/// cards minted mid-run are trophies and bounty proofs for defeated threats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub kind: CardKind,
    #[serde(default)]
    pub threat: Option<ThreatKind>,
    #[serde(default)]
    pub health: Option<i32>,
    #[serde(default)]
    pub gold_value: Option<i32>,
    #[serde(default)]
    pub effect: Option<CardEffect>,
    #[serde(default)]
    pub on_reveal: Option<OnReveal>,
    #[serde(default)]
    pub sell_value: i32,
    #[serde(default)]
    pub buy_cost: i32,
    /// Threat waits until nightfall to strike instead of attacking on reveal.
    #[serde(default)]
    pub nocturnal: bool,
    /// Provision counts as an herb for herb-boost upgrades.
    #[serde(default)]
    pub herbal: bool,
    /// Equipped gear that survives forced-discard events.
    #[serde(default)]
    pub immovable: bool,
    pub desc: String,
}

impl Card {
    #[must_use]
    pub fn is_threat(&self) -> bool {
        matches!(self.kind, CardKind::Threat)
    }

    #[must_use]
    pub fn is_animal(&self) -> bool {
        self.is_threat() && matches!(self.threat, Some(ThreatKind::Animal))
    }

    #[must_use]
    pub fn is_human(&self) -> bool {
        self.is_threat() && matches!(self.threat, Some(ThreatKind::Human))
    }

    /// Illness and environmental events end the day the moment they land.
    #[must_use]
    pub fn forces_day_end(&self) -> bool {
        matches!(
            self.threat,
            Some(ThreatKind::Illness | ThreatKind::Environmental)
        )
    }

    #[must_use]
    pub fn animal_size(&self) -> Option<AnimalSize> {
        if self.is_animal() {
            Some(AnimalSize::from_health(self.health.unwrap_or(0)))
        } else {
            None
        }
    }

    #[must_use]
    pub fn weapon_kind(&self) -> Option<WeaponKind> {
        match self.effect {
            Some(CardEffect::Weapon { kind, .. }) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_firearm(&self) -> bool {
        matches!(self.weapon_kind(), Some(WeaponKind::Firearm))
    }

    #[must_use]
    pub fn is_weapon(&self) -> bool {
        matches!(
            self.effect,
            Some(CardEffect::Weapon { .. } | CardEffect::ConditionalWeapon { .. })
        )
    }

    #[must_use]
    pub fn upgrade_kind(&self) -> Option<UpgradeKind> {
        match self.effect {
            Some(CardEffect::Upgrade(kind)) => Some(kind),
            _ => None,
        }
    }

    /// Persistent upgrades stay equipped when "played" and unwind their
    /// effects when sold or discarded.
    #[must_use]
    pub fn is_persistent_upgrade(&self) -> bool {
        matches!(self.kind, CardKind::Upgrade) && self.upgrade_kind().is_some()
    }

    /// Valuables (nuggets, jewelry) are inert items: sell value, no effect.
    #[must_use]
    pub fn is_valuable(&self) -> bool {
        matches!(self.kind, CardKind::Item) && self.effect.is_none() && self.sell_value > 0
    }

    /// Fixed ordering used whenever a hand is sorted: upgrades, weapons,
    /// provisions, actions, trophies, everything else.
    #[must_use]
    pub fn hand_sort_rank(&self) -> u8 {
        if matches!(self.kind, CardKind::Upgrade) {
            1
        } else if self.is_weapon() {
            2
        } else if matches!(self.kind, CardKind::Provision) {
            3
        } else if matches!(self.kind, CardKind::Action) {
            4
        } else if matches!(self.kind, CardKind::Trophy | CardKind::BountyProof) {
            5
        } else {
            6
        }
    }

    /// Whether an active event locks down buying, selling, and restocking.
    ///
    /// Small animals, nocturnal animals, and illnesses never block trade;
    /// environmental events only block while they deal direct damage or tear
    /// gear off. Anything else with teeth (damage, theft, or plain health
    /// left to fight) does.
    #[must_use]
    pub fn is_hostile_event(&self) -> bool {
        if !self.is_threat() {
            return false;
        }
        if self.is_animal() && (self.health.unwrap_or(0) <= SMALL_ANIMAL_MAX_HEALTH || self.nocturnal)
        {
            return false;
        }
        if matches!(self.threat, Some(ThreatKind::Illness)) {
            return false;
        }
        if matches!(self.threat, Some(ThreatKind::Environmental)) {
            return matches!(
                self.effect,
                Some(
                    CardEffect::Damage { amount: 1.., .. }
                        | CardEffect::DamagePercent { .. }
                        | CardEffect::Damage {
                            strips_gear: true,
                            ..
                        }
                )
            );
        }
        match self.effect {
            Some(CardEffect::Damage { amount, .. }) if amount > 0 => return true,
            Some(CardEffect::Poison { damage }) if damage > 0 => return true,
            Some(CardEffect::DamagePercent { fraction }) if fraction > 0.0 => return true,
            _ => {}
        }
        if matches!(self.on_reveal, Some(OnReveal::StealGold { max }) if max > 0) {
            return true;
        }
        self.health.unwrap_or(0) > 0
    }

    /// Flat damage this threat deals when it attacks.
    #[must_use]
    pub fn attack_damage(&self) -> i32 {
        match self.effect {
            Some(CardEffect::Damage { amount, .. }) => amount,
            Some(CardEffect::Poison { damage }) => damage,
            _ => 0,
        }
    }
}

/// Mint the trophy (animals) or bounty proof (humans) for a defeated threat.
/// The serial keeps minted ids unique within a run.
#[must_use]
pub fn make_trophy(threat: &Card, serial: u32) -> Card {
    let (name, kind, desc) = match threat.threat {
        Some(ThreatKind::Animal) => (
            format!("{} Pelt", threat.name),
            CardKind::Trophy,
            format!("The pelt of a defeated {}.", threat.name),
        ),
        Some(ThreatKind::Human) => (
            format!("{} Bounty", threat.name),
            CardKind::BountyProof,
            format!("Proof of bounty on the notorious {}.", threat.name),
        ),
        _ => (
            format!("{} Remnants", threat.name),
            CardKind::Trophy,
            format!("A strange token of the vanquished {}.", threat.name),
        ),
    };
    Card {
        id: format!("trophy_{}_{serial}", threat.id),
        name,
        kind,
        threat: None,
        health: None,
        gold_value: None,
        effect: None,
        on_reveal: None,
        sell_value: threat.gold_value.unwrap_or(0),
        buy_cost: 0,
        nocturnal: false,
        herbal: false,
        immovable: false,
        desc,
    }
}
