//! Per-run deck assembly: event deck, player-deck augmentation, and store
//! stock, sampled from the scaled catalog under category quotas.
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use crate::card::Card;
use crate::catalog::Catalog;
use crate::characters;
use crate::state::{EVENT_DECK_SIZE, PLAYER_DECK_TARGET_SIZE, STORE_DECK_TARGET_SIZE, STORE_DISPLAY_LIMIT};

const EVENT_ANIMAL_QUOTA: usize = 8;
const EVENT_HUMAN_QUOTA: usize = 7;
const EVENT_AFFLICTION_QUOTA: usize = 2;
const EVENT_VALUABLE_MAX: usize = 3;
const PLAYER_VALUABLE_MAX: usize = 2;
const STARTER_DECK_SIZE: usize = 4;

/// Cards a character's starter list pads out to when the catalog runs dry.
pub const FILLER_SEQUENCE: [&str; 3] = ["provision_hardtack", "provision_dried_meat", "item_knife_t1"];

#[derive(Debug, Clone, PartialEq)]
pub struct DeckSet {
    pub event_deck: Vec<Card>,
    /// Cards that join the chosen character's starters in the player deck.
    pub augmentation: Vec<Card>,
    pub store_deck: Vec<Card>,
    pub store_display: Vec<Option<Card>>,
}

/// Remove every card matching the predicate from the pool.
fn drain_matching(pool: &mut Vec<Card>, pred: impl Fn(&Card) -> bool) -> Vec<Card> {
    let mut matched = Vec::new();
    let mut rest = Vec::with_capacity(pool.len());
    for card in pool.drain(..) {
        if pred(&card) {
            matched.push(card);
        } else {
            rest.push(card);
        }
    }
    *pool = rest;
    matched
}

/// Pick `count` cards from the matching slice of the pool. On a first run
/// the threat pools are ordered easiest-first so the quota favors easy
/// fights; on later runs they are shuffled flat. Unpicked cards return to
/// the pool.
fn pick_quota(
    pool: &mut Vec<Card>,
    count: usize,
    easy_bias: bool,
    rng: &mut ChaCha20Rng,
    pred: impl Fn(&Card) -> bool,
) -> Vec<Card> {
    let mut matched = drain_matching(pool, pred);
    if easy_bias {
        matched.sort_by_key(|c| (c.health.unwrap_or(0), c.id.clone()));
    } else {
        matched.shuffle(rng);
    }
    let keep = count.min(matched.len());
    let rest = matched.split_off(keep);
    pool.extend(rest);
    matched
}

/// Assemble the run's decks from the scaled catalog. The boss and every
/// character's starter cards never enter the sampling pools: the boss is
/// placed separately and starters are guaranteed by selection. No card id
/// lands in more than one deck.
#[must_use]
pub fn build_decks(
    catalog: &Catalog,
    boss_id: Option<&str>,
    ng_plus: u32,
    rng: &mut ChaCha20Rng,
) -> DeckSet {
    let starter_ids = characters::all_starter_ids();
    let mut pool: Vec<Card> = catalog
        .cards()
        .filter(|c| boss_id != Some(c.id.as_str()) && !starter_ids.contains(&c.id))
        .cloned()
        .collect();

    let easy_bias = ng_plus == 0;
    let mut event_deck = Vec::with_capacity(EVENT_DECK_SIZE);
    event_deck.extend(pick_quota(&mut pool, EVENT_ANIMAL_QUOTA, easy_bias, rng, Card::is_animal));
    event_deck.extend(pick_quota(&mut pool, EVENT_HUMAN_QUOTA, easy_bias, rng, Card::is_human));
    event_deck.extend(pick_quota(
        &mut pool,
        EVENT_AFFLICTION_QUOTA,
        false,
        rng,
        Card::forces_day_end,
    ));
    let event_valuables = rng.random_range(0..=EVENT_VALUABLE_MAX);
    event_deck.extend(pick_quota(&mut pool, event_valuables, false, rng, Card::is_valuable));
    let filler_needed = EVENT_DECK_SIZE.saturating_sub(event_deck.len());
    event_deck.extend(pick_quota(&mut pool, filler_needed, false, rng, |c| {
        !c.is_threat() && !c.is_valuable()
    }));
    event_deck.truncate(EVENT_DECK_SIZE);
    event_deck.shuffle(rng);

    let augmentation_target = PLAYER_DECK_TARGET_SIZE - STARTER_DECK_SIZE;
    let mut augmentation = Vec::with_capacity(augmentation_target);
    let player_valuables = rng.random_range(0..=PLAYER_VALUABLE_MAX);
    augmentation.extend(pick_quota(&mut pool, player_valuables, false, rng, Card::is_valuable));
    let items_needed = augmentation_target.saturating_sub(augmentation.len());
    augmentation.extend(pick_quota(&mut pool, items_needed, false, rng, |c| {
        !c.is_threat() && !c.is_valuable()
    }));

    let mut store_deck = drain_matching(&mut pool, |c| {
        !c.is_threat() && !c.is_valuable() && c.buy_cost > 0
    });
    store_deck.shuffle(rng);
    store_deck.truncate(STORE_DECK_TARGET_SIZE);
    let mut store_display: Vec<Option<Card>> = Vec::with_capacity(STORE_DISPLAY_LIMIT);
    for _ in 0..STORE_DISPLAY_LIMIT {
        store_display.push(store_deck.pop());
    }

    DeckSet {
        event_deck,
        augmentation,
        store_deck,
        store_display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn build(seed: u64, ng_plus: u32) -> DeckSet {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        build_decks(Catalog::base(), None, ng_plus, &mut rng)
    }

    fn all_ids(decks: &DeckSet) -> Vec<&str> {
        decks
            .event_deck
            .iter()
            .chain(decks.augmentation.iter())
            .chain(decks.store_deck.iter())
            .chain(decks.store_display.iter().flatten())
            .map(|c| c.id.as_str())
            .collect()
    }

    #[test]
    fn event_deck_meets_quotas_and_size() {
        for seed in 0..8 {
            let decks = build(seed, 0);
            assert_eq!(decks.event_deck.len(), EVENT_DECK_SIZE, "seed {seed}");
            let animals = decks.event_deck.iter().filter(|c| c.is_animal()).count();
            let humans = decks.event_deck.iter().filter(|c| c.is_human()).count();
            let afflictions = decks
                .event_deck
                .iter()
                .filter(|c| c.forces_day_end())
                .count();
            assert_eq!(animals, EVENT_ANIMAL_QUOTA, "seed {seed}");
            assert_eq!(humans, EVENT_HUMAN_QUOTA, "seed {seed}");
            assert_eq!(afflictions, EVENT_AFFLICTION_QUOTA, "seed {seed}");
        }
    }

    #[test]
    fn no_card_id_appears_in_two_decks() {
        for seed in 0..8 {
            let decks = build(seed, 0);
            let ids = all_ids(&decks);
            let unique: BTreeSet<_> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len(), "duplicate id at seed {seed}");
        }
    }

    #[test]
    fn starters_and_boss_never_sampled() {
        let starter_ids = characters::all_starter_ids();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let decks = build_decks(Catalog::base(), Some("threat_grizzly_bear_t1"), 0, &mut rng);
        for id in all_ids(&decks) {
            assert!(!starter_ids.contains(id), "starter {id} was sampled");
            assert_ne!(id, "threat_grizzly_bear_t1");
        }
    }

    #[test]
    fn first_run_biases_toward_easy_animals() {
        let base = Catalog::base();
        let mut healths: Vec<i32> = base
            .cards()
            .filter(|c| c.is_animal() && !characters::all_starter_ids().contains(&c.id))
            .map(|c| c.health.unwrap_or(0))
            .collect();
        healths.sort_unstable();
        let expected: Vec<i32> = healths.into_iter().take(EVENT_ANIMAL_QUOTA).collect();

        let decks = build(3, 0);
        let mut picked: Vec<i32> = decks
            .event_deck
            .iter()
            .filter(|c| c.is_animal())
            .map(|c| c.health.unwrap_or(0))
            .collect();
        picked.sort_unstable();
        assert_eq!(picked, expected);
    }

    #[test]
    fn later_runs_shuffle_the_threat_pools() {
        // With a flat shuffle the easy-bias multiset should not come back
        // for every seed; one differing seed is enough.
        let base = Catalog::base();
        let mut healths: Vec<i32> = base
            .cards()
            .filter(|c| c.is_animal() && !characters::all_starter_ids().contains(&c.id))
            .map(|c| c.health.unwrap_or(0))
            .collect();
        healths.sort_unstable();
        let easiest: Vec<i32> = healths.into_iter().take(EVENT_ANIMAL_QUOTA).collect();

        let diverged = (0..16).any(|seed| {
            let decks = build(seed, 1);
            let mut picked: Vec<i32> = decks
                .event_deck
                .iter()
                .filter(|c| c.is_animal())
                .map(|c| c.health.unwrap_or(0))
                .collect();
            picked.sort_unstable();
            picked != easiest
        });
        assert!(diverged, "shuffled pools never diverged from the easy pick");
    }

    #[test]
    fn store_stock_is_purchasable_and_displayed() {
        let decks = build(7, 0);
        assert_eq!(decks.store_display.len(), STORE_DISPLAY_LIMIT);
        for card in decks.store_deck.iter().chain(decks.store_display.iter().flatten()) {
            assert!(card.buy_cost > 0, "{} not purchasable", card.id);
            assert!(!card.is_threat());
            assert!(!card.is_valuable());
        }
    }

    #[test]
    fn augmentation_fills_toward_target() {
        let decks = build(9, 0);
        assert!(decks.augmentation.len() <= PLAYER_DECK_TARGET_SIZE - STARTER_DECK_SIZE);
        assert!(!decks.augmentation.is_empty());
        for card in &decks.augmentation {
            assert!(!card.is_threat());
        }
    }

    #[test]
    fn filler_sequence_resolves_against_catalog() {
        for id in FILLER_SEQUENCE {
            assert!(Catalog::base().contains(id), "{id} missing");
        }
    }
}
