//! Procedural naming from per-culture word banks
//!
//! Each culture points at a name base (a bank of onset/middle/ending
//! fragments); cultures, states, burgs and rivers draw from their base so
//! names inside one culture sound related.

use rand::seq::SliceRandom;
use rand::Rng;

/// A bank of name fragments with a loose phonetic flavor.
pub struct NameBase {
    pub name: &'static str,
    onsets: &'static [&'static str],
    middles: &'static [&'static str],
    endings: &'static [&'static str],
}

/// Base used before cultures exist (river naming runs in the hydrology
/// stage) and by the wildlands sentinel.
pub const GENERIC_BASE: usize = 0;

pub const NAME_BASES: &[NameBase] = &[
    NameBase {
        name: "Common",
        onsets: &["Al", "Ber", "Cal", "Dor", "El", "Fen", "Gal", "Hol", "Kar", "Lor", "Mar", "Nor", "Ther", "Wol"],
        middles: &["an", "en", "ar", "or", "il", "ad", "eth", "im"],
        endings: &["ia", "or", "heim", "wick", "mark", "dale", "ford", "ton"],
    },
    NameBase {
        name: "Northern",
        onsets: &["Bjor", "Frost", "Grim", "Hald", "Ing", "Jor", "Skel", "Thru", "Ulf", "Vard"],
        middles: &["al", "un", "ek", "ir", "og"],
        endings: &["gard", "fjell", "vik", "stad", "heim", "nes"],
    },
    NameBase {
        name: "Desert",
        onsets: &["Ah", "Bas", "Dja", "Kha", "Mir", "Nas", "Qar", "Sab", "Zul"],
        middles: &["ar", "im", "ud", "an", "esh"],
        endings: &["abad", "um", "ir", "esh", "ara", "aq"],
    },
    NameBase {
        name: "Sylvan",
        onsets: &["Ael", "Cael", "Elu", "Fae", "Ith", "Lia", "Myr", "Syl", "Thal"],
        middles: &["ae", "ion", "il", "en", "ys"],
        endings: &["iel", "anor", "wyn", "las", "ivar", "ien"],
    },
    NameBase {
        name: "Steppe",
        onsets: &["Bat", "Chag", "Dzun", "Khal", "Nog", "Ord", "Tem", "Ulan"],
        middles: &["ga", "ta", "un", "or"],
        endings: &["ai", "khan", "gol", "tai", "un"],
    },
    NameBase {
        name: "Maritime",
        onsets: &["Bre", "Cor", "Del", "Mar", "Nav", "Pel", "Sal", "Tir", "Vel"],
        middles: &["a", "e", "is", "on"],
        endings: &["mare", "port", "via", "sund", "mer", "tide"],
    },
];

const WAR_ADJECTIVES: &[&str] = &[
    "Broken", "Silent", "Bitter", "Long", "Red", "Iron", "Salt", "Ash",
    "Winter", "Crimson", "Shattered", "Forgotten",
];

const WAR_OBJECTS: &[&str] = &[
    "Crown", "River", "Border", "Throne", "Harvest", "Banner", "Gate",
    "Pass", "Shore", "Oath",
];

/// Generate a name from a base: onset, optional middle, ending.
pub fn base_name<R: Rng>(base: usize, rng: &mut R) -> String {
    let bank = &NAME_BASES[base % NAME_BASES.len()];
    let mut name = String::new();
    name.push_str(pick(bank.onsets, rng));
    if rng.gen_bool(0.4) {
        name.push_str(pick(bank.middles, rng));
    }
    name.push_str(pick(bank.endings, rng));
    name
}

/// Name a historical conflict, e.g. "War of the Broken Crown".
pub fn war_name<R: Rng>(rng: &mut R) -> String {
    if rng.gen_bool(0.5) {
        format!("War of the {} {}", pick(WAR_ADJECTIVES, rng), pick(WAR_OBJECTS, rng))
    } else {
        format!("{} War", pick(WAR_ADJECTIVES, rng))
    }
}

fn pick<'a, R: Rng>(bank: &'a [&'static str], rng: &mut R) -> &'a str {
    bank.choose(rng).copied().unwrap_or("")
}
