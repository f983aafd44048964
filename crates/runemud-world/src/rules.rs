//! Game rules: modifiers, progression tables, and text helpers shared by
//! the command handlers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RulesConfig
// ---------------------------------------------------------------------------

/// Timing and capacity knobs for the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Fatigue, regeneration, and monster attack interval.
    #[serde(with = "millis")]
    pub action_interval: Duration,

    /// How long an emptied lair stays empty after its last kill.
    #[serde(with = "millis")]
    pub lair_respawn: Duration,

    /// Items a room's floor can hold.
    pub max_floor_items: usize,

    /// The gong summons nothing once this many monsters are alive.
    pub max_gong_monsters: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            action_interval: Duration::from_secs(6),
            lair_respawn: Duration::from_secs(60),
            max_floor_items: 10,
            max_gong_monsters: 9,
        }
    }
}

/// Serializes a `Duration` as whole milliseconds.
pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

pub const MAX_LEVEL: u32 = 20;

/// Experience needed to reach each level; index 0 is unused.
const XP_THRESHOLDS: [u64; 21] = [
    0, 0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000,
    85_000, 100_000, 120_000, 140_000, 165_000, 195_000, 225_000, 265_000,
    305_000, 355_000,
];

/// Experience awarded for a kill, by challenge rating.
const CHALLENGE_XP: [u64; 32] = [
    25, 50, 100, 150, 200, 450, 700, 1_100, 1_800, 2_300, 2_900, 3_900,
    5_000, 5_900, 7_200, 8_400, 10_000, 11_500, 13_500, 15_000, 18_000,
    20_000, 22_000, 25_000, 33_000, 41_000, 50_000, 62_000, 75_000, 90_000,
    105_000, 120_000,
];

/// `(score - 10) / 2`, rounded toward negative infinity.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Proficiency bonus for a character level or monster challenge rating.
pub fn proficiency_for_level(level: u32) -> i32 {
    match level {
        0 => 1,
        l => 2 + (l.min(MAX_LEVEL) as i32 - 1) / 4,
    }
}

/// Experience required to reach `level`, if that level exists.
pub fn xp_threshold(level: u32) -> Option<u64> {
    XP_THRESHOLDS.get(level as usize).copied().filter(|_| level > 0)
}

/// Whether a character at `level` with `xp` may train to the next level.
pub fn ready_to_level(level: u32, xp: u64) -> bool {
    level < MAX_LEVEL
        && xp_threshold(level + 1).is_some_and(|needed| xp >= needed)
}

pub fn challenge_xp(challenge: usize) -> u64 {
    CHALLENGE_XP[challenge.min(CHALLENGE_XP.len() - 1)]
}

/// Experience for dealing `damage` to a creature of the given challenge
/// and maximum hit points.
pub fn xp_for_damage(challenge: usize, target_max_hp: i32, damage: i32) -> u64 {
    let per_point = challenge_xp(challenge) / target_max_hp.max(1) as u64;
    per_point * damage.max(0) as u64
}

/// Highest spell level a caster of `level` can learn.
pub fn max_spell_level(level: u32) -> u32 {
    level.div_ceil(2).min(9)
}

/// Price of training from `level` to the next.
pub fn training_cost(level: u32, price: u64) -> u64 {
    u64::from(level) * u64::from(level) * price
}

/// Pounds a character with this strength can carry.
pub fn encumbrance_limit(strength: i32) -> u32 {
    strength.max(0) as u32 * 15
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Formats copper coins as platinum, gold, silver, and copper.
///
/// ```
/// use runemud_world::rules::format_coins;
///
/// assert_eq!(format_coins(1234), "1p 2g 3s 4c");
/// assert_eq!(format_coins(50), "5s");
/// ```
pub fn format_coins(copper: u64) -> String {
    if copper == 0 {
        return "0c".to_string();
    }
    let parts = [
        (copper / 1000, 'p'),
        (copper / 100 % 10, 'g'),
        (copper / 10 % 10, 's'),
        (copper % 10, 'c'),
    ];
    parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Describes a wounded creature by its remaining share of hit points.
pub fn health_status(hp: i32, max_hp: i32) -> &'static str {
    let percent = hp.max(0) * 100 / max_hp.max(1);
    match percent {
        p if p > 85 => "in good physical health",
        p if p > 60 => "lightly wounded",
        p if p > 40 => "wounded",
        p if p > 25 => "moderately wounded",
        _ => "severely wounded",
    }
}

/// `"a"` or `"an"` for a noun.
pub fn article(noun: &str) -> &'static str {
    match noun.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Joins nouns into prose: `a torch`, `a torch and an axe`,
/// `a torch, a rope and an axe`.
pub fn list_phrase<S: AsRef<str>>(nouns: &[S]) -> String {
    let words: Vec<String> = nouns
        .iter()
        .map(|n| format!("{} {}", article(n.as_ref()), n.as_ref()))
        .collect();
    match words.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Case-insensitive substring match used to resolve item, monster, and
/// spell names typed by players.
pub fn name_matches(name: &str, query: &str) -> bool {
    let query = query.trim();
    !query.is_empty() && name.to_lowercase().contains(&query.to_lowercase())
}

/// The final word of a name, lower-cased (`"goblin archer"` -> `"archer"`).
pub fn last_word(name: &str) -> String {
    name.split_whitespace()
        .last()
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifier_rounds_down() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(15), 2);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(3), -4);
    }

    #[test]
    fn test_proficiency_for_level_steps_every_four() {
        assert_eq!(proficiency_for_level(1), 2);
        assert_eq!(proficiency_for_level(4), 2);
        assert_eq!(proficiency_for_level(5), 3);
        assert_eq!(proficiency_for_level(12), 4);
        assert_eq!(proficiency_for_level(13), 5);
        assert_eq!(proficiency_for_level(20), 6);
        assert_eq!(proficiency_for_level(0), 1);
    }

    #[test]
    fn test_ready_to_level_uses_next_threshold() {
        assert!(!ready_to_level(1, 299));
        assert!(ready_to_level(1, 300));
        assert!(ready_to_level(4, 6_500));
        assert!(!ready_to_level(MAX_LEVEL, u64::MAX));
    }

    #[test]
    fn test_xp_for_damage_scales_with_damage() {
        // 100 xp over 10 hp is 10 per point.
        assert_eq!(xp_for_damage(2, 10, 4), 40);
        assert_eq!(xp_for_damage(0, 0, 1), 25);
        assert_eq!(xp_for_damage(99, 1, 1), 120_000);
    }

    #[test]
    fn test_format_coins_skips_empty_denominations() {
        assert_eq!(format_coins(0), "0c");
        assert_eq!(format_coins(7), "7c");
        assert_eq!(format_coins(1005), "1p 5c");
        assert_eq!(format_coins(23_400), "23p 4g");
    }

    #[test]
    fn test_health_status_bands() {
        assert_eq!(health_status(10, 10), "in good physical health");
        assert_eq!(health_status(7, 10), "lightly wounded");
        assert_eq!(health_status(5, 10), "wounded");
        assert_eq!(health_status(3, 10), "moderately wounded");
        assert_eq!(health_status(1, 10), "severely wounded");
        assert_eq!(health_status(-4, 10), "severely wounded");
    }

    #[test]
    fn test_list_phrase_joins_with_articles() {
        assert_eq!(list_phrase::<&str>(&[]), "");
        assert_eq!(list_phrase(&["torch"]), "a torch");
        assert_eq!(list_phrase(&["torch", "axe"]), "a torch and an axe");
        assert_eq!(
            list_phrase(&["torch", "rope", "iron key"]),
            "a torch, a rope and an iron key"
        );
    }

    #[test]
    fn test_name_matches_is_case_insensitive_substring() {
        assert!(name_matches("Giant Rat", "rat"));
        assert!(name_matches("longsword", "SWORD"));
        assert!(!name_matches("longsword", "axe"));
        assert!(!name_matches("longsword", "  "));
    }

    #[test]
    fn test_last_word_lowercases() {
        assert_eq!(last_word("Goblin Archer"), "archer");
        assert_eq!(last_word("rat"), "rat");
        assert_eq!(last_word(""), "");
    }

    #[test]
    fn test_training_cost_is_level_squared() {
        assert_eq!(training_cost(1, 100), 100);
        assert_eq!(training_cost(3, 100), 900);
    }

    #[test]
    fn test_max_spell_level_rounds_up() {
        assert_eq!(max_spell_level(1), 1);
        assert_eq!(max_spell_level(2), 1);
        assert_eq!(max_spell_level(3), 2);
        assert_eq!(max_spell_level(20), 9);
    }

    #[test]
    fn test_rules_config_parses_millis() {
        let cfg: RulesConfig =
            serde_json::from_str(r#"{"action_interval": 1500}"#).unwrap();
        assert_eq!(cfg.action_interval, Duration::from_millis(1500));
        assert_eq!(cfg.lair_respawn, Duration::from_secs(60));
        assert_eq!(cfg.max_floor_items, 10);
    }
}
