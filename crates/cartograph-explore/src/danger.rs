//! Additive hazard scoring for scanned cells.
//!
//! Each rule adds points to a running total; the total is mapped to a level
//! with `clamp(round(total / 20), 1, 10)`. Rules are evaluated in a fixed
//! order:
//!
//! 1. spawners: `spawner_weight x count`, labels `"spawner"`
//! 2. hazardous biome marker in the biome name: `hazardous_biome_weight`,
//!    labels `"hazardous biome"`
//! 3. moderate-risk biome: `moderate_biome_weight`, never labels
//! 4. more lava than `lava_threshold`: `lava_weight x lava`, labels `"lava"`
//!
//! A labelling rule takes the primary-threat label when its contribution is
//! at least the contribution of the rule currently holding it, so on a tie
//! the later rule wins.

use cartograph_types::{DangerZone, ExploredArea, ResourceClass};
use serde::{Deserialize, Serialize};

use crate::resource::{LAVA_BLOCK, ResourceTable};

/// Label for cells dominated by mob spawners.
pub const THREAT_SPAWNER: &str = "spawner";

/// Label for cells in a hazardous biome.
pub const THREAT_HAZARDOUS_BIOME: &str = "hazardous biome";

/// Label for cells with significant lava.
pub const THREAT_LAVA: &str = "lava";

/// Label when no labelling rule fired.
pub const THREAT_UNKNOWN: &str = "unknown";

/// Points per level step.
const POINTS_PER_LEVEL: u64 = 20;

/// Weights and biome lists driving the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerRules {
    /// Points per spawner-class resource.
    pub spawner_weight: u32,
    /// Substrings that mark a biome as hazardous.
    pub hazardous_biome_markers: Vec<String>,
    /// Points for a hazardous biome.
    pub hazardous_biome_weight: u32,
    /// Biomes (with or without the `minecraft:` namespace) of moderate risk.
    pub moderate_biomes: Vec<String>,
    /// Points for a moderate-risk biome.
    pub moderate_biome_weight: u32,
    /// Lava blocks tolerated before the lava rule applies.
    pub lava_threshold: u32,
    /// Points per lava block once over the threshold.
    pub lava_weight: u32,
    /// Zones at or below this level are not stored.
    pub min_stored_level: u8,
}

impl Default for DangerRules {
    fn default() -> Self {
        Self {
            spawner_weight: 50,
            hazardous_biome_markers: ["deep_dark", "nether", "soul_sand", "basalt"]
                .map(String::from)
                .to_vec(),
            hazardous_biome_weight: 100,
            moderate_biomes: ["swamp", "mangrove_swamp", "dark_forest", "badlands"]
                .map(String::from)
                .to_vec(),
            moderate_biome_weight: 20,
            lava_threshold: 5,
            lava_weight: 2,
            min_stored_level: 3,
        }
    }
}

/// Applies [`DangerRules`] to explored areas.
#[derive(Debug, Clone, Copy)]
pub struct DangerScorer<'a> {
    rules: &'a DangerRules,
    table: &'a ResourceTable,
}

impl<'a> DangerScorer<'a> {
    /// Create a scorer.
    pub const fn new(rules: &'a DangerRules, table: &'a ResourceTable) -> Self {
        Self { rules, table }
    }

    /// Score a cell. Always returns a zone with `level` in `1..=10`.
    pub fn score(&self, area: &ExploredArea) -> DangerZone {
        let mut total: u64 = 0;
        let mut label = ThreatLabel::default();

        let spawners = area
            .resources
            .iter()
            .filter(|r| self.table.is_class(&r.resource_type, ResourceClass::Spawner))
            .count();
        if spawners > 0 {
            let count = u64::try_from(spawners).unwrap_or(u64::MAX);
            let points = u64::from(self.rules.spawner_weight).saturating_mul(count);
            total = total.saturating_add(points);
            label.offer(THREAT_SPAWNER, points);
        }

        if self
            .rules
            .hazardous_biome_markers
            .iter()
            .any(|marker| area.biome.contains(marker.as_str()))
        {
            let points = u64::from(self.rules.hazardous_biome_weight);
            total = total.saturating_add(points);
            label.offer(THREAT_HAZARDOUS_BIOME, points);
        }

        if self
            .rules
            .moderate_biomes
            .iter()
            .any(|biome| biome_matches(&area.biome, biome))
        {
            total = total.saturating_add(u64::from(self.rules.moderate_biome_weight));
        }

        let lava = area.block_count(LAVA_BLOCK);
        if lava > self.rules.lava_threshold {
            let points = u64::from(self.rules.lava_weight).saturating_mul(u64::from(lava));
            total = total.saturating_add(points);
            label.offer(THREAT_LAVA, points);
        }

        DangerZone {
            coordinate: area.coordinate,
            level: level_for(total),
            primary_threat: label.name.unwrap_or(THREAT_UNKNOWN).to_owned(),
            active: true,
        }
    }

    /// Whether a zone is dangerous enough to be stored.
    pub const fn is_notable(&self, zone: &DangerZone) -> bool {
        zone.level > self.rules.min_stored_level
    }

    /// Score a cell and keep the zone only if it is notable.
    pub fn assess(&self, area: &ExploredArea) -> Option<DangerZone> {
        let zone = self.score(area);
        self.is_notable(&zone).then_some(zone)
    }
}

/// The label currently winning, with the points that won it.
#[derive(Debug, Default)]
struct ThreatLabel {
    name: Option<&'static str>,
    points: u64,
}

impl ThreatLabel {
    fn offer(&mut self, name: &'static str, points: u64) {
        if self.name.is_none() || points >= self.points {
            self.name = Some(name);
            self.points = points;
        }
    }
}

/// `clamp(round(total / 20), 1, 10)`, rounding halves up.
fn level_for(total: u64) -> u8 {
    let rounded = total.saturating_add(POINTS_PER_LEVEL / 2) / POINTS_PER_LEVEL;
    u8::try_from(rounded.clamp(1, 10)).unwrap_or(10)
}

fn biome_matches(biome: &str, listed: &str) -> bool {
    biome == listed || biome.strip_prefix("minecraft:") == Some(listed)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cartograph_types::{BlockPos, CellCoordinate, ResourceLocation};
    use chrono::Utc;

    use super::*;

    fn area(biome: &str, spawners: usize, lava: u32) -> ExploredArea {
        let resources = (0..spawners)
            .map(|i| ResourceLocation {
                position: BlockPos::new(i32::try_from(i).unwrap_or(0), 10, 0),
                resource_type: "minecraft:spawner".to_owned(),
                value: 200,
                discovered: Utc::now(),
                extracted: false,
            })
            .collect();
        let mut block_histogram = BTreeMap::new();
        if lava > 0 {
            block_histogram.insert(LAVA_BLOCK.to_owned(), lava);
        }
        ExploredArea {
            coordinate: CellCoordinate::new(0, 0),
            biome: biome.to_owned(),
            block_histogram,
            resources,
            has_water: false,
            has_lava: lava > 0,
            structure_hints: BTreeMap::new(),
            scanned_at: Utc::now(),
        }
    }

    fn score(area: &ExploredArea) -> DangerZone {
        let rules = DangerRules::default();
        DangerScorer::new(&rules, ResourceTable::standard()).score(area)
    }

    #[test]
    fn quiet_cell_is_level_one() {
        let zone = score(&area("minecraft:plains", 0, 0));
        assert_eq!(zone.level, 1);
        assert_eq!(zone.primary_threat, THREAT_UNKNOWN);
    }

    #[test]
    fn two_spawners_score_level_five() {
        let zone = score(&area("minecraft:plains", 2, 0));
        assert_eq!(zone.level, 5);
        assert_eq!(zone.primary_threat, THREAT_SPAWNER);
    }

    #[test]
    fn hazardous_biome_overrides_single_spawner() {
        let zone = score(&area("minecraft:deep_dark", 1, 0));
        // 50 + 100 = 150 -> 7.5 -> 8
        assert_eq!(zone.level, 8);
        assert_eq!(zone.primary_threat, THREAT_HAZARDOUS_BIOME);
    }

    #[test]
    fn stronger_spawner_contribution_keeps_label() {
        let zone = score(&area("minecraft:deep_dark", 3, 0));
        assert_eq!(zone.primary_threat, THREAT_SPAWNER);
        assert_eq!(zone.level, 10);
    }

    #[test]
    fn later_rule_wins_ties() {
        // spawner 2 x 50 = 100, lava 50 x 2 = 100: lava evaluated last.
        let zone = score(&area("minecraft:plains", 2, 50));
        assert_eq!(zone.primary_threat, THREAT_LAVA);
    }

    #[test]
    fn lava_below_threshold_is_ignored() {
        let zone = score(&area("minecraft:plains", 0, 5));
        assert_eq!(zone.level, 1);
        assert_eq!(zone.primary_threat, THREAT_UNKNOWN);
    }

    #[test]
    fn moderate_biome_adds_without_labelling() {
        let zone = score(&area("minecraft:swamp", 2, 0));
        // 100 + 20 = 120 -> 6
        assert_eq!(zone.level, 6);
        assert_eq!(zone.primary_threat, THREAT_SPAWNER);
    }

    #[test]
    fn level_is_always_clamped() {
        for spawners in [0, 1, 5, 40] {
            for lava in [0, 6, 1_000, u32::MAX] {
                for biome in ["minecraft:plains", "minecraft:nether_wastes", "minecraft:swamp"] {
                    let zone = score(&area(biome, spawners, lava));
                    assert!((1..=10).contains(&zone.level), "level {}", zone.level);
                }
            }
        }
    }

    #[test]
    fn only_levels_above_three_are_notable() {
        let rules = DangerRules::default();
        let scorer = DangerScorer::new(&rules, ResourceTable::standard());
        assert!(scorer.assess(&area("minecraft:plains", 1, 0)).is_none());
        // 70 points -> 3.5 -> 4
        assert!(scorer.assess(&area("minecraft:plains", 1, 10)).is_some());
    }

    #[test]
    fn rules_deserialize_with_defaults() {
        let rules: DangerRules = serde_json::from_str(r#"{"lava_threshold": 12}"#).unwrap_or_default();
        assert_eq!(rules.lava_threshold, 12);
        assert_eq!(rules.spawner_weight, 50);
    }
}
