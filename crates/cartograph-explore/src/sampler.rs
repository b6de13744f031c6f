//! The world-sampling collaborator and a deterministic stand-in.
//!
//! [`WorldSampler`] is the read-only boundary to whatever hosts the world
//! (a game server, a region-file reader, a test fixture). The scanner only
//! ever asks three questions: which block is at a position, which biome is
//! at a position, and how tall the world is.
//!
//! [`SeededTerrain`] answers those questions from a seed alone. It is used
//! by the engine's offline mode and by tests; it makes no attempt to look
//! like real terrain beyond layering (bedrock, stone, dirt, surface, water)
//! and sprinkling ores, lava pockets, and the occasional dungeon.

use std::future::Future;

use cartograph_types::{BlockPos, CellCoordinate};

/// Errors a world sampler can report.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// The position is not currently loaded.
    #[error("position {0} is not loaded")]
    Unloaded(BlockPos),

    /// The sampler cannot answer at all.
    #[error("world sampler unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to world terrain.
///
/// Calls may suspend (the host may need to load data), so queries return
/// futures. Implementations must be shareable across concurrent scans.
pub trait WorldSampler: Send + Sync {
    /// Block type identifier at `pos`, e.g. `minecraft:stone`.
    fn block_at(&self, pos: BlockPos) -> impl Future<Output = Result<String, SampleError>> + Send;

    /// Biome identifier at `pos`, e.g. `minecraft:plains`.
    fn biome_at(&self, pos: BlockPos) -> impl Future<Output = Result<String, SampleError>> + Send;

    /// Inclusive minimum and exclusive maximum build height.
    fn build_height_range(&self) -> (i32, i32);
}

/// Default sea level for [`SeededTerrain`].
const SEA_LEVEL: i32 = 62;

/// One in this many cells holds a dungeon (spawner plus chest).
const DUNGEON_RARITY: u64 = 24;

/// Biomes handed out per cell by [`SeededTerrain`].
const BIOMES: [&str; 8] = [
    "minecraft:plains",
    "minecraft:forest",
    "minecraft:desert",
    "minecraft:taiga",
    "minecraft:swamp",
    "minecraft:dark_forest",
    "minecraft:savanna",
    "minecraft:deep_dark",
];

/// Seed-driven synthetic terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededTerrain {
    seed: u64,
    min_y: i32,
    max_y: i32,
    sea_level: i32,
}

impl SeededTerrain {
    /// Terrain with the modern overworld height range (`-64..320`).
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            min_y: -64,
            max_y: 320,
            sea_level: SEA_LEVEL,
        }
    }

    /// Override the build height range. Sea level is clamped into it.
    ///
    /// Small ranges keep scans cheap in tests.
    pub fn with_height_range(mut self, min_y: i32, max_y: i32) -> Self {
        let max_y = max_y.max(min_y.saturating_add(2));
        self.min_y = min_y;
        self.max_y = max_y;
        self.sea_level = SEA_LEVEL.clamp(min_y, max_y.saturating_sub(2));
        self
    }

    /// The seed this terrain was built from.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Height of the topmost solid block in column `(x, z)`.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let roll = deterministic_random(self.seed, x, i32::MIN, z) % 8;
        let offset = i32::try_from(roll).unwrap_or(0);
        self.sea_level
            .saturating_sub(3)
            .saturating_add(offset)
            .clamp(self.min_y.saturating_add(1), self.max_y.saturating_sub(1))
    }

    /// Where the dungeon in `cell` sits, if the cell has one.
    fn dungeon_spawner(&self, cell: CellCoordinate) -> Option<BlockPos> {
        let roll = deterministic_random(self.seed, cell.cx, i32::MAX, cell.cz);
        if roll % DUNGEON_RARITY != 0 {
            return None;
        }
        let y = self.min_y.saturating_add(12).min(self.sea_level.saturating_sub(8));
        let center = cell.center(y);
        (y > self.min_y).then_some(center)
    }

    /// The block at `pos`, computed synchronously.
    pub fn block(&self, pos: BlockPos) -> &'static str {
        if pos.y < self.min_y || pos.y >= self.max_y {
            return "minecraft:air";
        }
        if pos.y == self.min_y {
            return "minecraft:bedrock";
        }

        let surface = self.surface_height(pos.x, pos.z);
        if pos.y > surface {
            return if pos.y <= self.sea_level {
                "minecraft:water"
            } else {
                "minecraft:air"
            };
        }
        if pos.y == surface {
            return if surface < self.sea_level {
                "minecraft:sand"
            } else {
                "minecraft:grass_block"
            };
        }
        if surface.saturating_sub(pos.y) <= 3 {
            return "minecraft:dirt";
        }

        if let Some(spawner) = self.dungeon_spawner(pos.cell()) {
            if pos == spawner {
                return "minecraft:spawner";
            }
            if pos == BlockPos::new(spawner.x.saturating_add(1), spawner.y, spawner.z) {
                return "minecraft:chest";
            }
        }

        self.underground(pos)
    }

    /// Stone layers with ore and lava rolls.
    fn underground(&self, pos: BlockPos) -> &'static str {
        let deep = pos.y < 0;
        let roll = deterministic_random(self.seed, pos.x, pos.y, pos.z) % 10_000;
        let near_bottom = pos.y < self.min_y.saturating_add(10);

        match roll {
            0..=149 if near_bottom => "minecraft:lava",
            150..=157 if pos.y < 16 => {
                if deep { "minecraft:deepslate_diamond_ore" } else { "minecraft:diamond_ore" }
            }
            158..=177 if pos.y < 32 => {
                if deep { "minecraft:deepslate_gold_ore" } else { "minecraft:gold_ore" }
            }
            178..=202 if pos.y < 16 => {
                if deep { "minecraft:deepslate_redstone_ore" } else { "minecraft:redstone_ore" }
            }
            203..=272 => {
                if deep { "minecraft:deepslate_iron_ore" } else { "minecraft:iron_ore" }
            }
            273..=312 if !deep => "minecraft:copper_ore",
            313..=432 if !deep => "minecraft:coal_ore",
            _ if deep => "minecraft:deepslate",
            _ => "minecraft:stone",
        }
    }

    /// The biome of the cell containing `pos`.
    pub fn biome(&self, pos: BlockPos) -> &'static str {
        let cell = pos.cell();
        let roll = deterministic_random(self.seed, cell.cx, 0, cell.cz);
        let len = u64::try_from(BIOMES.len()).unwrap_or(1);
        let index = usize::try_from(roll % len).unwrap_or(0);
        BIOMES.get(index).copied().unwrap_or("minecraft:plains")
    }
}

impl WorldSampler for SeededTerrain {
    async fn block_at(&self, pos: BlockPos) -> Result<String, SampleError> {
        Ok(self.block(pos).to_owned())
    }

    async fn biome_at(&self, pos: BlockPos) -> Result<String, SampleError> {
        Ok(self.biome(pos).to_owned())
    }

    fn build_height_range(&self) -> (i32, i32) {
        (self.min_y, self.max_y)
    }
}

/// Deterministic pseudo-random number generator using `xorshift64`.
///
/// The same `(seed, x, y, z)` always yields the same value.
#[allow(clippy::cast_sign_loss)]
fn deterministic_random(seed: u64, x: i32, y: i32, z: i32) -> u64 {
    let mut state = seed
        .wrapping_add((i64::from(x) as u64).wrapping_mul(0x517c_c1b7_2722_0a95))
        .wrapping_add((i64::from(y) as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add((i64::from(z) as u64).wrapping_mul(0xbf58_476d_1ce4_e5b9));

    // xorshift requires non-zero input.
    if state == 0 {
        state = 0xdead_beef_cafe_babe;
    }

    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_random_is_reproducible() {
        assert_eq!(deterministic_random(42, 1, 2, 3), deterministic_random(42, 1, 2, 3));
        assert_ne!(deterministic_random(42, 1, 2, 3), deterministic_random(43, 1, 2, 3));
    }

    #[test]
    fn deterministic_random_handles_zero_state() {
        assert_ne!(deterministic_random(0, 0, 0, 0), 0);
    }

    #[test]
    fn bottom_layer_is_bedrock() {
        let terrain = SeededTerrain::new(7);
        assert_eq!(terrain.block(BlockPos::new(5, -64, 5)), "minecraft:bedrock");
        assert_eq!(terrain.block(BlockPos::new(5, 400, 5)), "minecraft:air");
    }

    #[test]
    fn surface_is_within_range() {
        let terrain = SeededTerrain::new(7).with_height_range(0, 8);
        for x in -20..20 {
            let h = terrain.surface_height(x, x.saturating_mul(3));
            assert!((1..8).contains(&h), "surface {h} out of range");
        }
    }

    #[test]
    fn biome_is_uniform_within_a_cell() {
        let terrain = SeededTerrain::new(99);
        let a = terrain.biome(BlockPos::new(16, 64, 16));
        let b = terrain.biome(BlockPos::new(31, 0, 31));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn sampler_trait_matches_sync_queries() {
        let terrain = SeededTerrain::new(3);
        let pos = BlockPos::new(10, 40, -10);
        let via_trait = terrain.block_at(pos).await.ok();
        assert_eq!(via_trait.as_deref(), Some(terrain.block(pos)));
        assert_eq!(terrain.build_height_range(), (-64, 320));
    }
}
