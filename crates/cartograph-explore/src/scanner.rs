//! Full-height scan of a single cell.
//!
//! A scan visits all 256 columns of a cell from the bottom of the world to
//! the top, asking the sampler for every block. It is by far the most
//! expensive operation in the crate; the scheduler's idempotency guarantee
//! is what keeps it affordable. The scan yields to the runtime after every
//! column.

use std::collections::BTreeMap;

use cartograph_types::{BlockPos, CELL_SIZE, CellCoordinate, ExploredArea, ResourceClass, ResourceLocation};
use chrono::Utc;

use crate::resource::{LAVA_BLOCK, ResourceTable, WATER_BLOCK};
use crate::sampler::{SampleError, WorldSampler};

/// Height at which the biome of a cell is sampled (clamped into the world).
pub const BIOME_SAMPLE_Y: i32 = 64;

/// Turns sampler answers for one cell into an [`ExploredArea`].
///
/// Holds no state besides the resource table; the output is a pure function
/// of the sampler's answers at call time.
#[derive(Debug, Clone, Copy)]
pub struct CellScanner<'a> {
    table: &'a ResourceTable,
}

impl<'a> CellScanner<'a> {
    /// Create a scanner using the given resource table.
    pub const fn new(table: &'a ResourceTable) -> Self {
        Self { table }
    }

    /// Scan every block of `cell`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SampleError`] the sampler reports. Nothing is
    /// returned for a partially scanned cell.
    pub async fn scan<S: WorldSampler>(
        &self,
        sampler: &S,
        cell: CellCoordinate,
    ) -> Result<ExploredArea, SampleError> {
        let (min_y, max_y) = sampler.build_height_range();
        let top = max_y.saturating_sub(1).max(min_y);
        let biome = sampler
            .biome_at(cell.center(BIOME_SAMPLE_Y.clamp(min_y, top)))
            .await?;

        let discovered = Utc::now();
        let mut block_histogram: BTreeMap<String, u32> = BTreeMap::new();
        let mut resources = Vec::new();
        let mut structure_hints = BTreeMap::new();

        for dx in 0..CELL_SIZE {
            for dz in 0..CELL_SIZE {
                let x = cell.min_block_x().saturating_add(dx);
                let z = cell.min_block_z().saturating_add(dz);
                for y in min_y..max_y {
                    let position = BlockPos::new(x, y, z);
                    let block = sampler.block_at(position).await?;

                    if let Some(entry) = self.table.lookup(&block) {
                        if entry.class != ResourceClass::Ore {
                            structure_hints.entry(block.clone()).or_insert(position);
                        }
                        resources.push(ResourceLocation {
                            position,
                            resource_type: block.clone(),
                            value: entry.value,
                            discovered,
                            extracted: false,
                        });
                    }

                    let count = block_histogram.entry(block).or_insert(0);
                    *count = count.saturating_add(1);
                }
                tokio::task::yield_now().await;
            }
        }

        let has_water = block_histogram.contains_key(WATER_BLOCK);
        let has_lava = block_histogram.contains_key(LAVA_BLOCK);

        tracing::debug!(
            %cell,
            biome = biome.as_str(),
            resources = resources.len(),
            has_lava,
            "Cell scanned"
        );

        Ok(ExploredArea {
            coordinate: cell,
            biome,
            block_histogram,
            resources,
            has_water,
            has_lava,
            structure_hints,
            scanned_at: Utc::now(),
        })
    }
}
