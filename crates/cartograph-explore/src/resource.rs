//! Static resource lookup table.
//!
//! Maps block identifiers to `(class, value)`. Scanning asks the table about
//! every block it sees; anything present is recorded as a
//! [`ResourceLocation`](cartograph_types::ResourceLocation). Extending the
//! table is a data change, never a code branch.
//!
//! Value bands:
//! - rare ore: 100
//! - common ore: 10 to 40
//! - structure markers and spawners: 150 to 200

use std::collections::BTreeMap;
use std::sync::LazyLock;

use cartograph_types::ResourceClass;

/// Block id of lava source blocks.
pub const LAVA_BLOCK: &str = "minecraft:lava";

/// Block id of water source blocks.
pub const WATER_BLOCK: &str = "minecraft:water";

/// One entry of the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEntry {
    /// What kind of resource the block is.
    pub class: ResourceClass,
    /// Value assigned to each discovered block.
    pub value: u32,
}

/// The default table: `(block id, class, value)`.
const STANDARD_ENTRIES: &[(&str, ResourceClass, u32)] = &[
    // Rare ores
    ("minecraft:diamond_ore", ResourceClass::Ore, 100),
    ("minecraft:deepslate_diamond_ore", ResourceClass::Ore, 100),
    ("minecraft:emerald_ore", ResourceClass::Ore, 100),
    ("minecraft:deepslate_emerald_ore", ResourceClass::Ore, 100),
    ("minecraft:ancient_debris", ResourceClass::Ore, 100),
    // Common ores
    ("minecraft:gold_ore", ResourceClass::Ore, 40),
    ("minecraft:deepslate_gold_ore", ResourceClass::Ore, 40),
    ("minecraft:lapis_ore", ResourceClass::Ore, 35),
    ("minecraft:deepslate_lapis_ore", ResourceClass::Ore, 35),
    ("minecraft:redstone_ore", ResourceClass::Ore, 30),
    ("minecraft:deepslate_redstone_ore", ResourceClass::Ore, 30),
    ("minecraft:nether_gold_ore", ResourceClass::Ore, 30),
    ("minecraft:iron_ore", ResourceClass::Ore, 25),
    ("minecraft:deepslate_iron_ore", ResourceClass::Ore, 25),
    ("minecraft:nether_quartz_ore", ResourceClass::Ore, 20),
    ("minecraft:copper_ore", ResourceClass::Ore, 15),
    ("minecraft:deepslate_copper_ore", ResourceClass::Ore, 15),
    ("minecraft:coal_ore", ResourceClass::Ore, 10),
    ("minecraft:deepslate_coal_ore", ResourceClass::Ore, 10),
    // Structure markers
    ("minecraft:chest", ResourceClass::StructureMarker, 150),
    ("minecraft:budding_amethyst", ResourceClass::StructureMarker, 150),
    ("minecraft:end_portal_frame", ResourceClass::StructureMarker, 200),
    // Spawners
    ("minecraft:spawner", ResourceClass::Spawner, 200),
    ("minecraft:trial_spawner", ResourceClass::Spawner, 200),
];

static STANDARD: LazyLock<ResourceTable> =
    LazyLock::new(|| ResourceTable::from_entries(STANDARD_ENTRIES.iter().copied()));

/// Block id to resource classification lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceTable {
    entries: BTreeMap<String, ResourceEntry>,
}

impl ResourceTable {
    /// The shared default table, built once on first use.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Build a table from `(block id, class, value)` triples.
    ///
    /// Later duplicates replace earlier ones.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, ResourceClass, u32)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(block, class, value)| (block.to_owned(), ResourceEntry { class, value }))
            .collect();
        Self { entries }
    }

    /// Look up a block id.
    pub fn lookup(&self, block: &str) -> Option<ResourceEntry> {
        self.entries.get(block).copied()
    }

    /// Whether the block is a resource of the given class.
    pub fn is_class(&self, block: &str, class: ResourceClass) -> bool {
        self.lookup(block).is_some_and(|entry| entry.class == class)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rare_ores_are_worth_one_hundred() {
        let table = ResourceTable::standard();
        assert_eq!(table.lookup("minecraft:diamond_ore").map(|e| e.value), Some(100));
        assert_eq!(table.lookup("minecraft:ancient_debris").map(|e| e.value), Some(100));
    }

    #[test]
    fn common_ores_fall_in_band() {
        let table = ResourceTable::standard();
        for block in ["minecraft:coal_ore", "minecraft:iron_ore", "minecraft:gold_ore"] {
            let value = table.lookup(block).map_or(0, |e| e.value);
            assert!((10..=40).contains(&value), "{block} valued {value}");
        }
    }

    #[test]
    fn plain_blocks_are_not_resources() {
        let table = ResourceTable::standard();
        assert!(table.lookup("minecraft:stone").is_none());
        assert!(table.lookup(LAVA_BLOCK).is_none());
    }

    #[test]
    fn spawners_are_classified() {
        let table = ResourceTable::standard();
        assert!(table.is_class("minecraft:spawner", ResourceClass::Spawner));
        assert!(!table.is_class("minecraft:chest", ResourceClass::Spawner));
    }

    #[test]
    fn custom_tables_override_duplicates() {
        let table = ResourceTable::from_entries([
            ("test:gem", ResourceClass::Ore, 5),
            ("test:gem", ResourceClass::Ore, 9),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("test:gem").map(|e| e.value), Some(9));
    }
}
