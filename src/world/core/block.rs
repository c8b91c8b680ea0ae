use serde::{Deserialize, Serialize};
use std::fmt;

/// Block type code. `0` is air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockId(pub u16);

impl Default for BlockId {
    fn default() -> Self {
        BlockId::AIR
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BlockId::AIR => write!(f, "Air"),
            BlockId::GRASS => write!(f, "Grass"),
            BlockId::SAND => write!(f, "Sand"),
            BlockId::STONE => write!(f, "Stone"),
            BlockId::GLASS => write!(f, "Glass"),
            BlockId::WOOD => write!(f, "Wood"),
            BlockId::COBBLE => write!(f, "Cobble"),
            BlockId::LEAVES => write!(f, "Leaves"),
            BlockId::PLANK => write!(f, "Plank"),
            BlockId::TALL_GRASS => write!(f, "Tall Grass"),
            id if id.is_plant() => write!(f, "Flower({})", id.0),
            _ => write!(f, "Block({})", self.0),
        }
    }
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const GRASS: BlockId = BlockId(1);
    pub const SAND: BlockId = BlockId(2);
    pub const STONE: BlockId = BlockId(3);
    pub const GLASS: BlockId = BlockId(4);
    pub const WOOD: BlockId = BlockId(5);
    pub const COBBLE: BlockId = BlockId(6);
    pub const LEAVES: BlockId = BlockId(7);
    pub const PLANK: BlockId = BlockId(8);
    pub const TALL_GRASS: BlockId = BlockId(17);
    pub const FLOWER_FIRST: BlockId = BlockId(18);
    pub const FLOWER_LAST: BlockId = BlockId(24);

    /// Number of placeable building blocks (codes 1..=8)
    pub const BUILDING_BLOCK_COUNT: u16 = 8;

    /// Create a new BlockId from a raw u16 value
    pub const fn new(id: u16) -> Self {
        BlockId(id)
    }

    /// Convert a wire or log code into a block id. Negative and oversized
    /// codes have no block meaning.
    pub fn from_code(code: i32) -> Option<Self> {
        u16::try_from(code).ok().map(BlockId)
    }

    pub const fn code(self) -> i32 {
        self.0 as i32
    }

    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Solid, collidable and hit by sight rays
    pub const fn is_obstacle(self) -> bool {
        self.0 != 0 && self.0 <= 8
    }

    /// Non-obstacle billboard geometry
    pub const fn is_plant(self) -> bool {
        self.0 > 16 && self.0 != 32
    }

    /// Lets a neighbouring face show through
    pub const fn is_transparent(self) -> bool {
        self.0 == 0 || self.0 == 4 || self.0 == 7 || self.is_plant()
    }

    /// Next building block in the 1..=8 cycle
    pub const fn next_building_block(self) -> BlockId {
        BlockId(self.0 % Self::BUILDING_BLOCK_COUNT + 1)
    }
}

/// Atlas tiles for the six faces of a block, ordered
/// left, right, top, bottom, front, back.
pub fn face_tiles(block: BlockId) -> [u16; 6] {
    match block {
        BlockId::GRASS => [16, 16, 32, 0, 16, 16],
        BlockId::SAND => [1, 1, 1, 1, 1, 1],
        BlockId::STONE => [2, 2, 2, 2, 2, 2],
        BlockId::GLASS => [3, 3, 3, 3, 3, 3],
        BlockId::WOOD => [20, 20, 36, 4, 20, 20],
        BlockId::COBBLE => [5, 5, 5, 5, 5, 5],
        BlockId::LEAVES => [6, 6, 6, 6, 6, 6],
        BlockId::PLANK => [7, 7, 7, 7, 7, 7],
        other => {
            let tile = other.0.saturating_sub(1) % 256;
            [tile; 6]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_examples() {
        assert!(BlockId::WOOD.is_obstacle());
        assert!(!BlockId::WOOD.is_plant());

        let flower = BlockId(20);
        assert!(flower.is_plant());
        assert!(!flower.is_obstacle());
        assert!(flower.is_transparent());

        assert!(!BlockId::AIR.is_obstacle());
        assert!(!BlockId::AIR.is_plant());
        assert!(BlockId::AIR.is_transparent());
    }

    #[test]
    fn test_obstacle_and_plant_are_exclusive() {
        for code in 0..=64u16 {
            let block = BlockId(code);
            assert!(!(block.is_obstacle() && block.is_plant()), "code {}", code);
        }
    }

    #[test]
    fn test_transparent_set() {
        assert!(BlockId::GLASS.is_transparent());
        assert!(BlockId::LEAVES.is_transparent());
        assert!(!BlockId::STONE.is_transparent());
        assert!(!BlockId(32).is_plant());
        assert!(!BlockId(32).is_transparent());
        assert!(!BlockId(12).is_obstacle());
    }

    #[test]
    fn test_building_block_cycle() {
        assert_eq!(BlockId::GRASS.next_building_block(), BlockId::SAND);
        assert_eq!(BlockId::PLANK.next_building_block(), BlockId::GRASS);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(BlockId::from_code(7), Some(BlockId::LEAVES));
        assert_eq!(BlockId::from_code(-1), None);
        assert_eq!(BlockId::from_code(70_000), None);
    }
}
