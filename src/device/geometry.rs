use num_derive::{FromPrimitive, ToPrimitive};

/// Column/row coordinate of a tile in the array.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TileLoc {
    pub col: u8,
    pub row: u8,
}

impl TileLoc {
    pub const fn new(col: u8, row: u8) -> Self {
        TileLoc { col, row }
    }
}

impl std::fmt::Display for TileLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum TileType {
    /// Compute tile: core, data memory and DMA.
    AieTile = 0,
    /// Shim tile bridging the array to the NoC.
    ShimNoc = 1,
    /// Shim tile bridging the array to programmable logic.
    ShimPl = 2,
}

impl TileType {
    pub const COUNT: usize = 3;
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TileType::AieTile => "aie",
            TileType::ShimNoc => "shim-noc",
            TileType::ShimPl => "shim-pl",
        };
        f.write_str(name)
    }
}

/// Array layout: size plus how a location maps to a register window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub cols: u8,
    pub rows: u8,
    pub col_shift: u32,
    pub row_shift: u32,
}

impl Geometry {
    /// Tile type at `loc`, or `None` if the location is off the array.
    ///
    /// Row 0 is the shim row. Shim columns alternate in pairs: columns with
    /// `col % 4` of 2 or 3 sit on a NoC interface, the others on PL.
    pub fn tile_type(&self, loc: TileLoc) -> Option<TileType> {
        if loc.col >= self.cols || loc.row >= self.rows {
            return None;
        }

        if loc.row != 0 {
            return Some(TileType::AieTile);
        }

        match loc.col % 4 {
            2 | 3 => Some(TileType::ShimNoc),
            _ => Some(TileType::ShimPl),
        }
    }

    /// Offset of the tile's register window from the array base.
    ///
    /// Both shifts must be below 64, which [`DeviceConfig::validate`] checks.
    ///
    /// [`DeviceConfig::validate`]: crate::DeviceConfig::validate
    pub fn tile_addr(&self, loc: TileLoc) -> u64 {
        ((loc.col as u64) << self.col_shift) | ((loc.row as u64) << self.row_shift)
    }
}
