use crate::stream_switch::{module::DeviceModules, StreamSwitchError};

pub mod aie;
pub mod geometry;
pub mod io;

pub use geometry::{Geometry, TileLoc, TileType};
pub use io::{Mmio, RegisterIo, RegisterLog};

/// Device instance options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    pub base_addr: u64,
    pub geometry: Geometry,
}

impl DeviceConfig {
    pub fn new(base_addr: u64) -> Self {
        Self {
            base_addr,
            geometry: Geometry {
                cols: 50,
                rows: 9,
                col_shift: 23,
                row_shift: 18,
            },
        }
    }
}

impl DeviceConfig {
    pub fn cols(mut self, cols: u8) -> Self {
        self.geometry.cols = cols;
        self
    }

    pub fn rows(mut self, rows: u8) -> Self {
        self.geometry.rows = rows;
        self
    }

    pub fn col_shift(mut self, shift: u32) -> Self {
        self.geometry.col_shift = shift;
        self
    }

    pub fn row_shift(mut self, shift: u32) -> Self {
        self.geometry.row_shift = shift;
        self
    }

    pub fn validate(&self) -> Result<(), StreamSwitchError> {
        let geometry = &self.geometry;

        if geometry.cols == 0 || geometry.rows == 0 {
            return Err(StreamSwitchError::InvalidArgs(format!(
                "array of {} columns by {} rows is empty",
                geometry.cols, geometry.rows
            )));
        }

        // The row field must fit below the column field, and the whole tile
        // address inside 64 bits.
        let row_bits = u8::BITS - (geometry.rows - 1).leading_zeros();
        let col_bits = u8::BITS - (geometry.cols - 1).leading_zeros();
        let row_end = geometry.row_shift.checked_add(row_bits);
        let col_end = geometry.col_shift.checked_add(col_bits);
        let fits = match (row_end, col_end) {
            (Some(row_end), Some(col_end)) => {
                row_end <= geometry.col_shift
                    && geometry.col_shift < u64::BITS
                    && col_end <= u64::BITS
            }
            _ => false,
        };
        if !fits {
            return Err(StreamSwitchError::InvalidArgs(format!(
                "row shift {} and column shift {} do not fit a {}x{} array in 64 bits",
                geometry.row_shift, geometry.col_shift, geometry.cols, geometry.rows
            )));
        }

        // Every register of every tile must be addressable from `base_addr`.
        let last = TileLoc::new(geometry.cols - 1, geometry.rows - 1);
        let end = self
            .base_addr
            .checked_add(geometry.tile_addr(last))
            .and_then(|addr| addr.checked_add(u32::MAX as u64));
        if end.is_none() {
            return Err(StreamSwitchError::InvalidArgs(format!(
                "array at {:#x} runs past the end of the address space",
                self.base_addr
            )));
        }

        Ok(())
    }
}

/// A configured array: where it lives, its layout, its stream switch register
/// maps, and the register back end writes go through.
///
/// Stream switch operations take `&mut self`; a device handle configures one
/// switch at a time.
pub struct Device<'m, T: RegisterIo> {
    config: DeviceConfig,
    modules: &'m DeviceModules,
    io: T,
    ready: bool,
}

impl<'m, T: RegisterIo> Device<'m, T> {
    pub fn new(
        config: DeviceConfig,
        modules: &'m DeviceModules,
        io: T,
    ) -> Result<Self, StreamSwitchError> {
        config.validate()?;

        tracing::debug!(
            "device @ {:#x}: {}x{} array ready",
            config.base_addr,
            config.geometry.cols,
            config.geometry.rows
        );

        Ok(Device {
            config,
            modules,
            io,
            ready: true,
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn modules(&self) -> &'m DeviceModules {
        self.modules
    }

    pub fn io(&self) -> &T {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut T {
        &mut self.io
    }

    pub fn into_io(self) -> T {
        self.io
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Mark the instance unusable; every later operation fails.
    pub fn shutdown(&mut self) {
        tracing::debug!("device @ {:#x}: shut down", self.config.base_addr);
        self.ready = false;
    }

    pub(crate) fn check_ready(&self) -> Result<(), StreamSwitchError> {
        if !self.ready {
            tracing::error!("Invalid device instance");
            return Err(StreamSwitchError::InvalidArgs(
                "device instance is not ready".to_string(),
            ));
        }

        Ok(())
    }

    pub fn tile_type(&self, loc: TileLoc) -> Result<TileType, StreamSwitchError> {
        self.config.geometry.tile_type(loc).ok_or_else(|| {
            tracing::error!("Invalid tile type at {loc}");
            StreamSwitchError::InvalidTile(loc)
        })
    }

    /// Absolute address of a register in the tile at `loc`.
    pub fn tile_reg_addr(&self, loc: TileLoc, offset: u32) -> Result<u64, StreamSwitchError> {
        self.tile_type(loc)?;

        self.config
            .base_addr
            .checked_add(self.config.geometry.tile_addr(loc))
            .and_then(|addr| addr.checked_add(offset as u64))
            .ok_or_else(|| {
                tracing::error!("Register {offset:#x} of tile {loc} is not addressable");
                StreamSwitchError::InvalidArgs(format!(
                    "register {offset:#x} of tile {loc} overflows the address space"
                ))
            })
    }

    pub(crate) fn write32(&mut self, addr: u64, value: u32) {
        tracing::trace!("write {addr:#x} <- {value:#010x}");
        self.io.write32(addr, value);
    }
}
