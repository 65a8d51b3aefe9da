use crate::device::{Device, RegisterIo, TileLoc};

pub mod module;
pub mod port;

use module::{MasterPacketConfig, RegisterWrite, SlotEntry, StreamSwitchModule};
use port::{Packet, PacketHeader, PortType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamSwitchError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Tile {0} does not map to a known tile type")]
    InvalidTile(TileLoc),

    #[error("Invalid stream port: {0}")]
    InvalidPort(String),
}

impl<'m, T: RegisterIo> Device<'m, T> {
    fn stream_switch(&self, loc: TileLoc) -> Result<&'m StreamSwitchModule, StreamSwitchError> {
        let tile_type = self.tile_type(loc)?;

        self.modules().get(tile_type).ok_or_else(|| {
            tracing::error!("No stream switch for {tile_type} tile at {loc}");
            StreamSwitchError::InvalidTile(loc)
        })
    }

    fn write_tile_reg(&mut self, loc: TileLoc, reg: RegisterWrite) -> Result<(), StreamSwitchError> {
        let addr = self.tile_reg_addr(loc, reg.offset)?;
        self.write32(addr, reg.value);
        Ok(())
    }

    fn configure_circuit(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
        master: PortType,
        master_num: u8,
        enable: bool,
    ) -> Result<(), StreamSwitchError> {
        self.check_ready()?;

        tracing::debug!(
            "{loc}: {} circuit {slave}[{slave_num}] -> {master}[{master_num}]",
            if enable { "connect" } else { "disconnect" }
        );

        let strm = self.stream_switch(loc)?;

        let slave_idx = strm.slave_index(slave, slave_num)?;
        let master_reg = strm.master_port(master, master_num, enable, false, slave_idx)?;
        let slave_reg = strm.slave_port(slave, slave_num, enable, false)?;

        let master_addr = self.tile_reg_addr(loc, master_reg.offset)?;
        let slave_addr = self.tile_reg_addr(loc, slave_reg.offset)?;

        // Master first so it is already selecting the route when the slave
        // starts driving it.
        self.write32(master_addr, master_reg.value);
        self.write32(slave_addr, slave_reg.value);

        Ok(())
    }

    /// Route `slave` to `master` in circuit switch mode.
    pub fn connect_circuit(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
        master: PortType,
        master_num: u8,
    ) -> Result<(), StreamSwitchError> {
        self.configure_circuit(loc, slave, slave_num, master, master_num, true)
    }

    /// Tear down a circuit route; both port registers go back to reset.
    pub fn disconnect_circuit(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
        master: PortType,
        master_num: u8,
    ) -> Result<(), StreamSwitchError> {
        self.configure_circuit(loc, slave, slave_num, master, master_num, false)
    }

    fn configure_packet_slave(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
        enable: bool,
    ) -> Result<(), StreamSwitchError> {
        self.check_ready()?;

        tracing::debug!(
            "{loc}: {} packet switch slave {slave}[{slave_num}]",
            if enable { "enable" } else { "disable" }
        );

        let strm = self.stream_switch(loc)?;
        let reg = strm.slave_port(slave, slave_num, enable, enable)?;
        self.write_tile_reg(loc, reg)
    }

    pub fn enable_packet_slave(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
    ) -> Result<(), StreamSwitchError> {
        self.configure_packet_slave(loc, slave, slave_num, true)
    }

    pub fn disable_packet_slave(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
    ) -> Result<(), StreamSwitchError> {
        self.configure_packet_slave(loc, slave, slave_num, false)
    }

    /// Enable `master` for packet switching.
    ///
    /// `arbiter` must be at most 7 and `select_enable` (one bit per select
    /// group) at most 0xF.
    pub fn enable_packet_master(
        &mut self,
        loc: TileLoc,
        master: PortType,
        master_num: u8,
        header: PacketHeader,
        arbiter: u8,
        select_enable: u8,
    ) -> Result<(), StreamSwitchError> {
        self.check_ready()?;

        let packet_config = MasterPacketConfig::new(header, arbiter, select_enable)?;

        tracing::debug!(
            "{loc}: enable packet switch master {master}[{master_num}] ({header:?}, arbiter {arbiter}, select {select_enable:#x})"
        );

        let strm = self.stream_switch(loc)?;
        let config = strm.master_packet_config(&packet_config);
        let reg = strm.master_port(master, master_num, true, true, config)?;
        self.write_tile_reg(loc, reg)
    }

    /// Put `master` back to its reset configuration.
    pub fn disable_packet_master(
        &mut self,
        loc: TileLoc,
        master: PortType,
        master_num: u8,
    ) -> Result<(), StreamSwitchError> {
        self.check_ready()?;

        tracing::debug!("{loc}: disable packet switch master {master}[{master_num}]");

        let strm = self.stream_switch(loc)?;
        let reg = strm.master_port(master, master_num, false, false, 0)?;
        self.write_tile_reg(loc, reg)
    }

    /// Install a packet-match rule in slot `slot_num` of a slave port.
    ///
    /// The ports on both ends must already be set up for packet switching.
    #[allow(clippy::too_many_arguments)]
    pub fn enable_slave_slot(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
        slot_num: u8,
        packet: Packet,
        mask: u8,
        select: u8,
        arbiter: u8,
    ) -> Result<(), StreamSwitchError> {
        self.check_ready()?;

        let entry = SlotEntry::new(packet, mask, select, arbiter)?;

        tracing::debug!(
            "{loc}: enable slave {slave}[{slave_num}] slot {slot_num} (id {}, mask {mask:#x}, select {select}, arbiter {arbiter})",
            packet.id
        );

        let strm = self.stream_switch(loc)?;
        let reg = strm.slave_slot(slave, slave_num, slot_num, Some(&entry))?;
        self.write_tile_reg(loc, reg)
    }

    /// Disable a slot; all of its fields are reset, not just the enable bit.
    pub fn disable_slave_slot(
        &mut self,
        loc: TileLoc,
        slave: PortType,
        slave_num: u8,
        slot_num: u8,
    ) -> Result<(), StreamSwitchError> {
        self.check_ready()?;

        tracing::debug!("{loc}: disable slave {slave}[{slave_num}] slot {slot_num}");

        let strm = self.stream_switch(loc)?;
        let reg = strm.slave_slot(slave, slave_num, slot_num, None)?;
        self.write_tile_reg(loc, reg)
    }
}
