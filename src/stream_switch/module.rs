use crate::{
    device::TileType,
    field::{self, Field},
};

use super::{
    port::{Direction, Packet, PacketHeader, PortType},
    StreamSwitchError,
};

/// Registers are 32 bits wide and word addressed by the slave index.
pub const WORD_SIZE: u32 = 4;

pub const ARBITER_MAX: u8 = 0x7;
pub const SELECT_MAX: u8 = 0x3;
pub const SELECT_ENABLE_MAX: u8 = 0xF;
pub const SLOT_MASK_MAX: u8 = 0x1F;

/// Packet-switch sub-fields of the master config byte. Fixed for every tile type.
pub const MASTER_CONFIG_ARBITER: Field = Field::bits(0, 2);
pub const MASTER_CONFIG_SELECT_ENABLE: Field = Field::bits(3, 6);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamPort {
    pub base: u32,
    pub count: u8,
}

impl StreamPort {
    pub const NONE: StreamPort = StreamPort::new(0, 0);

    pub const fn new(base: u32, count: u8) -> Self {
        StreamPort { base, count }
    }
}

/// Register offset (relative to the tile) and the value to write there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    pub offset: u32,
    pub value: u32,
}

/// Packet-switch settings for a master port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasterPacketConfig {
    header: PacketHeader,
    arbiter: u8,
    select_enable: u8,
}

impl MasterPacketConfig {
    pub fn new(
        header: PacketHeader,
        arbiter: u8,
        select_enable: u8,
    ) -> Result<Self, StreamSwitchError> {
        if arbiter > ARBITER_MAX || select_enable > SELECT_ENABLE_MAX {
            tracing::error!("Invalid arbiter {arbiter} or select enable {select_enable:#x}");
            return Err(StreamSwitchError::InvalidArgs(format!(
                "arbiter {arbiter} (max {ARBITER_MAX}) or select enable {select_enable:#x} (max {SELECT_ENABLE_MAX:#x}) out of range"
            )));
        }

        Ok(MasterPacketConfig {
            header,
            arbiter,
            select_enable,
        })
    }

    pub fn header(&self) -> PacketHeader {
        self.header
    }

    pub fn arbiter(&self) -> u8 {
        self.arbiter
    }

    pub fn select_enable(&self) -> u8 {
        self.select_enable
    }
}

/// One packet-match rule of a slave port slot table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotEntry {
    packet: Packet,
    mask: u8,
    select: u8,
    arbiter: u8,
}

impl SlotEntry {
    pub fn new(packet: Packet, mask: u8, select: u8, arbiter: u8) -> Result<Self, StreamSwitchError> {
        if arbiter > ARBITER_MAX
            || select > SELECT_MAX
            || mask & !SLOT_MASK_MAX != 0
            || packet.id > Packet::ID_MAX
        {
            tracing::error!(
                "Invalid arbiter {arbiter}, select {select}, packet id {} or mask {mask:#x}",
                packet.id
            );
            return Err(StreamSwitchError::InvalidArgs(format!(
                "slot entry out of range: arbiter {arbiter}, select {select}, packet id {}, mask {mask:#x}",
                packet.id
            )));
        }

        Ok(SlotEntry {
            packet,
            mask,
            select,
            arbiter,
        })
    }

    pub fn packet(&self) -> Packet {
        self.packet
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn select(&self) -> u8 {
        self.select
    }

    pub fn arbiter(&self) -> u8 {
        self.arbiter
    }
}

/// Register map of one tile type's stream switch.
///
/// `base + port_stride * (count - 1)` is expected to stay inside the switch's
/// register window for every port table; that is a property of the table data
/// and is not checked here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSwitchModule {
    pub master_base: u32,
    pub slave_base: u32,
    pub port_stride: u32,

    pub master_ports: [StreamPort; PortType::COUNT],
    pub slave_ports: [StreamPort; PortType::COUNT],

    /// Slot region base per slave port type.
    pub slot_bases: [u32; PortType::COUNT],
    pub slot_stride_per_port: u32,
    pub slot_stride: u32,
    pub slot_count: u8,

    pub master_enable: Field,
    pub master_packet_enable: Field,
    pub drop_header: Field,
    pub config: Field,

    pub slave_enable: Field,
    pub slave_packet_enable: Field,

    pub slot_packet_id: Field,
    pub slot_mask: Field,
    pub slot_enable: Field,
    pub slot_select: Field,
    pub slot_arbiter: Field,
}

impl StreamSwitchModule {
    pub fn ports(&self, direction: Direction) -> &[StreamPort; PortType::COUNT] {
        match direction {
            Direction::Slave => &self.slave_ports,
            Direction::Master => &self.master_ports,
        }
    }

    pub fn port_count(&self, direction: Direction, port_type: PortType) -> u8 {
        self.ports(direction)[port_type.index()].count
    }

    /// Offset of a port's config register, relative to the tile.
    pub fn port_offset(
        &self,
        direction: Direction,
        port_type: PortType,
        port_num: u8,
    ) -> Result<u32, StreamSwitchError> {
        let port = &self.ports(direction)[port_type.index()];

        if port.count == 0 || port_num >= port.count {
            tracing::error!("Invalid {direction} port {port_type}[{port_num}]");
            return Err(StreamSwitchError::InvalidPort(format!(
                "{direction} {port_type}[{port_num}] does not exist ({} ports)",
                port.count
            )));
        }

        Ok(port.base + self.port_stride * port_num as u32)
    }

    /// First register of the master or slave port window.
    pub fn window_base(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Slave => self.slave_base,
            Direction::Master => self.master_base,
        }
    }

    /// Position of a port's register inside its direction's window.
    pub fn port_index(
        &self,
        direction: Direction,
        port_type: PortType,
        port_num: u8,
    ) -> Result<u8, StreamSwitchError> {
        let offset = self.port_offset(direction, port_type, port_num)?;
        let base = self.window_base(direction);

        offset
            .checked_sub(base)
            .map(|rel| rel / WORD_SIZE)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| {
                tracing::error!("Unable to compute {direction} index for {port_type}[{port_num}]");
                StreamSwitchError::InvalidPort(format!(
                    "{direction} {port_type}[{port_num}] at {offset:#x} is outside the {direction} window at {base:#x}"
                ))
            })
    }

    /// Index of a slave port as the master config field expects it when
    /// selecting a circuit-switched source.
    pub fn slave_index(&self, port_type: PortType, port_num: u8) -> Result<u8, StreamSwitchError> {
        self.port_index(Direction::Slave, port_type, port_num)
    }

    /// Slave port config register. A disabled port always gets the reset value.
    pub fn slave_port(
        &self,
        port_type: PortType,
        port_num: u8,
        enable: bool,
        packet: bool,
    ) -> Result<RegisterWrite, StreamSwitchError> {
        let offset = self.port_offset(Direction::Slave, port_type, port_num)?;

        if !enable {
            return Ok(RegisterWrite { offset, value: 0 });
        }

        let value = field::pack(&[
            (self.slave_enable, 1),
            (self.slave_packet_enable, packet as u32),
        ]);

        Ok(RegisterWrite { offset, value })
    }

    /// Master port config register.
    ///
    /// In circuit mode `config` is the slave index to route from. In packet
    /// mode it is the byte built by [`StreamSwitchModule::master_packet_config`].
    /// The drop-header bit is pulled back out of `config` and placed in its own
    /// field; the arbiter and select-enable bits are taken as given.
    pub fn master_port(
        &self,
        port_type: PortType,
        port_num: u8,
        enable: bool,
        packet: bool,
        config: u8,
    ) -> Result<RegisterWrite, StreamSwitchError> {
        let offset = self.port_offset(Direction::Master, port_type, port_num)?;
        // A master register outside the master window would alias a slave or
        // slot register.
        self.port_index(Direction::Master, port_type, port_num)?;

        if !enable {
            return Ok(RegisterWrite { offset, value: 0 });
        }

        let drop_header = self.drop_header.decode(config as u32);

        let value = field::pack(&[
            (self.master_enable, 1),
            (self.master_packet_enable, packet as u32),
            (self.drop_header, drop_header),
            (self.config, config as u32),
        ]);

        Ok(RegisterWrite { offset, value })
    }

    /// Build the master config byte for packet-switch mode.
    pub fn master_packet_config(&self, config: &MasterPacketConfig) -> u8 {
        let raw = field::pack(&[
            (self.drop_header, config.header as u32),
            (MASTER_CONFIG_ARBITER, config.arbiter as u32),
            (MASTER_CONFIG_SELECT_ENABLE, config.select_enable as u32),
        ]);

        // Every drop-header layout sits inside the low byte.
        (raw & 0xFF) as u8
    }

    /// Offset of a slave slot register. The slot region is a ports x slots table.
    pub fn slot_offset(
        &self,
        port_type: PortType,
        port_num: u8,
        slot_num: u8,
    ) -> Result<u32, StreamSwitchError> {
        let port = &self.slave_ports[port_type.index()];

        if slot_num >= self.slot_count || port_num >= port.count {
            tracing::error!("Invalid slave port {port_type}[{port_num}] slot {slot_num}");
            return Err(StreamSwitchError::InvalidPort(format!(
                "slave {port_type}[{port_num}] slot {slot_num} does not exist ({} ports, {} slots)",
                port.count, self.slot_count
            )));
        }

        Ok(self.slot_bases[port_type.index()]
            + self.slot_stride_per_port * port_num as u32
            + self.slot_stride * slot_num as u32)
    }

    /// Slave slot register. `None` disables the slot and resets every field.
    pub fn slave_slot(
        &self,
        port_type: PortType,
        port_num: u8,
        slot_num: u8,
        entry: Option<&SlotEntry>,
    ) -> Result<RegisterWrite, StreamSwitchError> {
        let offset = self.slot_offset(port_type, port_num, slot_num)?;

        let value = match entry {
            Some(entry) => field::pack(&[
                (self.slot_packet_id, entry.packet.id as u32),
                (self.slot_mask, entry.mask as u32),
                (self.slot_enable, 1),
                (self.slot_select, entry.select as u32),
                (self.slot_arbiter, entry.arbiter as u32),
            ]),
            None => 0,
        };

        Ok(RegisterWrite { offset, value })
    }

    pub fn master_fields(&self) -> [Field; 4] {
        [
            self.master_enable,
            self.master_packet_enable,
            self.drop_header,
            self.config,
        ]
    }

    pub fn slave_fields(&self) -> [Field; 2] {
        [self.slave_enable, self.slave_packet_enable]
    }

    pub fn slot_fields(&self) -> [Field; 5] {
        [
            self.slot_packet_id,
            self.slot_mask,
            self.slot_enable,
            self.slot_select,
            self.slot_arbiter,
        ]
    }
}

/// Stream switch register maps by tile type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceModules {
    modules: [Option<StreamSwitchModule>; TileType::COUNT],
}

impl DeviceModules {
    pub const fn new(modules: [Option<StreamSwitchModule>; TileType::COUNT]) -> Self {
        DeviceModules { modules }
    }

    pub fn get(&self, tile_type: TileType) -> Option<&StreamSwitchModule> {
        self.modules[tile_type as usize].as_ref()
    }
}
