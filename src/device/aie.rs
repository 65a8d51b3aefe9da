//! Stream switch register maps of the first generation AI Engine tiles.

use crate::{
    field::Field,
    stream_switch::{
        module::{DeviceModules, StreamPort, StreamSwitchModule},
        port::PortType,
    },
};

const MASTER_BASE: u32 = 0x3F000;
const SLAVE_BASE: u32 = 0x3F100;
const SLOT_BASE: u32 = 0x3F200;

const PORT_STRIDE: u32 = 0x4;
const SLOT_STRIDE_PER_PORT: u32 = 0x10;
const SLOT_STRIDE: u32 = 0x4;
const SLOT_COUNT: u8 = 4;

const fn ports(table: [(PortType, StreamPort); 9]) -> [StreamPort; PortType::COUNT] {
    let mut out = [StreamPort::NONE; PortType::COUNT];
    let mut i = 0;
    while i < table.len() {
        out[table[i].0 as usize] = table[i].1;
        i += 1;
    }
    out
}

/// Each slave port owns `SLOT_STRIDE_PER_PORT` bytes of slot region, in the
/// same order as the slave config registers.
const fn slot_bases(slaves: &[StreamPort; PortType::COUNT]) -> [u32; PortType::COUNT] {
    let mut out = [0; PortType::COUNT];
    let mut i = 0;
    while i < PortType::COUNT {
        if slaves[i].count != 0 {
            let index = (slaves[i].base - SLAVE_BASE) / PORT_STRIDE;
            out[i] = SLOT_BASE + index * SLOT_STRIDE_PER_PORT;
        }
        i += 1;
    }
    out
}

const fn module(
    master_ports: [StreamPort; PortType::COUNT],
    slave_ports: [StreamPort; PortType::COUNT],
) -> StreamSwitchModule {
    StreamSwitchModule {
        master_base: MASTER_BASE,
        slave_base: SLAVE_BASE,
        port_stride: PORT_STRIDE,
        master_ports,
        slot_bases: slot_bases(&slave_ports),
        slave_ports,
        slot_stride_per_port: SLOT_STRIDE_PER_PORT,
        slot_stride: SLOT_STRIDE,
        slot_count: SLOT_COUNT,

        master_enable: Field::bit(31),
        master_packet_enable: Field::bit(30),
        drop_header: Field::bit(7),
        config: Field::bits(0, 6),

        slave_enable: Field::bit(31),
        slave_packet_enable: Field::bit(30),

        slot_packet_id: Field::bits(24, 28),
        slot_mask: Field::bits(16, 20),
        slot_enable: Field::bit(8),
        slot_select: Field::bits(4, 5),
        slot_arbiter: Field::bits(0, 2),
    }
}

const AIE_TILE_MASTERS: [StreamPort; PortType::COUNT] = ports([
    (PortType::Core, StreamPort::new(0x3F000, 2)),
    (PortType::Dma, StreamPort::new(0x3F008, 2)),
    (PortType::Ctrl, StreamPort::new(0x3F010, 1)),
    (PortType::Fifo, StreamPort::new(0x3F014, 2)),
    (PortType::South, StreamPort::new(0x3F01C, 4)),
    (PortType::West, StreamPort::new(0x3F02C, 4)),
    (PortType::North, StreamPort::new(0x3F03C, 6)),
    (PortType::East, StreamPort::new(0x3F054, 4)),
    (PortType::Trace, StreamPort::NONE),
]);

const AIE_TILE_SLAVES: [StreamPort; PortType::COUNT] = ports([
    (PortType::Core, StreamPort::new(0x3F100, 2)),
    (PortType::Dma, StreamPort::new(0x3F108, 2)),
    (PortType::Ctrl, StreamPort::new(0x3F110, 1)),
    (PortType::Fifo, StreamPort::new(0x3F114, 2)),
    (PortType::South, StreamPort::new(0x3F11C, 6)),
    (PortType::West, StreamPort::new(0x3F134, 4)),
    (PortType::North, StreamPort::new(0x3F144, 4)),
    (PortType::East, StreamPort::new(0x3F154, 4)),
    (PortType::Trace, StreamPort::new(0x3F164, 2)),
]);

const SHIM_MASTERS: [StreamPort; PortType::COUNT] = ports([
    (PortType::Core, StreamPort::NONE),
    (PortType::Dma, StreamPort::NONE),
    (PortType::Ctrl, StreamPort::new(0x3F000, 1)),
    (PortType::Fifo, StreamPort::new(0x3F004, 2)),
    (PortType::South, StreamPort::new(0x3F00C, 6)),
    (PortType::West, StreamPort::new(0x3F024, 4)),
    (PortType::North, StreamPort::new(0x3F034, 6)),
    (PortType::East, StreamPort::new(0x3F04C, 4)),
    (PortType::Trace, StreamPort::NONE),
]);

const SHIM_SLAVES: [StreamPort; PortType::COUNT] = ports([
    (PortType::Core, StreamPort::NONE),
    (PortType::Dma, StreamPort::NONE),
    (PortType::Ctrl, StreamPort::new(0x3F100, 1)),
    (PortType::Fifo, StreamPort::new(0x3F104, 2)),
    (PortType::South, StreamPort::new(0x3F10C, 8)),
    (PortType::West, StreamPort::new(0x3F12C, 4)),
    (PortType::North, StreamPort::new(0x3F13C, 4)),
    (PortType::East, StreamPort::new(0x3F14C, 4)),
    (PortType::Trace, StreamPort::new(0x3F15C, 1)),
]);

pub const AIE_TILE: StreamSwitchModule = module(AIE_TILE_MASTERS, AIE_TILE_SLAVES);

// The NoC and PL shims share a switch layout; they differ in what sits below
// their south ports.
pub const SHIM_NOC: StreamSwitchModule = module(SHIM_MASTERS, SHIM_SLAVES);
pub const SHIM_PL: StreamSwitchModule = module(SHIM_MASTERS, SHIM_SLAVES);

pub static MODULES: DeviceModules =
    DeviceModules::new([Some(AIE_TILE), Some(SHIM_NOC), Some(SHIM_PL)]);
