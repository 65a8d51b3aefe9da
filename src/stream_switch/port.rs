use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use super::StreamSwitchError;

/// Which side of the switch a port sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Switch input, receives a stream.
    Slave,
    /// Switch output, drives a stream onward.
    Master,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Slave => write!(f, "slave"),
            Direction::Master => write!(f, "master"),
        }
    }
}

/// Channel category of a stream switch port.
///
/// Every variant is valid for both directions, but which ones exist (and how
/// many ports each has) depends on the tile type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum PortType {
    Core = 0,
    Dma = 1,
    Ctrl = 2,
    Fifo = 3,
    South = 4,
    West = 5,
    North = 6,
    East = 7,
    Trace = 8,
}

impl PortType {
    pub const COUNT: usize = 9;

    pub const ALL: [PortType; PortType::COUNT] = [
        PortType::Core,
        PortType::Dma,
        PortType::Ctrl,
        PortType::Fifo,
        PortType::South,
        PortType::West,
        PortType::North,
        PortType::East,
        PortType::Trace,
    ];

    /// Decode a raw port type code as handed over by a C-style caller.
    pub fn from_raw(raw: u8) -> Result<Self, StreamSwitchError> {
        PortType::from_u8(raw).ok_or_else(|| {
            tracing::error!("Invalid stream switch port type {raw}");
            StreamSwitchError::InvalidPort(format!("unknown port type code {raw}"))
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PortType::Core => "CORE",
            PortType::Dma => "DMA",
            PortType::Ctrl => "CTRL",
            PortType::Fifo => "FIFO",
            PortType::South => "SOUTH",
            PortType::West => "WEST",
            PortType::North => "NORTH",
            PortType::East => "EAST",
            PortType::Trace => "TRACE",
        };
        f.write_str(name)
    }
}

/// Whether a packet-switched master strips the packet header before forwarding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketHeader {
    #[default]
    Keep = 0,
    Drop = 1,
}

impl From<bool> for PacketHeader {
    fn from(drop: bool) -> Self {
        if drop {
            PacketHeader::Drop
        } else {
            PacketHeader::Keep
        }
    }
}

/// Packet identifier and type tag. Only the id is matched by the slot tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    pub id: u8,
    pub kind: u8,
}

impl Packet {
    pub const ID_MAX: u8 = 0x1F;

    pub fn new(id: u8, kind: u8) -> Self {
        Packet { id, kind }
    }
}
