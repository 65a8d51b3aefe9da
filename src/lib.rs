pub use device::{Device, DeviceConfig, RegisterIo, TileLoc, TileType};
pub use stream_switch::{
    port::{Packet, PacketHeader, PortType},
    StreamSwitchError,
};

pub mod device;
pub mod field;
pub mod stream_switch;
