use std::collections::HashSet;

use aie_ss::{
    device::aie,
    field::{self, Field},
    stream_switch::{
        module::{
            MasterPacketConfig, SlotEntry, StreamPort, StreamSwitchModule,
            MASTER_CONFIG_ARBITER, MASTER_CONFIG_SELECT_ENABLE, WORD_SIZE,
        },
        port::Direction,
    },
    Packet, PacketHeader, PortType, StreamSwitchError, TileType,
};
use num_traits::FromPrimitive;

#[ctor::ctor]
fn test_init() {
    tracing_subscriber::util::SubscriberInitExt::init(
        tracing_subscriber::layer::SubscriberExt::with(
            tracing_subscriber::layer::SubscriberExt::with(
                tracing_subscriber::registry(),
                tracing_subscriber::fmt::layer().with_test_writer(),
            ),
            tracing_subscriber::filter::EnvFilter::from_default_env(),
        ),
    );
}

fn all_modules() -> [(TileType, &'static StreamSwitchModule); 3] {
    [
        (TileType::AieTile, aie::MODULES.get(TileType::AieTile).unwrap()),
        (TileType::ShimNoc, aie::MODULES.get(TileType::ShimNoc).unwrap()),
        (TileType::ShimPl, aie::MODULES.get(TileType::ShimPl).unwrap()),
    ]
}

#[test]
fn fields_do_not_overlap() {
    for (tile_type, strm) in all_modules() {
        assert!(!field::any_overlap(&strm.master_fields()), "{tile_type} master");
        assert!(!field::any_overlap(&strm.slave_fields()), "{tile_type} slave");
        assert!(!field::any_overlap(&strm.slot_fields()), "{tile_type} slot");

        // The drop-header bit travels inside the config byte.
        assert!(strm.drop_header.upper() < 8, "{tile_type}");
        assert!(!field::any_overlap(&[
            strm.drop_header,
            MASTER_CONFIG_ARBITER,
            MASTER_CONFIG_SELECT_ENABLE
        ]));
    }
}

#[test]
fn ports_stay_in_their_window() {
    for (tile_type, strm) in all_modules() {
        let mut offsets = HashSet::new();

        for direction in [Direction::Master, Direction::Slave] {
            let (low, high) = match direction {
                Direction::Master => (strm.window_base(direction), strm.slave_base),
                Direction::Slave => (strm.window_base(direction), 0x3F200),
            };

            for port_type in PortType::ALL {
                for num in 0..strm.port_count(direction, port_type) {
                    let offset = strm.port_offset(direction, port_type, num).unwrap();
                    assert!(
                        (low..high).contains(&offset),
                        "{tile_type} {direction} {port_type}[{num}] at {offset:#x}"
                    );
                    assert!(offsets.insert(offset), "{tile_type} {offset:#x} used twice");
                }
            }
        }
    }
}

#[test]
fn slave_index_is_linear() {
    for (tile_type, strm) in all_modules() {
        for port_type in PortType::ALL {
            let count = strm.port_count(Direction::Slave, port_type);
            for num in 1..count {
                let prev = strm.slave_index(port_type, num - 1).unwrap() as u32;
                let next = strm.slave_index(port_type, num).unwrap() as u32;
                assert_eq!(next - prev, strm.port_stride / WORD_SIZE, "{tile_type} {port_type}");
            }
        }
    }
}

#[test]
fn slave_index_fits_master_config() {
    for (tile_type, strm) in all_modules() {
        for port_type in PortType::ALL {
            for num in 0..strm.port_count(Direction::Slave, port_type) {
                let index = strm.slave_index(port_type, num).unwrap();
                assert!(strm.config.fits(index as u32), "{tile_type} {port_type}[{num}]");
            }
        }
    }
}

#[test]
fn slave_index_of_missing_port() {
    let strm = &aie::SHIM_NOC;

    assert!(matches!(
        strm.slave_index(PortType::Dma, 0),
        Err(StreamSwitchError::InvalidPort(_))
    ));
    assert!(matches!(
        strm.slave_index(PortType::South, 8),
        Err(StreamSwitchError::InvalidPort(_))
    ));
    assert_eq!(strm.slave_index(PortType::Ctrl, 0), Ok(0));
    assert_eq!(strm.slave_index(PortType::South, 7), Ok(10));
}

#[test]
fn master_index_is_linear() {
    for (tile_type, strm) in all_modules() {
        let mut indices = HashSet::new();

        for port_type in PortType::ALL {
            for num in 0..strm.port_count(Direction::Master, port_type) {
                let index = strm.port_index(Direction::Master, port_type, num).unwrap();
                let offset = strm.port_offset(Direction::Master, port_type, num).unwrap();
                assert_eq!(
                    strm.master_base + index as u32 * WORD_SIZE,
                    offset,
                    "{tile_type} {port_type}[{num}]"
                );
                assert!(indices.insert(index), "{tile_type} master index {index} used twice");
            }
        }

        assert!(indices.contains(&0), "{tile_type}");
    }

    assert_eq!(aie::AIE_TILE.port_index(Direction::Master, PortType::Core, 0), Ok(0));
    assert_eq!(aie::AIE_TILE.port_index(Direction::Master, PortType::East, 3), Ok(24));
    assert_eq!(aie::SHIM_PL.port_index(Direction::Master, PortType::Ctrl, 0), Ok(0));
}

#[test]
fn master_outside_its_window() {
    let mut strm = aie::AIE_TILE.clone();
    strm.master_ports[PortType::Core.index()] = StreamPort::new(strm.master_base - 8, 2);

    assert!(matches!(
        strm.port_index(Direction::Master, PortType::Core, 1),
        Err(StreamSwitchError::InvalidPort(_))
    ));
    assert!(matches!(
        strm.master_port(PortType::Core, 0, true, false, 0),
        Err(StreamSwitchError::InvalidPort(_))
    ));
    assert!(matches!(
        strm.master_port(PortType::Core, 1, false, false, 0),
        Err(StreamSwitchError::InvalidPort(_))
    ));

    // Other masters are untouched.
    let reg = strm.master_port(PortType::Dma, 0, true, false, 2).unwrap();
    assert_eq!((reg.offset, reg.value), (0x3F008, 0x8000_0002));
}

#[test]
fn slot_regions_follow_slave_order() {
    for (tile_type, strm) in all_modules() {
        for port_type in PortType::ALL {
            let count = strm.port_count(Direction::Slave, port_type);
            for num in 0..count {
                let index = strm.slave_index(port_type, num).unwrap() as u32;
                assert_eq!(
                    strm.slot_offset(port_type, num, 0).unwrap(),
                    0x3F200 + index * strm.slot_stride_per_port,
                    "{tile_type} {port_type}[{num}]"
                );
            }
        }
    }
}

#[test]
fn encoders_return_offset_when_disabled() {
    let strm = &aie::AIE_TILE;

    let reg = strm.slave_port(PortType::Fifo, 1, false, true).unwrap();
    assert_eq!((reg.offset, reg.value), (0x3F118, 0));

    let reg = strm.master_port(PortType::Fifo, 1, false, true, 0xFF).unwrap();
    assert_eq!((reg.offset, reg.value), (0x3F018, 0));

    let reg = strm.slave_slot(PortType::Fifo, 1, 1, None).unwrap();
    assert_eq!((reg.offset, reg.value), (0x3F200 + 6 * 0x10 + 4, 0));
}

#[test]
fn master_encoder_does_not_range_check_config() {
    let strm = &aie::AIE_TILE;

    // Bit 7 is the drop-header, the rest lands in the config field untouched.
    let reg = strm.master_port(PortType::Core, 0, true, true, 0xFF).unwrap();
    assert_eq!(reg.value, 0xC000_00FF);

    let reg = strm.master_port(PortType::Core, 0, true, false, 0x05).unwrap();
    assert_eq!(reg.value, 0x8000_0005);
}

#[test]
fn master_packet_config_byte() {
    let strm = &aie::AIE_TILE;

    let config = MasterPacketConfig::new(PacketHeader::Drop, 3, 9).unwrap();
    assert_eq!(strm.master_packet_config(&config), 0xCB);

    let config = MasterPacketConfig::new(PacketHeader::Keep, 7, 0).unwrap();
    assert_eq!(strm.master_packet_config(&config), 0x07);

    assert!(MasterPacketConfig::new(PacketHeader::Keep, 8, 0).is_err());
    assert!(MasterPacketConfig::new(PacketHeader::from(true), 0, 0x10).is_err());
}

#[test]
fn slot_entry_ranges() {
    assert!(SlotEntry::new(Packet::new(31, 0), 0x1F, 3, 7).is_ok());
    assert!(SlotEntry::new(Packet::new(32, 0), 0, 0, 0).is_err());
    assert!(SlotEntry::new(Packet::new(0, 0), 0x21, 0, 0).is_err());
    assert!(SlotEntry::new(Packet::new(0, 0), 0, 4, 0).is_err());
    assert!(SlotEntry::new(Packet::new(0, 0), 0, 0, 8).is_err());
}

#[test]
fn raw_codes() {
    assert_eq!(PortType::from_raw(4), Ok(PortType::South));
    assert_eq!(PortType::from_raw(8), Ok(PortType::Trace));
    assert!(matches!(
        PortType::from_raw(PortType::COUNT as u8),
        Err(StreamSwitchError::InvalidPort(_))
    ));

    assert_eq!(TileType::from_u8(1), Some(TileType::ShimNoc));
    assert_eq!(TileType::from_u8(3), None);

    for (i, port_type) in PortType::ALL.into_iter().enumerate() {
        assert_eq!(port_type.index(), i);
    }
}

#[test]
fn field_basics() {
    let field = Field::bits(4, 5);
    assert_eq!(field.mask(), 0x30);
    assert_eq!(field.max(), 3);
    assert_eq!(field.encode(0x7), 0x30);
    assert_eq!(field.decode(0xFFFF_FF2F), 2);
    assert!(field.fits(3));
    assert!(!field.fits(4));

    let wide = Field::bits(0, 31);
    assert_eq!(wide.mask(), u32::MAX);
    assert_eq!(wide.decode(0xDEAD_BEEF), 0xDEAD_BEEF);

    assert!(Field::bit(31).overlaps(&Field::bits(28, 31)));
    assert!(!Field::bit(31).overlaps(&Field::bit(30)));
    assert_eq!(field::pack(&[(Field::bit(31), 1), (Field::bits(0, 2), 5)]), 0x8000_0005);
}
