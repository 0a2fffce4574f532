//! Packet protocol between a joystick host and the rover FPGA.
//!
//! Each joystick snapshot becomes an 8 byte [`CommandPacket`]. The packet is
//! written to the serial link with a random verification byte and the FPGA
//! answers with an 8 byte status frame that must echo that byte. Unverified
//! packets are resent with a new verification byte.

pub mod bridge;
pub mod encoder;
pub mod error;
pub mod exchange;
pub mod input;
#[cfg(feature = "utils")]
pub mod link;
pub mod protocol;
pub mod sink;

pub use bridge::Bridge;
pub use encoder::{encode, CommandEncoder, ToggleLatch};
pub use error::{Error, Result};
pub use exchange::{Exchange, ExchangeConfig, ExchangeState, PacketExchange};
pub use input::{Axis, Button, InputSnapshot, JoyLines, SnapshotSource};
#[cfg(feature = "utils")]
pub use link::SerialLink;
pub use protocol::{decode, CommandPacket, ReplyPacket, StatusRecord, PACKET_LEN};
#[cfg(feature = "utils")]
pub use sink::PostcardSink;
pub use sink::{LogSink, StatusSink};
