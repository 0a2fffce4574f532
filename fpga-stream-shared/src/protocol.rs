use serde::{Deserialize, Serialize};

/// Every frame on the link, in both directions, is exactly this long
pub const PACKET_LEN: usize = 8;

pub const LEFT_DRIVE: usize = 0;
pub const RIGHT_DRIVE: usize = 1;
pub const AUGER_DRIVE: usize = 2;
pub const RAIL: usize = 3;
pub const DUMP: usize = 4;
pub const RESERVED1: usize = 5;
pub const RESERVED2: usize = 6;
pub const VERIFICATION: usize = 7;

/// Drive value for a stopped track
pub const DRIVE_NEUTRAL: u8 = 10;
/// Drive values run from 0 (full reverse) to this (full forward)
pub const DRIVE_MAX: u8 = 20;

/// Verification bytes are drawn from `0..VERIFICATION_RANGE`
pub const VERIFICATION_RANGE: u8 = 255;

pub mod auger {
    pub const RIGHT_FORWARD: u8 = 1 << 0;
    pub const RIGHT_REVERSE: u8 = 1 << 1;
    pub const LEFT_FORWARD: u8 = 1 << 2;
    pub const LEFT_REVERSE: u8 = 1 << 3;
}

pub mod rail {
    /// Rail right, shared with dump lower
    pub const RIGHT: u8 = 1 << 0;
    /// Rail left, shared with dump tilt
    pub const LEFT: u8 = 1 << 1;
    pub const UP: u8 = 1 << 2;
    pub const DOWN: u8 = 1 << 3;
    pub const AUGER_SPEED: u8 = 1 << 4;

    pub const DUMP_LOWER: u8 = RIGHT;
    pub const DUMP_TILT: u8 = LEFT;
}

/// Outgoing command frame.
///
/// The verification byte is left at zero by the encoder and filled in by the
/// exchange engine right before each transmission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandPacket([u8; PACKET_LEN]);

impl CommandPacket {
    pub fn new(left_drive: u8, right_drive: u8, auger: u8, rail: u8) -> Self {
        let mut buf = [0; PACKET_LEN];
        buf[LEFT_DRIVE] = left_drive;
        buf[RIGHT_DRIVE] = right_drive;
        buf[AUGER_DRIVE] = auger;
        buf[RAIL] = rail;
        CommandPacket(buf)
    }

    pub fn left_drive(&self) -> u8 {
        self.0[LEFT_DRIVE]
    }

    pub fn right_drive(&self) -> u8 {
        self.0[RIGHT_DRIVE]
    }

    pub fn auger(&self) -> u8 {
        self.0[AUGER_DRIVE]
    }

    pub fn rail(&self) -> u8 {
        self.0[RAIL]
    }

    pub fn dump(&self) -> u8 {
        self.0[DUMP]
    }

    pub fn verification(&self) -> u8 {
        self.0[VERIFICATION]
    }

    pub fn set_verification(&mut self, value: u8) {
        self.0[VERIFICATION] = value;
    }

    /// Same command with a different verification byte
    pub fn with_verification(mut self, value: u8) -> Self {
        self.set_verification(value);
        self
    }

    /// Everything but the verification byte
    pub fn fields(&self) -> &[u8] {
        &self.0[..VERIFICATION]
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }
}

impl From<[u8; PACKET_LEN]> for CommandPacket {
    fn from(buf: [u8; PACKET_LEN]) -> Self {
        CommandPacket(buf)
    }
}

/// Incoming frame, the remote side's status echo
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplyPacket([u8; PACKET_LEN]);

impl ReplyPacket {
    pub fn verification(&self) -> u8 {
        self.0[VERIFICATION]
    }

    /// True when the remote echoed the verification byte of `sent`
    pub fn acknowledges(&self, sent: &CommandPacket) -> bool {
        self.verification() == sent.verification()
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }
}

impl From<[u8; PACKET_LEN]> for ReplyPacket {
    fn from(buf: [u8; PACKET_LEN]) -> Self {
        ReplyPacket(buf)
    }
}

/// Decoded reply, published to whoever listens for rover status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatusRecord {
    pub left_vel: u8,
    pub right_vel: u8,
    pub rail: u8,
    pub auger: u8,
    pub dump: u8,
    pub reserved1: u8,
    pub reserved2: u8,
    pub verification: u8,
}

/// Every byte pattern is a valid status, so decoding cannot fail.
pub fn decode(reply: &ReplyPacket) -> StatusRecord {
    let buf = reply.as_bytes();
    StatusRecord {
        left_vel: buf[LEFT_DRIVE],
        right_vel: buf[RIGHT_DRIVE],
        rail: buf[RAIL],
        auger: buf[AUGER_DRIVE],
        dump: buf[DUMP],
        reserved1: buf[RESERVED1],
        reserved2: buf[RESERVED2],
        verification: buf[VERIFICATION],
    }
}

impl From<&ReplyPacket> for StatusRecord {
    fn from(reply: &ReplyPacket) -> Self {
        decode(reply)
    }
}
