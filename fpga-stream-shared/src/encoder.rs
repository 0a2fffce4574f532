//! Joystick snapshot to command packet.
//!
//! Each control group is resolved on its own from the snapshot. Opposing
//! controls of one group pressed together cancel out and the group sends
//! nothing for that cycle.

use crate::input::{Axis, Button, InputSnapshot};
use crate::protocol::{auger, rail, CommandPacket, DRIVE_NEUTRAL};

/// Triggers count as pulled past this
pub const TRIGGER_THRESHOLD: f32 = 0.5;
/// D-pad axes count as pressed past this, in either direction
pub const DPAD_THRESHOLD: f32 = 0.5;

/// Auger speed toggle, flipped once per press of the Y button
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ToggleLatch {
    engaged: bool,
    held: bool,
}

impl ToggleLatch {
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Feed the button level of the next snapshot. Only a released to pressed
    /// transition flips the latch.
    #[must_use]
    pub fn update(self, pressed: bool) -> Self {
        ToggleLatch {
            engaged: self.engaged ^ (pressed && !self.held),
            held: pressed,
        }
    }
}

/// Map a stick axis to a track speed, 0 at -1.0, 10 at rest, 20 at 1.0
pub fn drive(value: f32) -> u8 {
    if value.is_nan() {
        return DRIVE_NEUTRAL;
    }
    let steps = (value.clamp(-1.0, 1.0) * 10.0).round() as i16;
    (steps + i16::from(DRIVE_NEUTRAL)) as u8
}

fn one_of(a: bool, a_bits: u8, b: bool, b_bits: u8) -> u8 {
    match (a, b) {
        (true, false) => a_bits,
        (false, true) => b_bits,
        _ => 0,
    }
}

fn dump_group(snapshot: &InputSnapshot) -> u8 {
    one_of(
        snapshot.pressed(Button::X),
        rail::DUMP_LOWER,
        snapshot.pressed(Button::B),
        rail::DUMP_TILT,
    )
}

fn rail_group(snapshot: &InputSnapshot) -> u8 {
    let lr = snapshot.axis(Axis::DPadLR);
    let ud = snapshot.axis(Axis::DPadUD);

    let horizontal = one_of(lr < -DPAD_THRESHOLD, rail::RIGHT, lr > DPAD_THRESHOLD, rail::LEFT);
    let vertical = one_of(ud > DPAD_THRESHOLD, rail::UP, ud < -DPAD_THRESHOLD, rail::DOWN);

    // Diagonals are ambiguous
    if horizontal != 0 && vertical != 0 {
        0
    } else {
        horizontal | vertical
    }
}

fn auger_group(snapshot: &InputSnapshot) -> u8 {
    let right = one_of(
        snapshot.axis(Axis::RT) > TRIGGER_THRESHOLD,
        auger::RIGHT_FORWARD,
        snapshot.pressed(Button::RB),
        auger::RIGHT_REVERSE,
    );
    let left = one_of(
        snapshot.axis(Axis::LT) > TRIGGER_THRESHOLD,
        auger::LEFT_FORWARD,
        snapshot.pressed(Button::LB),
        auger::LEFT_REVERSE,
    );
    right | left
}

/// Encode one snapshot. Everything except the latch comes from `snapshot`
/// alone; the verification byte is left at zero.
pub fn encode(snapshot: &InputSnapshot, latch: ToggleLatch) -> (CommandPacket, ToggleLatch) {
    let latch = latch.update(snapshot.pressed(Button::Y));

    let mut rail_bits = dump_group(snapshot) | rail_group(snapshot);
    if latch.engaged() {
        rail_bits |= rail::AUGER_SPEED;
    }

    let packet = CommandPacket::new(
        drive(snapshot.axis(Axis::LeftStickUD)),
        drive(snapshot.axis(Axis::RightStickUD)),
        auger_group(snapshot),
        rail_bits,
    );

    (packet, latch)
}

/// Encoder that carries the toggle latch from one snapshot to the next
#[derive(Debug, Default)]
pub struct CommandEncoder {
    latch: ToggleLatch,
}

impl CommandEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, snapshot: &InputSnapshot) -> CommandPacket {
        let (packet, latch) = encode(snapshot, self.latch);
        if latch.engaged() != self.latch.engaged() {
            log::info!("Auger speed toggled {}", if latch.engaged() { "on" } else { "off" });
        }
        self.latch = latch;
        packet
    }

    pub fn latch(&self) -> ToggleLatch {
        self.latch
    }
}
