//! Joystick snapshots and where they come from.
//!
//! The controller layout follows what a joy driver publishes for an
//! Xbox-style pad: sticks in [-1, 1], triggers in [0, 1] with 0 released and
//! the D-pad as two axes taking -1, 0 or 1.

use std::io::BufRead;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    LeftStickLR = 0,
    LeftStickUD = 1,
    LT = 2,
    RightStickLR = 3,
    RightStickUD = 4,
    RT = 5,
    /// Positive is left
    DPadLR = 6,
    /// Positive is up
    DPadUD = 7,
}

pub const AXIS_COUNT: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Button {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    LB = 4,
    RB = 5,
    Back = 6,
    Start = 7,
    Guide = 8,
    LeftStick = 9,
    RightStick = 10,
}

pub const BUTTON_COUNT: usize = 11;

/// State of every control at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSnapshot {
    axes: [f32; AXIS_COUNT],
    buttons: [bool; BUTTON_COUNT],
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

impl InputSnapshot {
    /// Sticks centered, triggers released, nothing pressed
    pub const fn neutral() -> Self {
        InputSnapshot {
            axes: [0.0; AXIS_COUNT],
            buttons: [false; BUTTON_COUNT],
        }
    }

    /// Build a snapshot from the raw arrays a joy driver reports.
    ///
    /// Missing trailing entries stay neutral and extra entries are ignored.
    pub fn from_joy(axes: &[f32], buttons: &[i32]) -> Self {
        let mut snapshot = Self::neutral();
        for (dst, src) in snapshot.axes.iter_mut().zip(axes) {
            *dst = *src;
        }
        for (dst, src) in snapshot.buttons.iter_mut().zip(buttons) {
            *dst = *src != 0;
        }
        snapshot
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes[axis as usize]
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.buttons[button as usize]
    }

    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        self.axes[axis as usize] = value;
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.buttons[button as usize] = pressed;
    }

    pub fn with_axis(mut self, axis: Axis, value: f32) -> Self {
        self.set_axis(axis, value);
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.set_button(button, true);
        self
    }
}

/// Something that hands out input snapshots, one per device update.
pub trait SnapshotSource {
    /// Next snapshot, or `None` once the source is exhausted.
    fn next_snapshot(&mut self) -> Result<Option<InputSnapshot>>;
}

#[derive(Deserialize)]
struct JoyMessage {
    #[serde(default)]
    axes: Vec<f32>,
    #[serde(default)]
    buttons: Vec<i32>,
}

/// Reads snapshots as JSON lines, `{"axes": [...], "buttons": [...]}`
pub struct JoyLines<R> {
    reader: R,
    line: String,
    lineno: usize,
}

impl<R: BufRead> JoyLines<R> {
    pub fn new(reader: R) -> Self {
        JoyLines {
            reader,
            line: String::new(),
            lineno: 0,
        }
    }
}

impl<R: BufRead> SnapshotSource for JoyLines<R> {
    fn next_snapshot(&mut self) -> Result<Option<InputSnapshot>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.lineno += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }

            let msg: JoyMessage = serde_json::from_str(text).map_err(|source| Error::Snapshot {
                line: self.lineno,
                source,
            })?;

            return Ok(Some(InputSnapshot::from_joy(&msg.axes, &msg.buttons)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_joy_pads_and_truncates() {
        let buttons = [0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1];
        let snapshot = InputSnapshot::from_joy(&[0.5, -1.0], &buttons);

        assert_eq!(snapshot.axis(Axis::LeftStickLR), 0.5);
        assert_eq!(snapshot.axis(Axis::LeftStickUD), -1.0);
        assert_eq!(snapshot.axis(Axis::DPadUD), 0.0);
        assert!(snapshot.pressed(Button::B));
        assert!(!snapshot.pressed(Button::A));
        assert!(!snapshot.pressed(Button::RightStick));
    }

    #[test]
    fn test_joy_lines() {
        let input = "{\"axes\":[0,1.0],\"buttons\":[0,0,1]}\n\n{\"buttons\":[0,0,0,1]}\n";
        let mut source = JoyLines::new(Cursor::new(input));

        let first = source.next_snapshot().unwrap().unwrap();
        assert_eq!(first.axis(Axis::LeftStickUD), 1.0);
        assert!(first.pressed(Button::X));

        let second = source.next_snapshot().unwrap().unwrap();
        assert!(second.pressed(Button::Y));
        assert_eq!(second.axis(Axis::LeftStickUD), 0.0);

        assert!(source.next_snapshot().unwrap().is_none());
    }

    #[test]
    fn test_joy_lines_reports_bad_line() {
        let input = "{\"axes\":[]}\nnot json\n";
        let mut source = JoyLines::new(Cursor::new(input));

        assert!(source.next_snapshot().unwrap().is_some());
        match source.next_snapshot() {
            Err(Error::Snapshot { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
