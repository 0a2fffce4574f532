//! Bridge: joystick snapshots in, verified status records out.

use std::io::{Read, Write};

use rand::rngs::StdRng;
use rand::Rng;

use crate::encoder::CommandEncoder;
use crate::error::Result;
use crate::exchange::PacketExchange;
use crate::input::{InputSnapshot, SnapshotSource};
use crate::protocol::{decode, StatusRecord};
use crate::sink::StatusSink;

/// Runs one full command cycle per snapshot.
///
/// The next snapshot is only read once the previous cycle is verified.
/// While a noisy link keeps a cycle retrying, later snapshots wait in the
/// source and are then sent in turn, oldest first.
pub struct Bridge<T, S, R = StdRng> {
    encoder: CommandEncoder,
    exchange: PacketExchange<T, R>,
    sink: S,
}

impl<T: Read + Write, S: StatusSink, R: Rng> Bridge<T, S, R> {
    pub fn new(exchange: PacketExchange<T, R>, sink: S) -> Self {
        Bridge {
            encoder: CommandEncoder::new(),
            exchange,
            sink,
        }
    }

    /// Encode, send until verified, decode and publish.
    pub fn handle(&mut self, snapshot: &InputSnapshot) -> Result<StatusRecord> {
        let command = self.encoder.encode(snapshot);
        let exchange = self.exchange.exchange(command)?;

        let record = decode(&exchange.reply);
        self.sink.publish(&record)?;

        Ok(record)
    }

    /// Handle snapshots until the source runs dry. Returns the number of
    /// verified cycles.
    pub fn run<I: SnapshotSource + ?Sized>(&mut self, source: &mut I) -> Result<u64> {
        let mut cycles = 0;
        while let Some(snapshot) = source.next_snapshot()? {
            self.handle(&snapshot)?;
            cycles += 1;
        }
        log::info!("Input closed after {} commands", cycles);
        Ok(cycles)
    }

    pub fn exchange(&self) -> &PacketExchange<T, R> {
        &self.exchange
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (PacketExchange<T, R>, S) {
        (self.exchange, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::tests::{MockLink, Response};
    use crate::exchange::ExchangeConfig;
    use crate::input::{Axis, Button, JoyLines};
    use crate::protocol::{rail, RAIL, VERIFICATION};
    use rand::SeedableRng;
    use std::io::Cursor;

    fn bridge(script: Vec<Response>) -> Bridge<MockLink, Vec<StatusRecord>> {
        let exchange = PacketExchange::with_rng(
            MockLink::new(script),
            StdRng::seed_from_u64(11),
            ExchangeConfig::default(),
        );
        Bridge::new(exchange, Vec::new())
    }

    #[test]
    fn test_handle_publishes_reply() {
        let mut bridge = bridge(vec![Response::echo().status([9, 8, 7, 6, 5, 4, 3])]);
        let snapshot = InputSnapshot::neutral().with_axis(Axis::LeftStickUD, 1.0);

        let record = bridge.handle(&snapshot).unwrap();
        let sent = bridge.exchange().transport().written[0];

        assert_eq!(&sent[..VERIFICATION], &[20, 10, 0, 0, 0, 0, 0]);
        assert_eq!(record.left_vel, 9);
        assert_eq!(record.auger, 7);
        assert_eq!(record.rail, 6);
        assert_eq!(record.verification, sent[VERIFICATION]);
        assert_eq!(bridge.sink(), &vec![record]);
    }

    #[test]
    fn test_retry_resends_same_fields() {
        let script = vec![Response::mismatch(), Response::mismatch(), Response::echo()];
        let mut bridge = bridge(script);
        let snapshot = InputSnapshot::neutral().with_button(Button::Y);

        bridge.handle(&snapshot).unwrap();
        let written = &bridge.exchange().transport().written;

        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p[RAIL] == rail::AUGER_SPEED));
        assert_eq!(bridge.sink().len(), 1);
    }

    #[test]
    fn test_run_until_input_closes() {
        let lines = "{\"axes\":[0,1]}\n{\"axes\":[0,0,0,0,-1]}\n";
        let mut source = JoyLines::new(Cursor::new(lines));
        let mut bridge = bridge(vec![Response::echo(); 2]);

        assert_eq!(bridge.run(&mut source).unwrap(), 2);

        let (exchange, sink) = bridge.into_parts();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].left_vel, 20);
        assert_eq!(sink[1].right_vel, 0);
        assert_eq!(exchange.into_inner().written.len(), 2);
    }

    #[test]
    fn test_waiting_snapshots_sent_in_order() {
        let lines = "{\"axes\":[0,1]}\n{\"axes\":[0,0.5]}\n{\"axes\":[0,0]}\n";
        let mut source = JoyLines::new(Cursor::new(lines));
        let mut script = vec![Response::mismatch(); 5];
        script.extend(vec![Response::echo(); 3]);
        let mut bridge = bridge(script);

        assert_eq!(bridge.run(&mut source).unwrap(), 3);

        let left: Vec<u8> = bridge.sink().iter().map(|r| r.left_vel).collect();
        assert_eq!(left, vec![20, 15, 10]);
        assert_eq!(bridge.exchange().transport().written.len(), 8);
    }
}
