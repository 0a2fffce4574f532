//! Send a command, wait for the echo, verify it, resend until it matches.
//!
//! One call to [`PacketExchange::exchange`] is one command cycle:
//!
//! ```text
//! Idle -> Sending -> AwaitingReply -> Verified -> Idle
//!            ^                    |
//!            +---- Retrying <-----+
//! ```
//!
//! Every attempt, retries included, goes out with a fresh verification byte.
//! The other fields are the ones the cycle started with; nothing is re-polled
//! while retrying.

use std::io::{self, Read, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::protocol::{CommandPacket, ReplyPacket, PACKET_LEN, VERIFICATION_RANGE};

/// Retries at or past this count are reported as errors rather than warnings
const RETRY_ESCALATION: u32 = 2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExchangeConfig {
    /// Give up on a command after this many resends. `None` keeps resending
    /// until the remote answers correctly.
    pub max_retries: Option<u32>,
    /// Consecutive empty reads tolerated while a reply is being assembled;
    /// one more fails the cycle. `None` waits forever.
    pub stall_limit: Option<u32>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExchangeState {
    Idle,
    Sending,
    AwaitingReply,
    Verified,
    Retrying,
}

/// A verified command cycle
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Exchange {
    pub reply: ReplyPacket,
    /// Verification byte of the attempt that got through
    pub verification: u8,
    /// Resends needed before the remote echoed correctly
    pub retries: u32,
}

/// Owns the transport and the outgoing packet buffer
pub struct PacketExchange<T, R = StdRng> {
    transport: T,
    rng: R,
    config: ExchangeConfig,
    packet: CommandPacket,
    last_verification: Option<u8>,
    state: ExchangeState,
}

impl<T: Read + Write> PacketExchange<T> {
    pub fn new(transport: T, config: ExchangeConfig) -> Self {
        Self::with_rng(transport, StdRng::from_entropy(), config)
    }
}

impl<T: Read + Write, R: Rng> PacketExchange<T, R> {
    pub fn with_rng(transport: T, rng: R, config: ExchangeConfig) -> Self {
        PacketExchange {
            transport,
            rng,
            config,
            packet: CommandPacket::default(),
            last_verification: None,
            state: ExchangeState::Idle,
        }
    }

    /// Run one command cycle. The verification byte of `command` is ignored.
    pub fn exchange(&mut self, command: CommandPacket) -> Result<Exchange> {
        self.packet = command;
        let res = self.run_cycle();
        self.set_state(ExchangeState::Idle);
        res
    }

    fn run_cycle(&mut self) -> Result<Exchange> {
        let mut retries = 0;

        loop {
            self.set_state(ExchangeState::Sending);
            let verification = self.next_verification();
            self.packet.set_verification(verification);
            self.transport.write_all(self.packet.as_bytes())?;
            self.transport.flush()?;
            self.last_verification = Some(verification);

            self.set_state(ExchangeState::AwaitingReply);
            let reply = self.read_reply()?;

            if reply.acknowledges(&self.packet) {
                self.set_state(ExchangeState::Verified);
                log::debug!("Verified {:?} after {} retries", reply.as_bytes(), retries);
                return Ok(Exchange {
                    reply,
                    verification,
                    retries,
                });
            }

            self.set_state(ExchangeState::Retrying);
            if retries < RETRY_ESCALATION {
                log::warn!("Slow down! Could not verify packet, resent {} times", retries);
            } else {
                log::error!("Slow down! Could not verify packet, resent {} times", retries);
            }
            log::debug!(
                "Expected verification {:#04x}, got {:#04x}",
                verification,
                reply.verification()
            );

            retries += 1;
            if let Some(max) = self.config.max_retries {
                if retries > max {
                    return Err(Error::RetriesExhausted(max));
                }
            }
        }
    }

    /// Uniform over `0..VERIFICATION_RANGE`, never equal to the previous byte
    fn next_verification(&mut self) -> u8 {
        match self.last_verification {
            Some(prev) => {
                let v = self.rng.gen_range(0..VERIFICATION_RANGE - 1);
                if v >= prev {
                    v + 1
                } else {
                    v
                }
            }
            None => self.rng.gen_range(0..VERIFICATION_RANGE),
        }
    }

    fn read_reply(&mut self) -> Result<ReplyPacket> {
        let mut buf = [0; PACKET_LEN];
        let mut offset = 0;
        let mut empty_reads = 0;

        while offset < PACKET_LEN {
            match self.transport.read(&mut buf[offset..]) {
                Ok(0) => empty_reads += 1,
                Ok(readlen) => {
                    offset += readlen;
                    empty_reads = 0;
                    log::trace!("Reply {}/{} bytes", offset, PACKET_LEN);
                    continue;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ref e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    empty_reads += 1
                }
                Err(e) => return Err(e.into()),
            }

            if let Some(limit) = self.config.stall_limit {
                if empty_reads > limit {
                    return Err(Error::Stalled {
                        reads: empty_reads,
                        received: offset,
                        expected: PACKET_LEN,
                    });
                }
            }
        }

        Ok(ReplyPacket::from(buf))
    }

    fn set_state(&mut self, state: ExchangeState) {
        log::trace!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Verification byte of the most recent transmission
    pub fn last_verification(&self) -> Option<u8> {
        self.last_verification
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
