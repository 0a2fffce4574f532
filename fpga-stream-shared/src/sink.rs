//! Where decoded status records go once a reply is verified.

#[cfg(feature = "utils")]
use std::io::Write;

use crate::error::Result;
use crate::protocol::StatusRecord;

/// Largest COBS-framed postcard encoding of a [`StatusRecord`]
#[cfg(feature = "utils")]
pub const MAX_FRAME_LEN: usize = 16;

pub trait StatusSink {
    fn publish(&mut self, record: &StatusRecord) -> Result<()>;
}

/// Logs every record at info level
#[derive(Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn publish(&mut self, record: &StatusRecord) -> Result<()> {
        log::info!(
            "Rover left: {} right: {} rail: {:#010b} auger: {:#06b} dump: {} verification: {}",
            record.left_vel,
            record.right_vel,
            record.rail,
            record.auger,
            record.dump,
            record.verification,
        );
        Ok(())
    }
}

/// Writes each record as a zero-terminated COBS frame of postcard bytes
#[cfg(feature = "utils")]
pub struct PostcardSink<W> {
    writer: W,
}

#[cfg(feature = "utils")]
impl<W: Write> PostcardSink<W> {
    pub fn new(writer: W) -> Self {
        PostcardSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(feature = "utils")]
impl<W: Write> StatusSink for PostcardSink<W> {
    fn publish(&mut self, record: &StatusRecord) -> Result<()> {
        let frame: heapless::Vec<u8, MAX_FRAME_LEN> = postcard::to_vec_cobs(record)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl StatusSink for Vec<StatusRecord> {
    fn publish(&mut self, record: &StatusRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

impl<S: StatusSink + ?Sized> StatusSink for Box<S> {
    fn publish(&mut self, record: &StatusRecord) -> Result<()> {
        (**self).publish(record)
    }
}
