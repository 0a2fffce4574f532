use std::io;

/// Errors from the link, the exchange engine and the surrounding plumbing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The serial device could not be opened or configured.
    #[cfg(feature = "utils")]
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// Reading or writing the transport failed.
    #[error("link I/O error: {0}")]
    Io(#[from] io::Error),

    /// The transport kept returning nothing while a reply was being assembled.
    #[error("link stalled after {reads} empty reads ({received} of {expected} reply bytes)")]
    Stalled {
        reads: u32,
        received: usize,
        expected: usize,
    },

    /// The remote never echoed the verification byte within the retry cap.
    #[error("packet not verified after {0} retries")]
    RetriesExhausted(u32),

    /// An input snapshot line could not be parsed.
    #[error("malformed input snapshot on line {line}: {source}")]
    Snapshot {
        line: usize,
        source: serde_json::Error,
    },

    /// A status record could not be serialised for publishing.
    #[cfg(feature = "utils")]
    #[error("failed to serialise status record: {0}")]
    Publish(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
