use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, StopBits};

use crate::error::{Error, Result};

/// The FPGA UART runs at this rate
pub const BAUD_RATE: u32 = 19_200;
/// Upper bound on a single read call; a read returns as soon as any byte arrives
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial connection to the FPGA.
///
/// The port is opened raw: 8N1, no flow control, no echo, no line editing
/// and no output processing, with modem control lines ignored.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn list_ports() -> std::result::Result<Vec<SerialPortInfo>, serialport::Error> {
        serialport::available_ports()
    }

    pub fn connect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();

        let port = serialport::new(path.as_str(), BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

        log::info!("Opened {} at {} baud", path, BAUD_RATE);

        Ok(SerialLink { port })
    }
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
