use std::fs::{File, OpenOptions};
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use log::{info, warn};

use fpga_stream_shared::{
    Bridge, ExchangeConfig, JoyLines, LogSink, PacketExchange, PostcardSink, SerialLink,
    SnapshotSource, StatusSink,
};

#[derive(Debug)]
pub struct Settings {
    pub device: PathBuf,
    pub input: Option<PathBuf>,
    pub publish: Option<PathBuf>,
    pub config: ExchangeConfig,
}

pub fn run(settings: Settings) -> anyhow::Result<()> {
    let link = match SerialLink::connect(&settings.device) {
        Ok(link) => link,
        Err(err) => {
            report_ports();
            return Err(err).context("serial link to the FPGA is not usable");
        }
    };

    if settings.config.max_retries.is_none() {
        info!("No retry limit, unverified packets are resent until the FPGA answers");
    }

    let sink: Box<dyn StatusSink> = match &settings.publish {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            info!("Publishing status to {}", path.display());
            Box::new(PostcardSink::new(file))
        }
        None => Box::new(LogSink),
    };

    let mut source: Box<dyn SnapshotSource> = match &settings.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Box::new(JoyLines::new(BufReader::new(file)))
        }
        None => Box::new(JoyLines::new(io::stdin().lock())),
    };

    let exchange = PacketExchange::new(link, settings.config);
    let mut bridge = Bridge::new(exchange, sink);

    bridge.run(&mut *source)?;

    Ok(())
}

fn report_ports() {
    match SerialLink::list_ports() {
        Ok(ports) if ports.is_empty() => warn!("No serial ports found"),
        Ok(ports) => {
            for port in ports {
                info!("Available port: {}", port.port_name);
            }
        }
        Err(err) => warn!("Could not list serial ports: {}", err),
    }
}
