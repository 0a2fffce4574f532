use std::path::PathBuf;

use fpga_stream_shared::ExchangeConfig;
use structopt::StructOpt;

mod stream;

#[derive(Debug, StructOpt)]
#[structopt(name = "fpga-stream", about = "Stream joystick commands to the rover FPGA")]
struct Opt {
    /// Serial device of the FPGA, ex. /dev/ttyUSB1
    #[structopt(parse(from_os_str))]
    device: PathBuf,
    #[structopt(short, long)]
    debug: bool,
    /// Give up on a command after this many resends. Resends forever if not set
    #[structopt(long)]
    max_retries: Option<u32>,
    /// Consecutive one second read timeouts tolerated while waiting for a reply
    #[structopt(long, default_value = "10")]
    stall_limit: u32,
    /// Never time out waiting for a reply, overrides --stall-limit
    #[structopt(long)]
    no_stall_limit: bool,
    /// Joystick snapshots, one JSON object per line. Defaults to stdin
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,
    /// Publish status records as postcard frames to this file or fifo
    #[structopt(long, parse(from_os_str))]
    publish: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(loglevel)
        .parse_default_env()
        .init();

    stream::run(stream::Settings::from(opt))
}

impl From<Opt> for stream::Settings {
    fn from(opt: Opt) -> Self {
        let stall_limit = if opt.no_stall_limit {
            None
        } else {
            Some(opt.stall_limit)
        };

        stream::Settings {
            device: opt.device,
            input: opt.input,
            publish: opt.publish,
            config: ExchangeConfig {
                max_retries: opt.max_retries,
                stall_limit,
            },
        }
    }
}
