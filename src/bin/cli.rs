//! bufferbci CLI Client
//!
//! Command-line interface for inspecting a buffer server.

use bufferbci::{ByteOrder, Config, Connection, WaitRequest};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// bufferbci CLI
#[derive(Parser, Debug)]
#[command(name = "bufferbci-cli")]
#[command(about = "CLI for FieldTrip-style data acquisition buffers")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "localhost:1972")]
    server: String,

    /// Wire byte order expected by the server
    #[arg(short, long, value_enum, default_value = "big")]
    order: OrderArg,

    /// Socket read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrderArg {
    Big,
    Little,
}

impl From<OrderArg> for ByteOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Big => ByteOrder::Big,
            OrderArg::Little => ByteOrder::Little,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the stream header
    Header,

    /// Print samples begin..=end (all samples when no range is given)
    Data {
        begin: Option<u32>,
        end: Option<u32>,
    },

    /// Print the most recent samples
    Latest {
        /// Number of samples
        count: u32,
    },

    /// Attach an event to the most recent sample
    Event {
        key: String,
        value: String,
    },

    /// Discard data held by the server
    Flush {
        #[arg(value_enum, default_value = "data")]
        target: FlushTarget,
    },

    /// Wait for new samples or events
    Wait {
        /// Return once more than this many samples exist
        #[arg(long, default_value = "0")]
        samples: u32,

        /// Return once more than this many events exist
        #[arg(long, default_value = "0")]
        events: u32,

        /// Give up after this many milliseconds
        #[arg(long, default_value = "1000")]
        timeout_ms: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FlushTarget {
    Header,
    Data,
    Events,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bufferbci=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> bufferbci::Result<()> {
    let config = Config::builder()
        .addr(&args.server)
        .byte_order(args.order.into())
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut conn = Connection::connect_with(config)?;
    tracing::info!("Connected to {}", conn.peer_addr());

    match args.command {
        Commands::Header => {
            let header = conn.get_header()?;
            println!("channels:   {}", header.channel_count);
            println!("samples:    {}", header.sample_count);
            println!("events:     {}", header.event_count);
            println!("frequency:  {} Hz", header.sampling_frequency_hz);
            println!("data type:  {:?}", header.data_type);
            println!("chunk size: {} bytes", header.chunks.len());
        }
        Commands::Data { begin, end } => {
            let samples = match (begin, end) {
                (Some(begin), Some(end)) => conn.get_data(begin, end)?,
                (Some(begin), None) => conn.get_data(begin, begin)?,
                (None, _) => conn.get_all_data()?,
            };
            print_samples(&samples);
        }
        Commands::Latest { count } => {
            let samples = conn.get_latest_data(count)?;
            print_samples(&samples);
        }
        Commands::Event { key, value } => {
            conn.put_event(&key, &value)?;
            println!("OK");
        }
        Commands::Flush { target } => {
            match target {
                FlushTarget::Header => conn.flush_header()?,
                FlushTarget::Data => conn.flush_data()?,
                FlushTarget::Events => conn.flush_events()?,
            }
            println!("OK");
        }
        Commands::Wait { samples, events, timeout_ms } => {
            let counts = conn.wait_data(WaitRequest {
                sample_threshold: samples,
                event_threshold: events,
                timeout_ms,
            })?;
            println!("samples: {}", counts.samples);
            println!("events:  {}", counts.events);
        }
    }

    conn.close()
}

/// One line per sample, channels separated by tabs
fn print_samples(samples: &[Vec<f64>]) {
    for row in samples {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", line.join("\t"));
    }
}
