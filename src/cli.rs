// Command-line front end for ICTL.
//
// `stats` pushes a sequence of files through one encoder/decoder stream and
// reports how much the keyframe/delta scheme saves; `config` prints build
// details and defaults.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::compress::{AUTO_ID, Algorithm, Compression};
use crate::config::{
    DEFAULT_CACHE_SLOTS, DEFAULT_CONFIDENCE_LOOKBACK, DEFAULT_CYCLE_LENGTH,
    DEFAULT_MAX_PACKET_SIZE, EndpointConfig,
};
use crate::endpoint::Endpoint;
use crate::packet::{FrameType, HEADER_SIZE};
use crate::stream::DEFAULT_STATS_WINDOW;

const STREAM: &str = "stats";

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Incremental transfer compression (keyframes + XOR delta frames).
#[derive(Parser, Debug)]
#[command(
    name = "ictl",
    version,
    about = "Incremental transfer compression",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode files as one stream, verify the round trip, and report sizes.
    Stats(StatsArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompressionArg {
    Auto,
    None,
    Flate,
    Gzip,
    Lzw,
    Zlib,
}

impl From<CompressionArg> for Compression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Auto => Compression::Auto,
            CompressionArg::None => Compression::Fixed(Algorithm::None),
            CompressionArg::Flate => Compression::Fixed(Algorithm::Flate),
            CompressionArg::Gzip => Compression::Fixed(Algorithm::Gzip),
            CompressionArg::Lzw => Compression::Fixed(Algorithm::Lzw),
            CompressionArg::Zlib => Compression::Fixed(Algorithm::Zlib),
        }
    }
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Compression algorithm, or `auto` for best fit per frame.
    #[arg(short = 'c', long, value_enum, default_value_t = CompressionArg::Auto)]
    compression: CompressionArg,

    /// Frames per keyframe cycle (0 = adaptive).
    #[arg(long, default_value_t = DEFAULT_CYCLE_LENGTH)]
    cycle_length: u32,

    /// Recent keyframes considered as delta references.
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_LOOKBACK)]
    lookback: usize,

    /// Maximum packet size in bytes, header included.
    #[arg(long, default_value_t = DEFAULT_MAX_PACKET_SIZE)]
    max_packet_size: usize,

    /// Compression level (0 = codec default, 1-9).
    #[arg(short = 'l', long, default_value_t = 0,
          value_parser = clap::value_parser!(u8).range(0..=9))]
    level: u8,

    /// Confidence attached to every frame.
    #[arg(long, default_value_t = 0)]
    confidence: u8,

    /// Payload files, sent in order.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,
}

impl StatsArgs {
    fn config(&self) -> EndpointConfig {
        EndpointConfig::new()
            .with_compression(self.compression.into())
            .with_cycle_length(self.cycle_length)
            .with_confidence_lookback(self.lookback)
            .with_max_packet_size(self.max_packet_size)
            .with_level(self.level)
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("ictl version {version} (Rust)");

    let parallel = cfg!(feature = "parallel") as u8;
    let algorithms: Vec<&str> = Algorithm::ALL.iter().map(|a| a.name()).collect();

    eprintln!("PARALLEL_BEST_FIT={parallel}");
    eprintln!("ALGORITHMS={}", algorithms.join(","));
    eprintln!("AUTO_ID={AUTO_ID}");
    eprintln!("HEADER_SIZE={HEADER_SIZE}");
    eprintln!("DEFAULT_MAX_PACKET_SIZE={DEFAULT_MAX_PACKET_SIZE}");
    eprintln!("DEFAULT_CYCLE_LENGTH={DEFAULT_CYCLE_LENGTH}");
    eprintln!("DEFAULT_CONFIDENCE_LOOKBACK={DEFAULT_CONFIDENCE_LOOKBACK}");
    eprintln!("DEFAULT_CACHE_SLOTS={DEFAULT_CACHE_SLOTS}");
    eprintln!("DEFAULT_STATS_WINDOW={DEFAULT_STATS_WINDOW}");

    0
}

/// Decoded bytes the receiver should see for `original`.
///
/// Delta reconstruction drops trailing zero bytes.
fn expected_payload(frame_type: FrameType, original: &[u8]) -> &[u8] {
    match frame_type {
        FrameType::Keyframe => original,
        FrameType::DeltaFrame => {
            let end = original.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            &original[..end]
        }
    }
}

fn cmd_stats(args: &StatsArgs, verbose: u8, json_output: bool) -> i32 {
    let config = args.config();
    let (sender, receiver) = match (
        Endpoint::new(config.clone()),
        Endpoint::new(config),
    ) {
        (Ok(sender), Ok(receiver)) => (sender, receiver),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("ictl: {e}");
            return 1;
        }
    };

    let mut payload_bytes = 0u64;
    let mut packet_bytes = 0u64;
    let mut keyframes = 0u64;
    let mut deltas = 0u64;

    for (index, path) in args.files.iter().enumerate() {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("ictl: input file: {}: {e}", path.display());
                return 1;
            }
        };

        let packet = match sender.encode(STREAM, &data, args.confidence) {
            Ok(packet) => packet,
            Err(e) => {
                eprintln!("ictl: {}: encode error: {e}", path.display());
                return 1;
            }
        };
        let header = packet.header();

        let decoded = match receiver.decode(STREAM, packet.as_bytes()) {
            Ok(decoded) => decoded,
            Err(e) => {
                eprintln!("ictl: {}: decode error: {e}", path.display());
                return 1;
            }
        };
        if decoded.as_slice() != expected_payload(header.frame_type, &data) {
            eprintln!("ictl: {}: round trip mismatch", path.display());
            return 1;
        }

        let kind = match header.frame_type {
            FrameType::Keyframe => {
                keyframes += 1;
                "keyframe"
            }
            FrameType::DeltaFrame => {
                deltas += 1;
                "delta"
            }
        };
        payload_bytes += data.len() as u64;
        packet_bytes += packet.len() as u64;

        if verbose > 0 {
            let algorithm = header
                .algorithm()
                .map_or_else(|_| "?", |algorithm| algorithm.name());
            eprintln!(
                "ictl: frame {index}: {} {kind} ref={} algorithm={algorithm} {} -> {} bytes",
                path.display(),
                header.frame_id,
                data.len(),
                packet.len()
            );
        }
    }

    let ratio = if payload_bytes == 0 {
        0.0
    } else {
        packet_bytes as f64 / payload_bytes as f64
    };
    println!(
        "frames: {}, payload bytes: {payload_bytes}, packet bytes: {packet_bytes}, \
         keyframes: {keyframes}, deltas: {deltas}, ratio: {ratio:.3}",
        args.files.len()
    );

    if json_output {
        let json = serde_json::json!({
            "command": "stats",
            "frames": args.files.len(),
            "payload_bytes": payload_bytes,
            "packet_bytes": packet_bytes,
            "keyframes": keyframes,
            "deltas": deltas,
            "ratio": ratio,
            "compression": sender.config().compression.to_string(),
            "cycle_length": args.cycle_length,
            "decoder_success_ratio": receiver.stats().success_ratio(),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => eprintln!("{text}"),
            Err(e) => {
                eprintln!("ictl: json error: {e}");
                return 1;
            }
        }
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 | 1 => "warn",
        2 => "debug",
        _ => "trace",
    }
}

/// Run the CLI. Exits the process.
pub fn run() -> ! {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let exit_code = match &cli.command {
        Cmd::Stats(args) => cmd_stats(args, cli.verbose, cli.json_output),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
