use std::io::{self, Read, Write};
use std::path::PathBuf;

use alertsynth_core::{Config, Normalizer, Overrides, RawValue};
use alertsynth_response::parse_batch_response;
use alertsynth_time::{TimestampConfig, TimestampPattern};
use clap::Parser;
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "alertsynth",
    about = "Normalize a raw model response into synthetic security alerts (stdin → NDJSON)"
)]
struct Cli {
    /// TOML file layered over the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of alerts to emit.
    #[arg(long, default_value_t = 1)]
    count: usize,

    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(long, default_value = "unknown")]
    user: String,

    #[arg(long, default_value = "default")]
    space: String,

    /// Range start: `now`, a relative token like `7d`, or an ISO-8601 instant.
    #[arg(long)]
    start: Option<String>,

    /// Range end, same forms as `--start`.
    #[arg(long)]
    end: Option<String>,

    /// uniform, business_hours, attack_simulation, weekend_heavy or random.
    #[arg(long)]
    pattern: Option<TimestampPattern>,

    /// Log at debug level to stderr (RUST_LOG still wins when set).
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let normalizer = Normalizer::new(&config);
    let overrides = Overrides::new(cli.host, cli.user, cli.space);
    let timestamps = TimestampConfig {
        start_date: cli.start,
        end_date: cli.end,
        pattern: cli.pattern,
        event_date_offset_hours: None,
    };

    let mut response = String::new();
    io::stdin().read_to_string(&mut response)?;
    let candidates = parse_batch_response(response.as_str(), cli.count);
    tracing::debug!(count = candidates.len(), "candidates recovered");

    let now = chrono::Utc::now();
    let mut rng = rand::thread_rng();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for candidate in candidates {
        let raw = RawValue::from(Value::Object(candidate));
        let alert = normalizer.normalize_at(&raw, &overrides, Some(&timestamps), now, &mut rng);
        serde_json::to_writer(&mut out, &alert)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
