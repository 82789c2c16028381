/// Main entry point for the synthetic feed generator
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use synthfeed::{
    config::{build_calendars, build_registry, build_requests, load_config},
    data::{DefaultSliceFactory, PriceCurve, SyntheticHistoryProvider},
    events::TracingObserver,
    securities::SecurityLookup,
    time::parse_time_zone,
    utils::SliceDigest,
    PriceUpdate,
};

/// Generate deterministic synthetic market data from a TOML config
#[derive(Parser, Debug)]
#[command(name = "synthfeed", version, about = "Deterministic synthetic market data generator")]
struct Args {
    /// Path to the TOML config
    #[arg(default_value = "config.toml")]
    config: String,

    /// Write JSON Lines here instead of `output_path` or stdout
    #[arg(long, value_name = "FILE")]
    out: Option<String>,

    /// Print the SHA-256 fingerprint of the generated slices
    #[arg(long)]
    digest: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config).with_context(|| format!("loading {}", args.config))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("🚀 Starting synthfeed with {}", args.config);

    let display_time_zone = parse_time_zone(&config.display_time_zone)?;
    let calendars = build_calendars(&config)?;
    let requests = build_requests(&config, &calendars)?;
    let mut registry = build_registry(&config)?;
    let curve = PriceCurve::from_config(&config.price_curve)?;

    for request in &requests {
        if registry.try_get(&request.symbol).is_none() {
            warn!("⚠️  {} is not in the security registry, its bars will be skipped", request.symbol);
        }
    }

    let out_path = args.out.clone().or_else(|| config.output_path.clone());
    let sink: Box<dyn Write> = match &out_path {
        Some(path) => Box::new(File::create(path).with_context(|| format!("creating {}", path))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(sink);

    let factory = DefaultSliceFactory;
    let observer = TracingObserver;
    let mut digest = SliceDigest::new();
    let mut latest: BTreeMap<String, PriceUpdate> = BTreeMap::new();

    let (slice_count, data_point_count) = {
        let provider = SyntheticHistoryProvider::new(&registry, &factory)
            .with_alignment(config.alignment)
            .with_curve(curve)
            .with_observer(&observer);
        let mut stream = provider.get_history(&requests, display_time_zone)?;

        for slice in stream.by_ref() {
            serde_json::to_writer(&mut writer, &slice)?;
            writer.write_all(b"\n")?;
            digest.update(&slice);
            for update in slice.price_updates() {
                latest.insert(update.symbol.clone(), update);
            }
        }
        (stream.slice_count(), stream.data_point_count())
    };
    writer.flush()?;

    let updates: Vec<PriceUpdate> = latest.into_values().collect();
    let updated = registry.apply_price_updates(&updates);

    info!(
        "✅ Generated {} slices, {} data points, {} securities priced",
        slice_count, data_point_count, updated
    );
    if let Some(path) = &out_path {
        info!("💾 Slices written to {}", path);
    }

    // stdout may be the slice stream
    if args.digest {
        eprintln!("digest: {}", digest.finalize());
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["synthfeed"]).unwrap();
        assert_eq!(args.config, "config.toml");
        assert!(args.out.is_none());
        assert!(!args.digest);
    }

    #[test]
    fn test_args_flags_and_config() {
        let args = Args::try_parse_from(["synthfeed", "demo.toml", "--out", "slices.jsonl", "--digest"]).unwrap();
        assert_eq!(args.config, "demo.toml");
        assert_eq!(args.out.as_deref(), Some("slices.jsonl"));
        assert!(args.digest);
    }

    #[test]
    fn test_help_and_unknown_flags() {
        let help = Args::try_parse_from(["synthfeed", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

        let short = Args::try_parse_from(["synthfeed", "-h"]).unwrap_err();
        assert_eq!(short.kind(), clap::error::ErrorKind::DisplayHelp);

        let unknown = Args::try_parse_from(["synthfeed", "--bogus"]).unwrap_err();
        assert_eq!(unknown.kind(), clap::error::ErrorKind::UnknownArgument);

        assert!(Args::try_parse_from(["synthfeed", "--out"]).is_err());
    }
}
