/// Show the bucket plan for a config without generating bars
use clap::Parser;
use synthfeed::{
    config::{build_calendars, build_requests, load_config},
    data::BucketPlanner,
    time::{convert_from_utc, parse_time_zone},
};

/// Print the bucket plan a config would produce
#[derive(Parser, Debug)]
#[command(name = "show_plan", version, about = "Show the bucket plan for a synthfeed config")]
struct Args {
    /// Path to the TOML config
    #[arg(default_value = "config.toml")]
    config: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    let display_time_zone = parse_time_zone(&config.display_time_zone)?;
    let calendars = build_calendars(&config)?;
    let requests = build_requests(&config, &calendars)?;
    let plan = BucketPlanner::new().with_alignment(config.alignment).plan(&requests)?;

    println!("📊 Bucket Plan");
    println!("==============\n");
    println!("   Requests:  {}", plan.request_count());
    println!("   Bar size:  {}s", plan.bar_size().num_seconds());
    println!("   Span:      {} -> {}", plan.start_utc(), plan.end_utc());
    println!("   Buckets:   {}", plan.len());
    println!("   Configs:   {}\n", plan.config_count());

    if plan.is_empty() {
        println!("⚠️  No bucket has an open market for any request");
        return Ok(());
    }

    for bucket in plan.iter() {
        let symbols: Vec<&str> = bucket.configs.iter().map(|c| c.symbol.as_str()).collect();
        println!(
            "   {} ({})  {}",
            bucket.time_utc.format("%Y-%m-%d %H:%M:%S"),
            convert_from_utc(bucket.time_utc, display_time_zone).format("%H:%M:%S"),
            if symbols.is_empty() { "-".to_string() } else { symbols.join(", ") }
        );
    }

    Ok(())
}
