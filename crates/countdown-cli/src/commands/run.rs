use std::error::Error;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use countdown_core::{Countdown, CountdownConfig, CountdownHooks, DateInput};
use tracing::{debug, warn};

use super::parse_date_arg;

#[derive(Args)]
pub struct RunArgs {
    /// Target date (RFC 3339 or RFC 2822) or epoch milliseconds
    #[arg(required_unless_present = "secs")]
    pub date: Option<String>,
    /// Count down this many seconds from now instead of an absolute date
    #[arg(long, conflicts_with = "date")]
    pub secs: Option<u64>,
    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
    /// Fractional-second digits to keep (clamped to 0-20)
    #[arg(long, default_value_t = 0)]
    pub precision: u32,
    /// Keep counting past zero instead of stopping (runs until interrupted)
    #[arg(long)]
    pub overtime: bool,
    /// Mount inactive and start only after this many seconds
    #[arg(long)]
    pub start_after_secs: Option<u64>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_countdown(args))
}

/// Drive the engine the way any host does: mount it, then call `tick` at
/// the advertised interval until the engine stops advertising one.
async fn run_countdown(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let date = match (&args.date, args.secs) {
        (Some(raw), _) => parse_date_arg(raw),
        (None, Some(secs)) => {
            DateInput::Timestamp(Utc::now().timestamp_millis() + secs as i64 * 1_000)
        }
        (None, None) => return Err("either a date or --secs is required".into()),
    };

    let mut config = CountdownConfig::new(date);
    config.interval = Duration::from_millis(args.interval_ms);
    config.precision = args.precision;
    config.overtime = args.overtime;
    config.auto_start = args.start_after_secs.is_none();

    let countdown = Countdown::new(config)?;
    countdown.set_hooks(CountdownHooks::new().on_event(|event| {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(%err, "failed to serialize event"),
        }
    }));

    countdown.mount();

    if let Some(delay) = args.start_after_secs {
        debug!(delay, "delaying start");
        tokio::time::sleep(Duration::from_secs(delay)).await;
        countdown.start();
    }

    while let Some(interval) = countdown.tick_interval() {
        tokio::time::sleep(interval).await;
        countdown.tick();
    }

    println!("{}", serde_json::to_string(&countdown.snapshot())?);
    countdown.unmount();
    Ok(())
}
