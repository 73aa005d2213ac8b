use clap::Args;
use countdown_core::{calc_time_delta, format_time_delta, FormatOptions, TimeDeltaOptions};

use super::parse_date_arg;

#[derive(Args)]
pub struct CalcArgs {
    /// Target date (RFC 3339 or RFC 2822) or epoch milliseconds
    pub date: String,
    /// Treat DATE as a remaining duration in milliseconds
    #[arg(long)]
    pub duration: bool,
    /// Fractional-second digits to keep (clamped to 0-20)
    #[arg(long, default_value_t = 0)]
    pub precision: u32,
    /// Allow the delta to go negative past the target
    #[arg(long)]
    pub overtime: bool,
    /// Fold days into the hours field
    #[arg(long)]
    pub days_in_hours: bool,
    /// Zero-pad width for the time fields
    #[arg(long, default_value_t = 2)]
    pub zero_pad: usize,
}

pub fn run(args: CalcArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target_ms = parse_date_arg(&args.date).resolve_ms()?;
    let delta = calc_time_delta(
        target_ms,
        &TimeDeltaOptions {
            precision: args.precision,
            controlled: args.duration,
            overtime: args.overtime,
            ..Default::default()
        },
    );
    let formatted = format_time_delta(
        &delta,
        &FormatOptions {
            days_in_hours: args.days_in_hours,
            zero_pad_time: args.zero_pad,
            zero_pad_days: None,
        },
    );

    let output = serde_json::json!({
        "delta": delta,
        "formatted": formatted,
        "display": formatted.to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
