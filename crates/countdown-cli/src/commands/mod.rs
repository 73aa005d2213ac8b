pub mod calc;
pub mod run;

use countdown_core::DateInput;

/// Read a date argument as epoch milliseconds when numeric, otherwise as a
/// date string for the core parser.
pub fn parse_date_arg(raw: &str) -> DateInput {
    raw.parse::<i64>()
        .map(DateInput::Timestamp)
        .unwrap_or_else(|_| DateInput::Text(raw.to_string()))
}
