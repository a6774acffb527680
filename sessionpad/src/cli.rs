use std::path::PathBuf;
use std::time::Duration;

use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};
use sessionpad_core::{DEFAULT_EXTRACTOR, DEFAULT_PADDER};

/// Parse a retry delay such as `500ms`, `2s` or `1m30s` into a [`Duration`].
///
/// Supported suffixes are `ms`, `s` and `m`. Components may be chained and a
/// zero delay is allowed.
pub fn parse_delay(value: &str) -> Result<Duration, String> {
    let input = value.trim();
    if input.is_empty() {
        return Err("delay cannot be empty".into());
    }

    let invalid = || format!("invalid delay '{value}'");
    let mut total_ms: u64 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let number = rest[..digits].parse::<u64>().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let (unit_len, factor) = if rest.starts_with("ms") {
            (2, 1)
        } else if rest.starts_with('s') {
            (1, 1_000)
        } else if rest.starts_with('m') {
            (1, 60_000)
        } else {
            return Err(invalid());
        };
        rest = &rest[unit_len..];

        total_ms = number
            .checked_mul(factor)
            .and_then(|component| total_ms.checked_add(component))
            .ok_or_else(|| "delay is too large".to_owned())?;
    }

    Ok(Duration::from_millis(total_ms))
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Pad session audio files with silence to recreate clip timing in another DAW")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("session")
                .value_name("SESSION")
                .help("Session file to read region placement from")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("audio_dir")
                .value_name("AUDIO_DIR")
                .help("Directory containing the audio referenced by the session")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output_dir")
                .value_name("OUTPUT_DIR")
                .help("Directory for the padded files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("exe")
                .short('x')
                .long("exe")
                .value_name("PATH")
                .help("Location of the session metadata tool")
                .default_value(DEFAULT_EXTRACTOR)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("sox")
                .long("sox")
                .value_name("PATH")
                .help("Location of the sox binary")
                .default_value(DEFAULT_PADDER)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("track")
                .short('t')
                .long("track")
                .value_name("N")
                .help("Only process this track number")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the sox commands instead of running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help(
                    "Drop regions whose file name does not start like their track name; \
                     renamed tracks will lose all their regions",
                )
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-case")
                .long("ignore-case")
                .help("Compare track and file names case-insensitively with --check")
                .requires("check")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("add")
                .long("add")
                .help("Write into OUTPUT_DIR even if it already exists")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .value_name("N")
                .help("Retry a failing sox command up to N times")
                .default_value("0")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("retry-delay")
                .long("retry-delay")
                .value_name("DURATION")
                .help("Wait before the first retry, doubled each time (e.g. 500ms, 2s)")
                .default_value("500ms")
                .value_parser(ValueParser::new(parse_delay)),
        )
}
