//! Recreate clip timing from a session in another DAW by padding every
//! referenced audio file with silence up to its absolute timeline position.
//!
//! The pipeline reads the coords dump of a session ([`coords`]), optionally
//! drops regions attached to the wrong track ([`validate`]), turns what is
//! left into padding operations ([`plan`]) and either prints or runs them
//! ([`exec`]).

pub mod config;
pub mod coords;
pub mod dump;
pub mod error;
pub mod exec;
pub mod plan;
pub mod region;
pub mod validate;

use std::fs::File;
use std::io::BufReader;

use log::info;

pub use config::{Config, ConfigBuilder, DEFAULT_EXTRACTOR, DEFAULT_PADDER};
pub use coords::{parse_coords, parse_coords_str, HEADER};
pub use dump::{coords_path, load_or_extract, prepare_output_dir, COORDS_FILE};
pub use error::{LineError, PadError, ToolFailure};
pub use exec::{
    emit_commands, execute, PaddingTool, ProgressEvent, ProgressReporter, RetryPolicy, Sox,
    PROGRESS_INTERVAL,
};
pub use plan::{output_file_name, plan_operations};
pub use region::{region_count, PaddingOperation, Region, TrackRegions};
pub use validate::{base_token, validate_regions, MatchCase, Validation};

/// Prepare the output directory, obtain the coords dump and plan every
/// padding operation described by `config`.
pub fn plan_run(config: &Config) -> Result<Vec<PaddingOperation>, PadError> {
    prepare_output_dir(&config.output_dir, config.append)?;
    let dump = load_or_extract(&config.extractor, &config.session, &config.output_dir)?;

    let mut regions = parse_coords(BufReader::new(File::open(&dump)?), config.track_filter)?;
    info!(
        "parsed {} regions on {} tracks",
        region_count(&regions),
        regions.len()
    );

    if config.check {
        regions = validate_regions(regions, config.match_case).retained;
    }

    Ok(plan_operations(&regions, &config.audio_dir, &config.output_dir))
}

/// Plan and execute a run with `tool`, returning the number of files written.
pub fn run_with_progress<T, P>(
    config: &Config,
    tool: &T,
    progress: &mut P,
) -> Result<usize, PadError>
where
    T: PaddingTool + ?Sized,
    P: ProgressReporter + ?Sized,
{
    let operations = plan_run(config)?;
    execute(&operations, tool, config.retry, progress)?;
    Ok(operations.len())
}

/// Locate the configured padding tool and run every operation with it.
pub fn run(config: &Config) -> Result<usize, PadError> {
    struct Silent;
    impl ProgressReporter for Silent {}

    let sox = Sox::locate(&config.padder)?;
    run_with_progress(config, &sox, &mut Silent)
}
