//! Reader for the coords dump printed by the session metadata tool.
//!
//! The dump is free text with one or more region blocks. Each block starts
//! with [`HEADER`] and runs until the next blank line:
//!
//! ```text
//! Track name (Track#) (WAV filename) @ Absolute + Into-sample, Length:
//! `Kick` (2) (kick_01.wav) @ 48000 + 0, 96000
//! `Lead Vox` (5) (Lead Vox_03.wav) @ 96000 + 4800, 12000
//!
//! ```
//!
//! Region lines follow the grammar
//!
//! ```text
//! line   = "`" name "`" ws "(" track ")" ws "(" source ")"
//!          ws "@" ws abs ws "+" ws into ws "," ws len ;
//! source = text up to the last ")" before the final "@", minus any "@..." suffix ;
//! ```
//!
//! Anything outside a block is ignored. A region line that does not match is a
//! hard error carrying its line number. With a track filter, only the name and
//! track number of other tracks' lines are read.

use std::io::BufRead;

use crate::error::{LineError, PadError};
use crate::region::{Region, TrackRegions};

/// Line that opens a block of region lines.
pub const HEADER: &str = "Track name (Track#) (WAV filename) @ Absolute + Into-sample, Length:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Capture {
    Idle,
    Capturing,
}

/// Parse a coords dump, keeping only `track_filter` when one is given.
pub fn parse_coords<R: BufRead>(
    reader: R,
    track_filter: Option<u32>,
) -> Result<TrackRegions, PadError> {
    let mut regions = TrackRegions::new();
    let mut state = Capture::Idle;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        match state {
            Capture::Idle => {
                if trimmed == HEADER {
                    state = Capture::Capturing;
                }
            }
            Capture::Capturing => {
                if trimmed.is_empty() {
                    state = Capture::Idle;
                    continue;
                }
                if trimmed == HEADER {
                    continue;
                }

                let to_error = |reason| PadError::Parse {
                    line_number: index + 1,
                    line: line.clone(),
                    reason,
                };

                let head = LineHead::split(&line).map_err(to_error)?;
                let track = head.track().map_err(to_error)?;
                if track_filter.is_some_and(|wanted| wanted != track) {
                    continue;
                }
                let region = head.into_region(track).map_err(to_error)?;
                regions.entry(track).or_default().push(region);
            }
        }
    }

    Ok(regions)
}

/// Convenience wrapper around [`parse_coords`] for in-memory text.
pub fn parse_coords_str(text: &str, track_filter: Option<u32>) -> Result<TrackRegions, PadError> {
    parse_coords(text.as_bytes(), track_filter)
}

/// Track name and number of a region line. The rest of the line is only
/// split once the track is known to be wanted.
#[derive(Debug)]
struct LineHead<'a> {
    name: &'a str,
    track: &'a str,
    rest: &'a str,
}

impl<'a> LineHead<'a> {
    fn split(line: &'a str) -> Result<Self, LineError> {
        let rest = line
            .trim_start()
            .strip_prefix('`')
            .ok_or(LineError::MissingDelimiter("'`' before the track name"))?;
        let (name, rest) = rest
            .split_once('`')
            .ok_or(LineError::MissingDelimiter("'`' after the track name"))?;

        let rest = rest
            .trim_start()
            .strip_prefix('(')
            .ok_or(LineError::MissingDelimiter("'(' before the track number"))?;
        let (track, rest) = rest
            .split_once(')')
            .ok_or(LineError::MissingDelimiter("')' after the track number"))?;

        Ok(Self { name, track, rest })
    }

    fn track(&self) -> Result<u32, LineError> {
        let token = self.track.trim();
        token.parse().map_err(|_| LineError::NotAnInteger {
            field: "track number",
            token: token.to_owned(),
        })
    }

    fn into_region(self, track: u32) -> Result<Region, LineError> {
        let rest = self
            .rest
            .trim_start()
            .strip_prefix('(')
            .ok_or(LineError::MissingDelimiter("'(' before the source file"))?;
        let (source, positions) = rest
            .rsplit_once('@')
            .ok_or(LineError::MissingDelimiter("'@' before the sample positions"))?;

        let (source, trailing) = source
            .rsplit_once(')')
            .ok_or(LineError::MissingDelimiter("')' after the source file"))?;
        if !trailing.trim().is_empty() {
            return Err(LineError::TrailingText(trailing.trim().to_owned()));
        }
        let source = source.split('@').next().unwrap_or_default().trim();
        if source.is_empty() {
            return Err(LineError::EmptyField("source file"));
        }

        let (absolute, rest) = positions
            .split_once('+')
            .ok_or(LineError::MissingDelimiter("'+' after the absolute position"))?;
        let (into, length) = rest
            .split_once(',')
            .ok_or(LineError::MissingDelimiter("',' before the length"))?;

        Ok(Region {
            track,
            track_name: self.name.to_owned(),
            source_file: source.to_owned(),
            absolute_sample: parse_samples("absolute position", absolute)?,
            into_sample: parse_samples("into-sample offset", into)?,
            length_samples: parse_samples("length", length)?,
        })
    }
}

/// Sample counts are unsigned and must fit an `i64` so padding stays exact.
fn parse_samples(field: &'static str, token: &str) -> Result<u64, LineError> {
    let token = token.trim();
    token
        .parse::<u64>()
        .ok()
        .filter(|value| i64::try_from(*value).is_ok())
        .ok_or_else(|| LineError::NotAnInteger {
            field,
            token: token.to_owned(),
        })
}
