//! Heuristic check that a region's source file belongs to its track.
//!
//! The metadata tool occasionally attaches a region to the wrong track. Such
//! regions are easy to spot because the audio file name no longer starts with
//! the track name. Both names are reduced to a base token and the file token
//! must start with the track token. Anything else is dropped, including every
//! region of a track whose name has no token at all.

use log::{info, warn};

use crate::region::{region_count, Region, TrackRegions};

/// How track and file base tokens are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchCase {
    /// Literal prefix test.
    #[default]
    Sensitive,
    /// Prefix test on ASCII-lowercased tokens.
    Insensitive,
}

/// Outcome of [`validate_regions`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    /// Regions that passed, grouped as in the input.
    pub retained: TrackRegions,
    /// Regions that failed, in input order.
    pub rejected: Vec<Region>,
    /// Number of regions examined.
    pub total: usize,
}

impl Validation {
    pub fn retained_count(&self) -> usize {
        region_count(&self.retained)
    }
}

/// Reduce a track or file name to the token used for comparison.
///
/// Spaces become `_`, then the text is cut at the first `.`.
pub fn base_token(name: &str) -> String {
    let replaced = name.replace(' ', "_");
    replaced.split('.').next().unwrap_or_default().to_owned()
}

/// Whether `region` looks like it was recorded on the track it is attached to.
pub fn region_matches_track(region: &Region, match_case: MatchCase) -> bool {
    let track = base_token(&region.track_name);
    if track.is_empty() {
        return false;
    }
    let file = base_token(&region.source_file);
    match match_case {
        MatchCase::Sensitive => file.starts_with(&track),
        MatchCase::Insensitive => file
            .to_ascii_lowercase()
            .starts_with(&track.to_ascii_lowercase()),
    }
}

/// Split `regions` into retained and rejected sets, logging every rejection.
///
/// Tracks left without any region are removed from the retained mapping.
pub fn validate_regions(regions: TrackRegions, match_case: MatchCase) -> Validation {
    let total = region_count(&regions);
    let mut retained = TrackRegions::new();
    let mut rejected = Vec::new();

    for (track, list) in regions {
        for region in list {
            if region_matches_track(&region, match_case) {
                retained.entry(track).or_insert_with(Vec::new).push(region);
            } else {
                rejected.push(region);
            }
        }
    }

    if !rejected.is_empty() {
        warn!("rejecting the following regions:");
        for region in &rejected {
            warn!(
                "\ttrack {}\t{}\t{}\t{}\t{}\t{}",
                region.track,
                region.track_name,
                region.source_file,
                region.absolute_sample,
                region.into_sample,
                region.length_samples
            );
        }
    }

    let validation = Validation {
        retained,
        rejected,
        total,
    };
    info!(
        "retained {} of {} regions",
        validation.retained_count(),
        validation.total
    );
    validation
}
