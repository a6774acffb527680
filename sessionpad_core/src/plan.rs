use std::path::Path;

use crate::region::{PaddingOperation, Region, TrackRegions};

/// Turn parsed regions into padding operations, one per region.
///
/// Tracks are visited in ascending order and regions in dump order. The
/// position of a region inside its track is folded into the output name, so
/// repeated track names and source files never produce the same path.
pub fn plan_operations(
    regions: &TrackRegions,
    audio_dir: &Path,
    output_dir: &Path,
) -> Vec<PaddingOperation> {
    regions
        .iter()
        .flat_map(|(&track, list)| {
            list.iter().enumerate().map(move |(index, region)| {
                plan_operation(track, index, region, audio_dir, output_dir)
            })
        })
        .collect()
}

fn plan_operation(
    track: u32,
    index: usize,
    region: &Region,
    audio_dir: &Path,
    output_dir: &Path,
) -> PaddingOperation {
    PaddingOperation {
        input_path: audio_dir.join(&region.source_file),
        output_path: output_dir.join(output_file_name(track, index, region)),
        pad_samples: region.pad_samples(),
    }
}

/// Name of the padded file for the `index`-th region of `track`.
///
/// The `({track})_{index}_` prefix can be read back unambiguously, which is
/// what keeps names unique within one output directory.
pub fn output_file_name(track: u32, index: usize, region: &Region) -> String {
    let name = flatten_path_chars(&region.track_name.replace(' ', "_"));
    let source = flatten_path_chars(&region.source_file.replace(' ', ""));
    format!("({track})_{index}_{name}__{source}")
}

fn flatten_path_chars(value: &str) -> String {
    value.replace(['/', '\\'], "_")
}
