use std::collections::BTreeMap;
use std::path::PathBuf;

/// One clip instance placed on a track of the session timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Track number stated on the source line.
    pub track: u32,
    /// Display name of the track/region.
    pub track_name: String,
    /// File name of the referenced audio, relative to the audio source directory.
    pub source_file: String,
    /// Timeline position of the clip start, in samples.
    pub absolute_sample: u64,
    /// Offset into the source file where playback begins, in samples.
    pub into_sample: u64,
    /// Length of the clip in samples.
    pub length_samples: u64,
}

impl Region {
    /// Silence to prepend so that the source content lands on `absolute_sample`.
    ///
    /// Negative results are returned as-is; they point at bad offsets upstream.
    pub fn pad_samples(&self) -> i64 {
        // Parsed positions never exceed i64::MAX.
        self.absolute_sample as i64 - self.into_sample as i64
    }
}

/// Regions grouped by track number, each list in dump order.
pub type TrackRegions = BTreeMap<u32, Vec<Region>>;

/// Total number of regions across all tracks.
pub fn region_count(regions: &TrackRegions) -> usize {
    regions.values().map(Vec::len).sum()
}

/// A single invocation of the padding tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaddingOperation {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pad_samples: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(absolute_sample: u64, into_sample: u64) -> Region {
        Region {
            track: 1,
            track_name: "Kick".to_owned(),
            source_file: "kick_01.wav".to_owned(),
            absolute_sample,
            into_sample,
            length_samples: 10,
        }
    }

    #[test]
    fn pad_samples_subtracts_into_offset() {
        assert_eq!(region(48_000, 0).pad_samples(), 48_000);
        assert_eq!(region(48_000, 1_000).pad_samples(), 47_000);
    }

    #[test]
    fn pad_samples_keeps_negative_results() {
        assert_eq!(region(100, 250).pad_samples(), -150);
    }

    #[test]
    fn region_count_sums_every_track() {
        let mut regions = TrackRegions::new();
        regions.insert(1, vec![region(0, 0), region(1, 0)]);
        regions.insert(4, vec![region(2, 0)]);
        assert_eq!(region_count(&regions), 3);
        assert_eq!(region_count(&TrackRegions::new()), 0);
    }
}
