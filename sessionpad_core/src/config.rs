use std::path::{Path, PathBuf};

use crate::error::PadError;
use crate::exec::RetryPolicy;
use crate::validate::MatchCase;

/// Default name of the session metadata extraction tool.
pub const DEFAULT_EXTRACTOR: &str = "ptftool";
/// Default name of the padding tool.
pub const DEFAULT_PADDER: &str = "sox";

/// Settings for one padding run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Session file handed to the extraction tool.
    pub session: PathBuf,
    /// Directory holding the audio files referenced by the session.
    pub audio_dir: PathBuf,
    /// Directory receiving the padded files and the cached dump.
    pub output_dir: PathBuf,
    /// Extraction tool executable.
    pub extractor: PathBuf,
    /// Padding tool executable.
    pub padder: PathBuf,
    /// Only process this track number.
    pub track_filter: Option<u32>,
    /// Drop regions whose file does not look like it belongs to the track.
    pub check: bool,
    pub match_case: MatchCase,
    /// Allow writing into an existing output directory.
    pub append: bool,
    pub retry: RetryPolicy,
}

impl Config {
    /// Start building a [`Config`] with default tools and no filtering.
    pub fn builder<S, A, O>(session: S, audio_dir: A, output_dir: O) -> ConfigBuilder
    where
        S: AsRef<Path>,
        A: AsRef<Path>,
        O: AsRef<Path>,
    {
        ConfigBuilder {
            session: session.as_ref().to_path_buf(),
            audio_dir: audio_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            extractor: PathBuf::from(DEFAULT_EXTRACTOR),
            padder: PathBuf::from(DEFAULT_PADDER),
            track_filter: None,
            check: false,
            match_case: MatchCase::default(),
            append: false,
            retry: RetryPolicy::none(),
        }
    }
}

/// Builder returned by [`Config::builder`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    session: PathBuf,
    audio_dir: PathBuf,
    output_dir: PathBuf,
    extractor: PathBuf,
    padder: PathBuf,
    track_filter: Option<u32>,
    check: bool,
    match_case: MatchCase,
    append: bool,
    retry: RetryPolicy,
}

impl ConfigBuilder {
    pub fn extractor<P: Into<PathBuf>>(mut self, extractor: P) -> Self {
        self.extractor = extractor.into();
        self
    }

    pub fn padder<P: Into<PathBuf>>(mut self, padder: P) -> Self {
        self.padder = padder.into();
        self
    }

    pub fn track_filter(mut self, track: Option<u32>) -> Self {
        self.track_filter = track;
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn match_case(mut self, match_case: MatchCase) -> Self {
        self.match_case = match_case;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the input paths and produce the final [`Config`].
    ///
    /// The output directory is not touched here; see
    /// [`prepare_output_dir`](crate::prepare_output_dir).
    pub fn build(self) -> Result<Config, PadError> {
        if !self.session.is_file() {
            return Err(PadError::MissingSession(self.session));
        }
        if !self.audio_dir.is_dir() {
            return Err(PadError::MissingAudioDir(self.audio_dir));
        }

        Ok(Config {
            session: self.session,
            audio_dir: self.audio_dir,
            output_dir: self.output_dir,
            extractor: self.extractor,
            padder: self.padder,
            track_filter: self.track_filter,
            check: self.check,
            match_case: self.match_case,
            append: self.append,
            retry: self.retry,
        })
    }
}
