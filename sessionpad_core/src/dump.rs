use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;

use crate::error::PadError;
use crate::exec::check_status;

/// File name of the cached coords dump inside the output directory.
pub const COORDS_FILE: &str = "coords";

/// Create `dir`, refusing to reuse an existing one unless `append` is set.
pub fn prepare_output_dir(dir: &Path, append: bool) -> Result<(), PadError> {
    if dir.exists() {
        if !append {
            return Err(PadError::OutputConflict(dir.to_path_buf()));
        }
        info!("adding to existing output directory '{}'", dir.display());
        return Ok(());
    }

    fs::create_dir_all(dir)?;
    Ok(())
}

/// Path of the coords dump for `output_dir`.
pub fn coords_path(output_dir: &Path) -> PathBuf {
    output_dir.join(COORDS_FILE)
}

/// Return the coords dump for `session`, running `extractor` only when no
/// cached dump exists in `output_dir`.
///
/// A cached dump that is empty is an error; it usually means an earlier
/// extraction went wrong and should be removed by hand.
pub fn load_or_extract(
    extractor: &Path,
    session: &Path,
    output_dir: &Path,
) -> Result<PathBuf, PadError> {
    let path = coords_path(output_dir);

    if path.exists() {
        if fs::metadata(&path)?.len() == 0 {
            return Err(PadError::EmptyDump(path));
        }
        info!("using existing coords file '{}'", path.display());
        return Ok(path);
    }

    info!("{} {}", extractor.display(), session.display());
    let output = Command::new(extractor)
        .arg(session)
        .output()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PadError::ToolNotFound {
                program: extractor.to_path_buf(),
            },
            _ => PadError::Io(err),
        })?;

    check_status(&output).map_err(|failure| PadError::ExtractionFailed {
        program: extractor.to_path_buf(),
        status: failure.status,
        stderr: failure.stderr,
    })?;

    if output.stdout.is_empty() {
        return Err(PadError::EmptyDump(path));
    }

    fs::write(&path, &output.stdout)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_output_dir() {
        let root = tempdir().unwrap();
        let dir = root.path().join("nested").join("out");

        prepare_output_dir(&dir, false).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn existing_output_dir_needs_append() {
        let root = tempdir().unwrap();

        let err = prepare_output_dir(root.path(), false).unwrap_err();
        assert!(matches!(err, PadError::OutputConflict(path) if path == root.path()));
        prepare_output_dir(root.path(), true).unwrap();
    }

    #[test]
    fn reuses_cached_dump_without_running_extractor() {
        let root = tempdir().unwrap();
        fs::write(coords_path(root.path()), "cached\n").unwrap();

        let path = load_or_extract(
            Path::new("/no/such/ptftool"),
            Path::new("session.ptx"),
            root.path(),
        )
        .unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "cached\n");
    }

    #[test]
    fn empty_cached_dump_is_fatal() {
        let root = tempdir().unwrap();
        fs::write(coords_path(root.path()), "").unwrap();

        let err = load_or_extract(Path::new("ptftool"), Path::new("s.ptx"), root.path())
            .unwrap_err();
        assert!(matches!(err, PadError::EmptyDump(_)));
    }

    #[test]
    fn missing_extractor_is_reported() {
        let root = tempdir().unwrap();

        let err = load_or_extract(
            Path::new("/no/such/ptftool"),
            Path::new("s.ptx"),
            root.path(),
        )
        .unwrap_err();
        assert!(matches!(err, PadError::ToolNotFound { .. }));
        assert!(!coords_path(root.path()).exists());
    }
}
