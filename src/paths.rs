use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

const DIMENSIONS_FILE: &str = "dimensions.json";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the per-user config directory: `<config_dir>/gtraid/`
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gtraid"))
}

/// Places searched for the dimensions file, in order.
pub fn dimensions_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from(DIMENSIONS_FILE),
        get_exe_dir().join(DIMENSIONS_FILE),
    ];
    if let Some(dir) = get_config_dir() {
        candidates.push(dir.join(DIMENSIONS_FILE));
    }
    candidates
}

/// Picks the dimensions file: an explicit path wins, otherwise the first
/// candidate that exists, otherwise `dimensions.json` in the working directory.
pub fn resolve_dimensions_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    dimensions_candidates()
        .into_iter()
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(DIMENSIONS_FILE))
}

/// Creates the report directory if it does not exist yet.
pub fn ensure_report_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_dimensions_path_wins() {
        let path = Path::new("/nonexistent/custom.json");
        assert_eq!(resolve_dimensions_path(Some(path)), path.to_path_buf());
    }

    #[test]
    fn test_candidates_start_with_working_dir() {
        let candidates = dimensions_candidates();
        assert_eq!(candidates[0], PathBuf::from(DIMENSIONS_FILE));
        assert_eq!(candidates[1], get_exe_dir().join(DIMENSIONS_FILE));
    }

    #[test]
    fn test_ensure_report_dir() {
        let dir = tempdir().unwrap();
        let report = dir.path().join("report").join("nested");
        ensure_report_dir(&report).unwrap();
        assert!(report.is_dir());
        // Existing directory is fine
        ensure_report_dir(&report).unwrap();
    }
}
