use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collector::{AddOutcome, ReportSession};

/// Get the default directory for finished reports
pub fn get_default_reports_dir() -> Result<PathBuf> {
    let base = dirs::document_dir()
        .or_else(dirs::data_local_dir)
        .context("Could not determine a documents or local data directory")?;

    Ok(base.join("knowhow-reports"))
}

/// Load points from a text file, one per line.
///
/// Blank lines are skipped, as they would be in the form. A line that is
/// just `#` or starts with `# ` is a comment; `#1 ranked tool` is a point.
pub fn load_points(filepath: &Path) -> Result<ReportSession> {
    if !filepath.exists() {
        anyhow::bail!("Points file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read points file: {}", filepath.display()))?;

    let mut session = ReportSession::new();
    for line in content.lines() {
        if is_comment(line) {
            continue;
        }
        if let AddOutcome::Added(n) = session.add(line.trim()) {
            tracing::debug!(point = n, "loaded point");
        }
    }

    if session.is_empty() {
        anyhow::bail!(
            "Points file {} contains no points. Add at least one non-empty line.",
            filepath.display()
        );
    }

    Ok(session)
}

fn is_comment(line: &str) -> bool {
    let line = line.trim();
    line == "#" || line.starts_with("# ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_points_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        fs::write(
            &path,
            "# Cloud Native session\nIntro to Docker\n\n   \nHands-on with containers  \n",
        )
        .unwrap();

        let session = load_points(&path).unwrap();
        assert_eq!(session.list(), ["Intro to Docker", "Hands-on with containers"]);
    }

    #[test]
    fn test_hash_prefixed_point_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        fs::write(&path, "#\n# heading\n#1 ranked tool\n#rust session\n").unwrap();

        let session = load_points(&path).unwrap();
        assert_eq!(session.list(), ["#1 ranked tool", "#rust session"]);
    }

    #[test]
    fn test_load_points_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        fs::write(&path, "\n# nothing\n").unwrap();
        assert!(load_points(&path)
            .unwrap_err()
            .to_string()
            .contains("contains no points"));
    }

    #[test]
    fn test_load_points_missing_file() {
        let err = load_points(Path::new("/nonexistent/points.txt")).unwrap_err();
        assert!(err.to_string().contains("Points file not found"));
    }
}
