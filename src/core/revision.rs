use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Stored when no source-control revision can be determined
pub const REVISION_UNAVAILABLE: &str = "N/A";

/// Best-effort `git rev-parse HEAD` for the repository enclosing `dir`
pub fn detect_revision(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if revision.is_empty() {
                REVISION_UNAVAILABLE.to_string()
            } else {
                revision
            }
        }
        Ok(output) => {
            debug!("git rev-parse exited with {} in {}", output.status, dir.display());
            REVISION_UNAVAILABLE.to_string()
        }
        Err(e) => {
            debug!("git unavailable for {}: {}", dir.display(), e);
            REVISION_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_yields_sentinel() {
        let revision = detect_revision(Path::new("/definitely/not/a/real/dir"));
        assert_eq!(revision, REVISION_UNAVAILABLE);
    }
}
