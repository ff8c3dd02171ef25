//! Idempotent in-place patching of generated regions
//!
//! Each target file keeps hand-written code around one or more generated
//! regions delimited by literal marker lines. Patching replaces the text
//! from the start marker through the end marker with a freshly generated
//! body; a body that no longer contains its own markers is rejected, since
//! writing it would strand the region for every later run.
//!
//! An unchanged file still gets its mtime bumped so make-style build
//! systems see the generation step as done.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Result of patching one region of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The region already held exactly the generated body
    Unchanged,
    /// The patched text
    Changed(String),
}

/// One generated region to splice into a target file
#[derive(Debug, Clone)]
pub struct Region<'a> {
    /// Literal start marker, matched as a substring
    pub start: &'a str,
    /// Literal end marker, matched as a substring after the start
    pub end: &'a str,
    /// Replacement text, spanning start marker through end marker
    pub body: &'a str,
}

/// Replaces the text between `start` and `end` (inclusive) with `body`.
///
/// `path_label` only feeds error messages. The end marker is searched
/// from the start marker's position, so an identical marker earlier in
/// the file does not confuse the splice.
pub fn patch_region(
    source: &str,
    start: &str,
    end: &str,
    body: &str,
    path_label: &str,
) -> Result<PatchOutcome> {
    let start_idx = source.find(start).ok_or_else(|| Error::MarkerNotFound {
        marker: start.to_string(),
        path: path_label.to_string(),
    })?;
    let end_idx = source[start_idx..]
        .find(end)
        .map(|i| start_idx + i)
        .ok_or_else(|| Error::MarkerNotFound {
            marker: end.to_string(),
            path: path_label.to_string(),
        })?;

    // a body missing its own markers would break the next run
    let body_start = body.find(start).ok_or_else(|| Error::MarkerLostInBody {
        marker: start.to_string(),
        path: path_label.to_string(),
    })?;
    if body[body_start..].find(end).is_none() {
        return Err(Error::MarkerLostInBody {
            marker: end.to_string(),
            path: path_label.to_string(),
        });
    }

    let mut patched = String::with_capacity(source.len() + body.len());
    patched.push_str(&source[..start_idx]);
    patched.push_str(body);
    patched.push_str(&source[end_idx + end.len()..]);

    if patched == source {
        Ok(PatchOutcome::Unchanged)
    } else {
        Ok(PatchOutcome::Changed(patched))
    }
}

/// Applies all regions to one file, writing only when something changed.
///
/// Returns true if the file was rewritten (or would be, under `dry_run`).
pub fn patch_file(path: &Path, regions: &[Region<'_>], dry_run: bool) -> Result<bool> {
    let label = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|e| Error::io(&label, e))?;

    let mut patched = source.clone();
    for region in regions {
        if let PatchOutcome::Changed(next) =
            patch_region(&patched, region.start, region.end, region.body, &label)?
        {
            patched = next;
        }
    }

    if patched == source {
        debug!(path = %label, "already up to date");
        if !dry_run {
            touch(path, &label)?;
        }
        return Ok(false);
    }
    if dry_run {
        info!(path = %label, "patch (dry run)");
        return Ok(true);
    }
    fs::write(path, &patched).map_err(|e| Error::io(&label, e))?;
    info!(path = %label, "patch");
    Ok(true)
}

// bump mtime so build systems consider the file regenerated
fn touch(path: &Path, label: &str) -> Result<()> {
    let file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| Error::io(label, e))?;
    file.set_modified(SystemTime::now())
        .map_err(|e| Error::io(label, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
#include \"op.h\"

typedef enum IROp {
  OpOld,
} IROp;

void unrelated() {}
";

    const BODY: &str = "typedef enum IROp {\n  OpNew,\n} IROp;";

    #[test]
    fn test_replaces_between_markers() {
        let out = patch_region(SOURCE, "typedef enum IROp {", "} IROp;", BODY, "op.h").unwrap();
        match out {
            PatchOutcome::Changed(text) => {
                assert!(text.contains("  OpNew,"));
                assert!(!text.contains("  OpOld,"));
                // surrounding hand-written code untouched
                assert!(text.starts_with("#include \"op.h\"\n"));
                assert!(text.ends_with("void unrelated() {}\n"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_idempotent_patch_reports_unchanged() {
        let patched = match patch_region(SOURCE, "typedef enum IROp {", "} IROp;", BODY, "op.h") {
            Ok(PatchOutcome::Changed(text)) => text,
            other => panic!("unexpected outcome: {other:?}"),
        };
        let again = patch_region(&patched, "typedef enum IROp {", "} IROp;", BODY, "op.h").unwrap();
        assert_eq!(again, PatchOutcome::Unchanged);
    }

    #[test]
    fn test_missing_start_marker() {
        let err = patch_region(SOURCE, "typedef enum Missing {", "} IROp;", BODY, "op.h")
            .unwrap_err();
        assert!(matches!(err, Error::MarkerNotFound { .. }));
    }

    #[test]
    fn test_end_marker_searched_after_start() {
        // an end marker only before the start marker does not count
        let source = "} IROp;\ntypedef enum IROp {\n  OpOld,\n";
        let err = patch_region(source, "typedef enum IROp {", "} IROp;", BODY, "op.h").unwrap_err();
        match err {
            Error::MarkerNotFound { marker, .. } => assert_eq!(marker, "} IROp;"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_body_must_keep_markers() {
        let err = patch_region(SOURCE, "typedef enum IROp {", "} IROp;", "enum { OpNew };", "op.h")
            .unwrap_err();
        assert!(matches!(err, Error::MarkerLostInBody { .. }));
    }

    #[test]
    fn test_patch_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("opgen_patch_test_{}.h", std::process::id()));
        fs::write(&path, SOURCE).unwrap();

        let regions = [Region {
            start: "typedef enum IROp {",
            end: "} IROp;",
            body: BODY,
        }];
        assert!(patch_file(&path, &regions, false).unwrap());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("  OpNew,"));

        // second run finds nothing to do
        assert!(!patch_file(&path, &regions, false).unwrap());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let path = std::env::temp_dir().join(format!("opgen_dry_run_test_{}.h", std::process::id()));
        fs::write(&path, SOURCE).unwrap();

        let regions = [Region {
            start: "typedef enum IROp {",
            end: "} IROp;",
            body: BODY,
        }];
        assert!(patch_file(&path, &regions, true).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), SOURCE);

        fs::remove_file(&path).unwrap();
    }
}
