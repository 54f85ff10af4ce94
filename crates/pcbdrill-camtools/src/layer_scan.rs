//! Directory classifier.
//!
//! Scans one directory (not recursive), sorts its regular files by name, and
//! tags each file with a recognized extension as a decoded Gerber layer or an
//! unparsed drill/text file. Files with other extensions are left out.

use crate::gerber::{GerberArtifact, GerberDecoder, GerberFileDecoder, LayerKindHint};
use pcbdrill_core::{Error, LayerKind, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions decoded as Gerber artwork
pub const GERBER_EXTENSIONS: &[&str] = &[
    "gbr", "grb", "gtl", "gbl", "gts", "gbs", "gto", "gbo", "gtp", "gbp", "gko", "gm1",
];

/// Extensions collected as drill or plain-text files, never decoded as Gerber
pub const DRILL_EXTENSIONS: &[&str] = &["drl", "xln", "txt"];

/// What to do when the decoder returns any error for a file with a Gerber extension
/// (unreadable file or invalid content)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GerberFailurePolicy {
    /// Fail the whole scan with the decode error
    #[default]
    Abort,
    /// Log a warning and leave the file out of the results
    Skip,
}

/// Extension family of a scanned file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFamily {
    Gerber,
    Drill,
}

impl FileFamily {
    /// Classify `path` by extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if GERBER_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Gerber)
        } else if DRILL_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Drill)
        } else {
            None
        }
    }
}

/// Payload of a scanned file
#[derive(Debug)]
pub enum LayerPayload {
    /// Decoded Gerber layer
    ParsedGerber(Box<dyn GerberArtifact>),
    /// Drill or text file, not decoded
    Unparsed,
}

/// One file found by a directory scan
#[derive(Debug)]
pub struct LayerRecord {
    file_path: PathBuf,
    payload: LayerPayload,
}

impl LayerRecord {
    /// Record for a decoded Gerber layer
    pub fn gerber(file_path: PathBuf, artifact: Box<dyn GerberArtifact>) -> Self {
        Self {
            file_path,
            payload: LayerPayload::ParsedGerber(artifact),
        }
    }

    /// Record for a drill or text file
    pub fn unparsed(file_path: PathBuf) -> Self {
        Self {
            file_path,
            payload: LayerPayload::Unparsed,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn payload(&self) -> &LayerPayload {
        &self.payload
    }

    /// The decoded Gerber layer, if any
    pub fn artifact(&self) -> Option<&dyn GerberArtifact> {
        match &self.payload {
            LayerPayload::ParsedGerber(artifact) => Some(&**artifact),
            LayerPayload::Unparsed => None,
        }
    }

    /// Kind read back from the decoded layer; `Other` for unparsed files
    pub fn layer_kind(&self) -> LayerKind {
        match &self.payload {
            LayerPayload::ParsedGerber(artifact) => artifact.layer_kind(),
            LayerPayload::Unparsed => LayerKind::Other,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self.payload, LayerPayload::Unparsed)
    }

    /// `"<file name> [<KIND>]"`
    pub fn display_label(&self) -> String {
        let name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        format!("{} [{}]", name, self.layer_kind())
    }
}

/// Scan `path` with the default Gerber decoder, aborting on the first decode failure
pub fn scan_directory(path: &Path) -> Result<Vec<LayerRecord>> {
    scan_directory_with(path, &GerberFileDecoder, GerberFailurePolicy::Abort)
}

/// Scan `path` with any [`GerberDecoder`] and an explicit failure policy
pub fn scan_directory_with(
    path: &Path,
    decoder: &dyn GerberDecoder,
    policy: GerberFailurePolicy,
) -> Result<Vec<LayerRecord>> {
    let mut layers = Vec::new();

    for file_path in sorted_files(path)? {
        let Some(family) = FileFamily::from_path(&file_path) else {
            debug!("Skipping {}", file_path.display());
            continue;
        };

        match family {
            FileFamily::Drill => layers.push(LayerRecord::unparsed(file_path)),
            FileFamily::Gerber => match decoder.decode(&file_path, LayerKindHint::Infer) {
                Ok(artifact) => layers.push(LayerRecord::gerber(file_path, artifact)),
                Err(e) => match policy {
                    GerberFailurePolicy::Abort => return Err(e),
                    GerberFailurePolicy::Skip => {
                        warn!("Skipping {}: {}", file_path.display(), e);
                    }
                },
            },
        }
    }

    info!("Detected {} files in {}", layers.len(), path.display());
    Ok(layers)
}

/// Regular files in `path` (following symlinks), sorted by file name
fn sorted_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    let entries = fs::read_dir(path).map_err(|_| Error::NotADirectory {
        path: path.to_path_buf(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry_path = entry?.path();
        if entry_path.is_file() {
            files.push(entry_path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_family() {
        assert_eq!(
            FileFamily::from_path(Path::new("board.GTL")),
            Some(FileFamily::Gerber)
        );
        assert_eq!(
            FileFamily::from_path(Path::new("board.gbr")),
            Some(FileFamily::Gerber)
        );
        assert_eq!(
            FileFamily::from_path(Path::new("board.Drl")),
            Some(FileFamily::Drill)
        );
        assert_eq!(
            FileFamily::from_path(Path::new("readme.txt")),
            Some(FileFamily::Drill)
        );
        assert_eq!(FileFamily::from_path(Path::new("board.pdf")), None);
        assert_eq!(FileFamily::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_unparsed_record() {
        let record = LayerRecord::unparsed(PathBuf::from("/tmp/board.drl"));
        assert!(record.is_unparsed());
        assert!(record.artifact().is_none());
        assert_eq!(record.layer_kind(), LayerKind::Other);
        assert_eq!(record.display_label(), "board.drl [OTHER]");
    }
}
