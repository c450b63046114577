//! Media listing payloads: replies to `get-directories`, `get-files`, and
//! `get-file`.
//!
//! Paths inside a listing are relative to a [`MediaBase`], one of the user's
//! well-known folders on the backend machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The well-known folders the backend will list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBase {
    Documents,
    Downloads,
    Home,
    Music,
    Pictures,
    Videos,
}

impl MediaBase {
    pub const ALL: [MediaBase; 6] = [
        MediaBase::Documents,
        MediaBase::Downloads,
        MediaBase::Home,
        MediaBase::Music,
        MediaBase::Pictures,
        MediaBase::Videos,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaBase::Documents => "documents",
            MediaBase::Downloads => "downloads",
            MediaBase::Home => "home",
            MediaBase::Music => "music",
            MediaBase::Pictures => "pictures",
            MediaBase::Videos => "videos",
        }
    }
}

impl fmt::Display for MediaBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`MediaBase`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown media base `{0}` (expected one of documents, downloads, home, music, pictures, videos)")]
pub struct UnknownMediaBase(pub String);

impl FromStr for MediaBase {
    type Err = UnknownMediaBase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaBase::ALL
            .into_iter()
            .find(|base| base.as_str() == s)
            .ok_or_else(|| UnknownMediaBase(s.to_owned()))
    }
}

// ── Directories ───────────────────────────────────────────────────────────────

/// One listable folder: its base key and absolute path on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDirectory {
    pub key: String,
    pub path: String,
}

/// Reply to `get-directories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DirectoriesRepr")]
pub struct MediaDirectories {
    pub directories: Vec<MediaDirectory>,
}

// Backends send either `{"directories": [...]}` or the bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectoriesRepr {
    Wrapped { directories: Vec<MediaDirectory> },
    Bare(Vec<MediaDirectory>),
}

impl From<DirectoriesRepr> for MediaDirectories {
    fn from(repr: DirectoriesRepr) -> Self {
        match repr {
            DirectoriesRepr::Wrapped { directories } | DirectoriesRepr::Bare(directories) => {
                Self { directories }
            }
        }
    }
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Metadata for one file or folder.  Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub name: String,
    /// Path relative to the base folder.
    pub path: String,
    pub fullpath: String,
    pub size: u64,
    pub last_accessed: f64,
    pub created: f64,
    pub modified: f64,
    pub is_directory: bool,
    pub is_file: bool,
    pub is_link: bool,
    /// Guessed from the extension; absent for folders and unknown types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Reply to `get-files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FilesRepr")]
pub struct MediaFiles {
    pub files: Vec<MediaFile>,
    /// The listed folder, relative to its base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilesRepr {
    Wrapped {
        files: Vec<MediaFile>,
        #[serde(default)]
        path: Option<String>,
    },
    Bare(Vec<MediaFile>),
}

impl From<FilesRepr> for MediaFiles {
    fn from(repr: FilesRepr) -> Self {
        match repr {
            FilesRepr::Wrapped { files, path } => Self { files, path },
            FilesRepr::Bare(files) => Self { files, path: None },
        }
    }
}
