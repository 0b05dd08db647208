use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Extensions accepted by the upload endpoint (compared lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4"];
/// Name of the playlist ffmpeg writes inside each asset directory.
pub const PLAYLIST_NAME: &str = "playlist.m3u8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// No file part, or a file part without a usable name.
    NoFile,
    /// Extension outside `ALLOWED_EXTENSIONS`, or nothing left after sanitizing.
    NotAllowed,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NoFile => write!(f, "No file found"),
            AssetError::NotAllowed => write!(f, "File type not allowed"),
        }
    }
}

impl std::error::Error for AssetError {}

/// One uploaded video, keyed by its sanitized file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    name: String,
    stem: String,
}

impl Asset {
    /// Validate and sanitize a client supplied file name.
    pub fn from_upload_name(raw: &str) -> Result<Self, AssetError> {
        if raw.is_empty() {
            return Err(AssetError::NoFile);
        }
        if !allowed_file(raw) {
            return Err(AssetError::NotAllowed);
        }

        // Sanitizing can eat the stem or the extension ("../.mp4", "ü/.mp4").
        let name = normalized_name(&secure_filename(raw)).ok_or(AssetError::NotAllowed)?;
        let asset = Self::from_key(&name);
        if asset.stem.is_empty() {
            return Err(AssetError::NotAllowed);
        }
        Ok(asset)
    }

    /// Rebuild an asset from a tracker key without validating it.
    pub fn from_key(key: &str) -> Self {
        let stem = match key.rfind('.') {
            Some(0) | None => key,
            Some(idx) => &key[..idx],
        };
        Self {
            name: key.to_owned(),
            stem: stem.to_owned(),
        }
    }

    /// Tracker key of the asset a stream path belongs to.
    pub fn key_for_stream(asset_id: &str) -> String {
        format!("{}.{}", asset_id, ALLOWED_EXTENSIONS[0])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn upload_path(&self, upload_dir: &Path) -> PathBuf {
        upload_dir.join(&self.name)
    }

    pub fn output_dir(&self, hls_dir: &Path) -> PathBuf {
        hls_dir.join(&self.stem)
    }

    pub fn playlist_path(&self, hls_dir: &Path) -> PathBuf {
        self.output_dir(hls_dir).join(PLAYLIST_NAME)
    }

    /// Path of the playlist relative to the `/stream/` route.
    pub fn stream_path(&self) -> String {
        format!("{}/{}", self.stem, PLAYLIST_NAME)
    }
}

pub fn allowed_file(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// `name` with its extension lowercased, or `None` if the extension is not allowed.
///
/// Stream paths only carry the stem, so `clip.MP4` and `clip.mp4` must share one key.
pub fn normalized_name(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(format!("{}.{}", stem, ext))
}

/// Reduce a file name to a flat, ASCII only name that is safe to join onto a directory.
pub fn secure_filename(file_name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"));

    let ascii = deunicode::deunicode(file_name).replace(|c: char| c == '/' || c == '\\', " ");
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    unsafe_chars
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_owned()
}
