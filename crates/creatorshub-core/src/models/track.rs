use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fallback content type for audio files with an unknown extension
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Track as returned by `POST /tracks/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "trackId")]
    pub track_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "coverImageUrl", default)]
    pub cover_image_url: Option<String>,
}

/// Handle to a local audio file picked for upload.
///
/// Holds only the path; the bytes are read when the upload is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    path: PathBuf,
}

impl AudioFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, sent as the multipart filename
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }

    /// Content type derived from the file extension (case-insensitive)
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());

        match ext.as_deref() {
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("m4a") => "audio/m4a",
            Some("aac") => "audio/aac",
            _ => DEFAULT_CONTENT_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(AudioFile::new("song.mp3").content_type(), "audio/mpeg");
        assert_eq!(AudioFile::new("SONG.MP3").content_type(), "audio/mpeg");
        assert_eq!(AudioFile::new("take.wav").content_type(), "audio/wav");
        assert_eq!(AudioFile::new("voice.m4a").content_type(), "audio/m4a");
        assert_eq!(AudioFile::new("loop.aac").content_type(), "audio/aac");
        assert_eq!(AudioFile::new("notes.flac").content_type(), DEFAULT_CONTENT_TYPE);
        assert_eq!(AudioFile::new("no_extension").content_type(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_file_name_is_last_component() {
        let file = AudioFile::new("/music/demos/song.mp3");
        assert_eq!(file.file_name(), "song.mp3");
    }

    #[test]
    fn test_parse_track() {
        let json = r#"{"trackId":"t1","userId":"u1","title":"Night Drive","fileUrl":"https://cdn/t1.mp3"}"#;
        let track: Track = serde_json::from_str(json).expect("Failed to parse track JSON");
        assert_eq!(track.track_id, "t1");
        assert!(track.description.is_none());
        assert!(track.cover_image_url.is_none());
    }
}
