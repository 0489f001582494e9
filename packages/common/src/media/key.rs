use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use super::error::MediaError;

/// Length of the random suffix appended to generated keys.
const KEY_SUFFIX_LEN: usize = 8;

/// Maximum accepted key length.
const MAX_KEY_LEN: usize = 512;

/// A validated storage key for an object held by the external media host.
///
/// Keys are generated at upload time and persisted next to the public URL,
/// so a later delete never has to recover the identifier by parsing the
/// URL's path segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaKey(String);

impl MediaKey {
    /// Parse a key previously produced by [`MediaKey::generate`].
    pub fn parse(s: &str) -> Result<Self, MediaError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(MediaError::InvalidKey("key cannot be empty".into()));
        }
        if trimmed.len() > MAX_KEY_LEN {
            return Err(MediaError::InvalidKey(format!(
                "key exceeds maximum length of {MAX_KEY_LEN} characters"
            )));
        }
        if trimmed.starts_with('/') || trimmed.ends_with('/') || trimmed.contains("//") {
            return Err(MediaError::InvalidKey(
                "key must be a relative path without empty segments".into(),
            ));
        }
        for segment in trimmed.split('/') {
            if segment.starts_with('.') {
                return Err(MediaError::InvalidKey(
                    "key segments must not start with '.'".into(),
                ));
            }
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
        {
            return Err(MediaError::InvalidKey(
                "key contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)".into(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh key for an upload: `{folder}/{stem}-{suffix}[.ext]`.
    ///
    /// The stem and extension are sanitized from the client-supplied
    /// filename; the random suffix keeps repeated uploads of the same
    /// filename from colliding.
    pub fn generate(folder: &str, filename: &str) -> Self {
        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };

        let stem = sanitize_segment(stem, "file");
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(KEY_SUFFIX_LEN)
            .map(char::from)
            .collect();

        let folder = folder.trim_matches('/');
        let mut key = if folder.is_empty() {
            format!("{stem}-{suffix}")
        } else {
            format!("{folder}/{stem}-{suffix}")
        };

        if let Some(ext) = ext {
            let ext = sanitize_segment(ext, "bin");
            key.push('.');
            key.push_str(&ext);
        }

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lowercase a name and replace anything outside `[a-z0-9_-]` with `-`.
fn sanitize_segment(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('-').to_string();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MediaKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MediaKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Resource kind of a hosted object, as understood by the media host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Raw,
}

impl MediaKind {
    /// Infer the kind from a MIME content type.
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();
        if essence.starts_with("image/") {
            Self::Image
        } else if essence.starts_with("video/") {
            Self::Video
        } else {
            Self::Raw
        }
    }

    /// Infer the kind from a filename's extension.
    pub fn from_filename(filename: &str) -> Self {
        mime_guess::from_path(filename)
            .first()
            .map(|m| Self::from_content_type(m.essence_str()))
            .unwrap_or(Self::Raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "raw" => Ok(Self::Raw),
            other => Err(MediaError::InvalidKey(format!(
                "unknown media kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_places_key_under_folder() {
        let key = MediaKey::generate("pages/safe", "Waiting Room.JPG");
        assert!(key.as_str().starts_with("pages/safe/waiting-room-"));
        assert!(key.as_str().ends_with(".jpg"));
    }

    #[test]
    fn generate_handles_missing_extension() {
        let key = MediaKey::generate("services", "scan");
        assert!(key.as_str().starts_with("services/scan-"));
        assert!(!key.as_str().contains('.'));
    }

    #[test]
    fn generate_falls_back_on_hostile_filenames() {
        let key = MediaKey::generate("team", "../../etc/passwd");
        assert!(MediaKey::parse(key.as_str()).is_ok());
        assert!(key.as_str().starts_with("team/"));
    }

    #[test]
    fn generated_keys_do_not_collide() {
        let a = MediaKey::generate("x", "photo.png");
        let b = MediaKey::generate("x", "photo.png");
        assert_ne!(a, b);
    }

    #[test]
    fn parse_round_trips_generated_keys() {
        let key = MediaKey::generate("pages/homepage", "background.webm");
        let parsed = MediaKey::parse(key.as_str()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn parse_rejects_traversal_and_absolute_paths() {
        assert!(MediaKey::parse("../secret").is_err());
        assert!(MediaKey::parse("/absolute").is_err());
        assert!(MediaKey::parse("a//b").is_err());
        assert!(MediaKey::parse("a/.hidden").is_err());
        assert!(MediaKey::parse("").is_err());
    }

    #[test]
    fn parse_rejects_unsafe_characters() {
        assert!(MediaKey::parse("has space.png").is_err());
        assert!(MediaKey::parse("semi;colon").is_err());
    }

    #[test]
    fn kind_inference_from_content_type() {
        assert_eq!(
            MediaKind::from_content_type("image/png"),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_content_type("video/mp4; codecs=avc1"),
            MediaKind::Video
        );
        assert_eq!(
            MediaKind::from_content_type("application/pdf"),
            MediaKind::Raw
        );
    }

    #[test]
    fn kind_inference_from_filename() {
        assert_eq!(MediaKind::from_filename("x.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("clip.mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_filename("notes.txt"), MediaKind::Raw);
        assert_eq!(MediaKind::from_filename("noext"), MediaKind::Raw);
    }

    #[test]
    fn kind_string_round_trip() {
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Raw] {
            assert_eq!(kind.as_str().parse::<MediaKind>().unwrap(), kind);
        }
        assert!("gif".parse::<MediaKind>().is_err());
    }

    #[test]
    fn media_key_serde_round_trip() {
        let key = MediaKey::generate("pages/precise", "chart.png");
        let json = serde_json::to_string(&key).unwrap();
        let parsed: MediaKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, parsed);
    }
}
