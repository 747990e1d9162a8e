//! Photo references.
//!
//! A photo is either an inline data URL (a preview that has not been
//! uploaded yet) or a reference to a file the server stores. On the wire
//! both are plain strings; the `data:` prefix tells them apart.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::DATA_URL_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Photo {
    /// `data:<mime>;base64,<payload>`
    Inline(String),
    /// Server-relative path such as `/api/uploads/<file>`, or an absolute URL.
    Remote(String),
}

impl Photo {
    pub fn inline(mime: &str, bytes: &[u8]) -> Self {
        Photo::Inline(encode_data_url(mime, bytes))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Photo::Inline(s) | Photo::Remote(s) => s,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Photo::Inline(_))
    }

    /// Turn the reference into something an image element can load.
    pub fn resolve(&self, base_url: &str) -> String {
        match self {
            Photo::Inline(data_url) => data_url.clone(),
            Photo::Remote(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.clone()
            }
            Photo::Remote(path) => {
                let base = base_url.trim_end_matches('/');
                if path.starts_with('/') {
                    format!("{base}{path}")
                } else {
                    format!("{base}/{path}")
                }
            }
        }
    }

    /// Last path segment of a remote reference.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Photo::Inline(_) => None,
            Photo::Remote(path) => path.rsplit('/').next().filter(|s| !s.is_empty()),
        }
    }
}

impl From<String> for Photo {
    fn from(s: String) -> Self {
        if s.starts_with(DATA_URL_PREFIX) {
            Photo::Inline(s)
        } else {
            Photo::Remote(s)
        }
    }
}

impl From<Photo> for String {
    fn from(photo: Photo) -> Self {
        match photo {
            Photo::Inline(s) | Photo::Remote(s) => s,
        }
    }
}

impl std::fmt::Display for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("{DATA_URL_PREFIX}{mime};base64,{}", STANDARD.encode(bytes))
}

/// Lower-cased extension of a file name, if it has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn mime_for_file_name(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
