//! MIME type detection for media files.
//!
//! Used by the fetch helpers and the uploader to label downloaded bytes.

use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_from_extension)
        .unwrap_or("application/octet-stream")
}

/// Look up the MIME type for a bare extension (`"jpg"`, `"PNG"`).
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "svg"          => "image/svg+xml",
        "avif"         => "image/avif",
        "bmp"          => "image/bmp",
        "ico"          => "image/x-icon",
        "tiff" | "tif" => "image/tiff",

        // Audio
        "mp3"          => "audio/mpeg",
        "ogg"          => "audio/ogg",
        "wav"          => "audio/wav",
        "flac"         => "audio/flac",
        "m4a"          => "audio/mp4",
        "opus"         => "audio/opus",
        "aac"          => "audio/aac",

        // Video
        "mp4"          => "video/mp4",
        "webm"         => "video/webm",
        "mkv"          => "video/x-matroska",
        "mov"          => "video/quicktime",
        "avi"          => "video/x-msvideo",
        "ogv"          => "video/ogg",

        // Documents
        "pdf"          => "application/pdf",
        "zip"          => "application/zip",
        "txt"          => "text/plain",
        "md"           => "text/markdown",
        "html" | "htm" => "text/html",
        "json"         => "application/json",
        "xml"          => "application/xml",
        "csv"          => "text/csv",
        "bin"          => "application/octet-stream",

        _ => return None,
    };
    Some(mime)
}

/// Look up the MIME type for a file name, by its extension.
pub fn mime_from_filename(filename: &str) -> Option<&'static str> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(mime_from_extension)
}

/// Canonical extension for a MIME type. Parameters (`; charset=…`) are ignored.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
    let ext = match essence.as_str() {
        "image/jpeg"               => "jpg",
        "image/png"                => "png",
        "image/gif"                => "gif",
        "image/webp"               => "webp",
        "image/svg+xml"            => "svg",
        "image/avif"               => "avif",
        "image/bmp"                => "bmp",
        "image/x-icon"             => "ico",
        "image/tiff"               => "tiff",
        "audio/mpeg"               => "mp3",
        "audio/ogg"                => "ogg",
        "audio/wav"                => "wav",
        "audio/flac"               => "flac",
        "audio/mp4"                => "m4a",
        "audio/opus"               => "opus",
        "audio/aac"                => "aac",
        "video/mp4"                => "mp4",
        "video/webm"               => "webm",
        "video/x-matroska"         => "mkv",
        "video/quicktime"          => "mov",
        "video/x-msvideo"          => "avi",
        "video/ogg"                => "ogv",
        "application/pdf"          => "pdf",
        "application/zip"          => "zip",
        "text/plain"               => "txt",
        "text/markdown"            => "md",
        "text/html"                => "html",
        "application/json"         => "json",
        "application/xml"          => "xml",
        "text/csv"                 => "csv",
        "application/octet-stream" => "bin",
        _ => return None,
    };
    Some(ext)
}

/// Result of content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub mime: &'static str,
    pub ext: &'static str,
}

/// Identify a file from its leading magic bytes.
pub fn sniff(data: &[u8]) -> Option<Sniffed> {
    let found = |mime, ext| Some(Sniffed { mime, ext });

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return found("image/jpeg", "jpg");
    }
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        return found("image/png", "png");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return found("image/gif", "gif");
    }
    if data.len() >= 12 && &data[..4] == b"RIFF" {
        match &data[8..12] {
            b"WEBP" => return found("image/webp", "webp"),
            b"WAVE" => return found("audio/wav", "wav"),
            b"AVI " => return found("video/x-msvideo", "avi"),
            _ => {}
        }
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return match &data[8..12] {
            b"M4A " => found("audio/mp4", "m4a"),
            b"qt  " => found("video/quicktime", "mov"),
            b"avif" => found("image/avif", "avif"),
            _ => found("video/mp4", "mp4"),
        };
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        let head = &data[..data.len().min(64)];
        if head.windows(4).any(|w| w == b"webm") {
            return found("video/webm", "webm");
        }
        return found("video/x-matroska", "mkv");
    }
    if data.starts_with(b"OggS") {
        if data.len() >= 36 && &data[28..36] == b"OpusHead" {
            return found("audio/opus", "opus");
        }
        return found("audio/ogg", "ogg");
    }
    if data.starts_with(b"ID3") || (data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0) {
        return found("audio/mpeg", "mp3");
    }
    if data.starts_with(b"fLaC") {
        return found("audio/flac", "flac");
    }
    if data.starts_with(b"%PDF-") {
        return found("application/pdf", "pdf");
    }
    if data.starts_with(b"PK\x03\x04") {
        return found("application/zip", "zip");
    }
    None
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether a MIME type is for audio.
pub fn is_audio(mime: &str) -> bool {
    mime.starts_with("audio/")
}

/// Whether a MIME type is for video.
pub fn is_video(mime: &str) -> bool {
    mime.starts_with("video/")
}
