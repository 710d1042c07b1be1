//! Media helpers: MIME detection, file hosting, and WebP conversion.

pub mod convert;
pub mod error;
pub mod mime_detect;
pub mod uploader;

pub use convert::{ConvertTarget, EzgifConverter, MediaSource};
pub use error::MediaError;
pub use mime_detect::{
    detect_mime_type, extension_for_mime, is_audio, is_image, is_video, mime_from_extension,
    mime_from_filename, sniff, Sniffed,
};
pub use uploader::PomfUploader;

/// Desktop browser user agent sent to third-party hosts that reject bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.0.0";
