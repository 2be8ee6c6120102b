//! File extension detection for unnamed uploads.
//!
//! When a file field carries no explicit filename, the encoder names the
//! part after the field and appends an extension guessed from the payload's
//! leading bytes. Detection is split into two capabilities so either can be
//! swapped out (for example to get deterministic results in tests):
//!
//! 1. [`Sniffer::sniff`] classifies the bytes as a MIME type.
//! 2. [`Sniffer::extension_for`] maps that MIME type to an extension.
//!
//! [`SystemSniffer`] backs the first step with the `infer` magic-number
//! matchers and the second with the `mime_guess` registry.

use mime::Mime;

/// Extensions that are alternate spellings of `jpg`.
const JPEG_ALIASES: &[&str] = &["jpe", "jpeg", "jfif", "pjpeg", "pjp"];

/// Content sniffing and MIME-to-extension lookup.
pub trait Sniffer {
    /// Guess the media type of `bytes`, or `None` when inconclusive.
    fn sniff(&self, bytes: &[u8]) -> Option<Mime>;

    /// Canonical extension (without the leading dot) registered for `mime`.
    fn extension_for(&self, mime: &Mime) -> Option<String>;

    /// Detect a file extension for `bytes`, including the leading dot.
    ///
    /// Never fails: returns an empty string when the content is not
    /// recognised or its type has no registered extension.
    fn detect_extension(&self, bytes: &[u8]) -> String {
        let Some(mime) = self.sniff(bytes) else {
            tracing::debug!(len = bytes.len(), "content type not recognised");
            return String::new();
        };
        if mime.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str() {
            return String::new();
        }
        match self.extension_for(&mime) {
            Some(ext) if JPEG_ALIASES.contains(&ext.as_str()) => ".jpg".to_string(),
            Some(ext) if !ext.is_empty() => format!(".{}", ext.trim_start_matches('.')),
            _ => {
                tracing::debug!(%mime, "no extension registered");
                String::new()
            }
        }
    }
}

/// The default [`Sniffer`], backed by `infer` and `mime_guess`.
///
/// `infer` recognises binary signatures only (images, archives, documents,
/// media). Plain text, HTML, JSON and other text payloads are not sniffed,
/// so unnamed text files get a bare field name, or the encoder's
/// `default_extension`. Install a custom [`Sniffer`] to classify them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSniffer;

impl Sniffer for SystemSniffer {
    fn sniff(&self, bytes: &[u8]) -> Option<Mime> {
        infer::get(bytes)?.mime_type().parse().ok()
    }

    fn extension_for(&self, mime: &Mime) -> Option<String> {
        mime_guess::get_mime_extensions_str(mime.essence_str())?
            .first()
            .map(|ext| ext.to_string())
    }
}

/// Detect a file extension for `bytes` using the [`SystemSniffer`].
///
/// ```rust
/// use formdata_serde::detect_extension;
///
/// let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert_eq!(detect_extension(&png), ".png");
/// assert_eq!(detect_extension(&[0x00, 0x01]), "");
/// ```
pub fn detect_extension(bytes: &[u8]) -> String {
    SystemSniffer.detect_extension(bytes)
}
