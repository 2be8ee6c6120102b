//! File uploads with an optional explicit filename.
//!
//! Any byte field serialized through `serialize_bytes` (for example with
//! `#[serde(with = "serde_bytes")]`) becomes a file part whose filename is
//! the field name plus a sniffed extension. Wrap the bytes in [`File`] to
//! choose the filename yourself:
//!
//! ```rust
//! use formdata_serde::{File, to_form};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Upload {
//!     title: String,
//!     #[serde(rename = "avatar")]
//!     profile_pic: File,
//! }
//!
//! let upload = Upload {
//!     title: "me".into(),
//!     profile_pic: File::named("profile.jpg", b"fake image data".to_vec()),
//! };
//!
//! let form = to_form(&upload).unwrap();
//! let body = String::from_utf8_lossy(form.body());
//! assert!(body.contains(r#"name="avatar"; filename="profile.jpg""#));
//! ```
//!
//! # Outside this crate
//!
//! Other serializers see a `File` as a newtype struct around a two-field
//! tuple struct: the filename (an `Option<&str>`) followed by the content
//! as bytes. `serde_json` therefore renders it as `[name, [bytes...]]`.

use serde::ser::{Serialize, SerializeTupleStruct, Serializer};

/// An in-memory file destined for a multipart file part.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    filename: Option<String>,
    content: Vec<u8>,
}

impl File {
    /// A file whose name is derived from the field name and its content.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        File {
            filename: None,
            content: content.into(),
        }
    }

    /// A file sent under `filename`, bypassing content sniffing.
    pub fn named(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        File {
            filename: Some(filename.into()),
            content: content.into(),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

impl From<Vec<u8>> for File {
    fn from(content: Vec<u8>) -> Self {
        File::new(content)
    }
}

impl Serialize for File {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The token tells our field serializer to read the payload below as
        // (filename, content) instead of an ordinary tuple struct.
        serializer.serialize_newtype_struct(crate::FILE_TOKEN, &FilePayload(self))
    }
}

struct FilePayload<'a>(&'a File);

impl Serialize for FilePayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut payload = serializer.serialize_tuple_struct(crate::FILE_TOKEN, 2)?;
        payload.serialize_field(&self.0.filename.as_deref())?;
        payload.serialize_field(&RawBytes(&self.0.content))?;
        payload.end()
    }
}

/// Wraps a byte slice so `serialize_bytes` is called on it.
pub(crate) struct RawBytes<'a>(pub &'a [u8]);

impl Serialize for RawBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}
