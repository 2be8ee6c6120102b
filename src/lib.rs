//! # formdata-serde
//!
//! Encode any struct that implements `serde::Serialize` as a
//! `multipart/form-data` request body, ready to hand to an HTTP client.
//!
//! ## Overview
//!
//! Fields are visited in declaration order. Each one becomes a text field,
//! a file part or a JSON-encoded field depending on its type. The body is
//! framed with a random boundary, returned together with the matching
//! `Content-Type` header value.
//!
//! ## Serde type mapping
//!
//! | Rust / serde type | multipart encoding |
//! |-------------------|--------------------|
//! | `String`, `&str`, `char` | text field; empty strings are omitted |
//! | `i8` ... `i128`   | text field, base 10 |
//! | `u8` ... `u128`   | text field, base 10 |
//! | `f32`, `f64`      | text field, shortest round-trip decimal of the `f64` value |
//! | `bool`            | text field: `true` / `false` |
//! | `serde_bytes` bytes, [`File`] | file part, `Content-Type: application/octet-stream` |
//! | `Vec<T>`, arrays, tuples | one text field per element, same name |
//! | nested struct     | one text field holding the struct as JSON |
//! | `Option<T>`       | `None`: nothing; `Some(v)`: encoded as `v` |
//! | `()` / unit struct | nothing |
//! | unit enum variant | text field with the variant name |
//! | map, data-carrying enum variant | error, or skipped under [`UnsupportedPolicy::Skip`] |
//!
//! Field names are the serialized keys, sent as is. `#[serde(rename = "...")]`
//! picks another name; the name `-` drops the field.
//! [`Encoder::lowercase_keys`] folds every key to lowercase.
//!
//! A plain `Vec<u8>` is a sequence in serde's data model and is sent as one
//! numeric field per byte. Use `#[serde(with = "serde_bytes")]` or [`File`]
//! to send bytes as a file.
//!
//! ## Example
//!
//! ```rust
//! use formdata_serde::{File, to_form};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Address {
//!     street: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Upload {
//!     username: String,
//!     #[serde(rename = "user_age")]
//!     age: u32,
//!     #[serde(rename = "-")]
//!     internal: String,
//!     tags: Vec<String>,
//!     #[serde(with = "serde_bytes")]
//!     photo: Vec<u8>,
//!     resume: File,
//!     address: Address,
//! }
//!
//! let upload = Upload {
//!     username: "johndoe".into(),
//!     age: 30,
//!     internal: "not sent".into(),
//!     tags: vec!["example".into(), "upload".into()],
//!     photo: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
//!     resume: File::named("cv.pdf", b"%PDF-1.5".to_vec()),
//!     address: Address { street: "123 Main St".into() },
//! };
//!
//! let form = to_form(&upload).unwrap();
//! assert!(form.content_type().starts_with("multipart/form-data; boundary="));
//!
//! let body = String::from_utf8_lossy(form.body());
//! assert!(body.contains(r#"name="user_age""#));
//! assert!(body.contains(r#"filename="photo.png""#));
//! assert!(body.contains(r#"filename="cv.pdf""#));
//! assert!(body.contains(r#"{"street":"123 Main St"}"#));
//! assert!(!body.contains("not sent"));
//! ```

pub mod error;
pub mod file;
pub mod kind;
pub mod ser;
pub mod sniff;
pub mod writer;

pub use error::{Error, Result};
pub use file::File;
pub use kind::FieldKind;
pub use ser::{Encoder, Form, Serializer, UnsupportedPolicy, to_form, to_writer};
pub use sniff::{Sniffer, SystemSniffer, detect_extension};
pub use writer::FormWriter;

pub use serde::Serialize;

/// Field name that removes a field from the form.
pub const SKIP_SENTINEL: &str = "-";

/// Newtype struct name marking a [`File`] payload.
pub(crate) const FILE_TOKEN: &str = "$formdata_serde::private::File";
