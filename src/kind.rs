//! Classification of struct fields by how they are written to the form.
//!
//! Every field the encoder visits resolves to one [`FieldKind`]. The
//! serializer reports the kind back to the struct walker, which logs it and
//! decides what happens next: most kinds have already been written when the
//! walker sees them, [`FieldKind::Nested`] still needs its JSON rendering and
//! [`FieldKind::Unsupported`] is handed to the configured
//! [`UnsupportedPolicy`](crate::UnsupportedPolicy).

use std::fmt;

/// The encoding strategy chosen for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `str`, `String`, `char` and unit enum variants
    Text,
    /// Signed integers, written in base 10
    Integer,
    /// Unsigned integers, written in base 10
    Unsigned,
    /// `f32` / `f64`, written as the shortest round-trip decimal
    Float,
    /// `true` / `false`
    Boolean,
    /// Raw bytes (`serde_bytes`) or a [`File`](crate::File), sent as a file part
    FileBytes,
    /// `Vec<T>`, slices, arrays and tuples: one part per element
    Sequence,
    /// A nested struct, sent as one JSON-encoded field
    Nested,
    /// Anything else: maps and data-carrying enum variants
    Unsupported(&'static str),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Unsigned => write!(f, "unsigned integer"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Boolean => write!(f, "boolean"),
            FieldKind::FileBytes => write!(f, "file"),
            FieldKind::Sequence => write!(f, "sequence"),
            FieldKind::Nested => write!(f, "nested struct"),
            FieldKind::Unsupported(what) => write!(f, "unsupported ({})", what),
        }
    }
}
