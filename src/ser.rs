//! multipart/form-data Serializer
//!
//! The [`Serializer`] walks the fields of a struct in declaration order and
//! writes each one into a [`FormWriter`] as a form field, a file part, or a
//! JSON-encoded blob, depending on its serde data model type.
//!
//! ## Field mapping summary
//! - Wire name: the serialized key as is (`#[serde(rename)]` sets the key),
//!   optionally lowercased with [`Encoder::lowercase_keys`]
//! - Key `-` (`#[serde(rename = "-")]`): field skipped
//! - Strings / chars / unit variants: one field, omitted when empty
//! - Integers: base-10 text, always written (`0` included)
//! - Floats: shortest round-trip decimal of the `f64` value
//! - Booleans: `true` / `false`
//! - Bytes / [`File`](crate::File): file part named `<field><ext>` unless a filename is set
//! - Sequences / tuples: one field per element, all under the same name
//! - Nested structs: one field holding the struct as JSON
//! - `None` / unit: nothing
//! - Maps and data-carrying enum variants: governed by [`UnsupportedPolicy`]

use crate::error::{Error, Result};
use crate::kind::FieldKind;
use crate::sniff::{Sniffer, SystemSniffer};
use crate::writer::{FormWriter, content_type_for};
use serde::ser::{self, Impossible, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use tracing::{debug, trace};

const NOT_A_STRUCT: &str = "value must be a struct";

// ── Public entry points ────────────────────────────────────────────────────

/// Encode the struct `value` into an in-memory multipart body.
pub fn to_form<T: Serialize + ?Sized>(value: &T) -> Result<Form> {
    Encoder::new().encode(value)
}

/// Encode the struct `value`, streaming the multipart body into `writer`.
///
/// Returns the `Content-Type` header value to send with the body.
pub fn to_writer<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<String> {
    Encoder::new().encode_to_writer(writer, value)
}

// ── Form ───────────────────────────────────────────────────────────────────

/// A complete multipart/form-data body and the boundary it was framed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    body: Vec<u8>,
    boundary: String,
    parts: usize,
}

impl Form {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `multipart/form-data; boundary=<boundary>`
    pub fn content_type(&self) -> String {
        content_type_for(&self.boundary)
    }

    /// Number of parts written into the body.
    pub fn part_count(&self) -> usize {
        self.parts
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Split into the body and its `Content-Type` header value.
    pub fn into_parts(self) -> (Vec<u8>, String) {
        let content_type = content_type_for(&self.boundary);
        (self.body, content_type)
    }
}

// ── Encoder ────────────────────────────────────────────────────────────────

/// What to do with a field whose kind has no form representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Fail the encode with [`Error::Unsupported`]
    #[default]
    Reject,
    /// Drop the field (or sequence element) and carry on
    Skip,
}

/// Encoding options.
///
/// ```rust
/// use formdata_serde::{Encoder, UnsupportedPolicy};
/// use serde::Serialize;
/// use std::collections::BTreeMap;
///
/// #[derive(Serialize)]
/// struct Query {
///     term: String,
///     extra: BTreeMap<String, String>,
/// }
///
/// let q = Query { term: "rust".into(), extra: BTreeMap::new() };
/// assert!(formdata_serde::to_form(&q).is_err());
///
/// let form = Encoder::new()
///     .unsupported(UnsupportedPolicy::Skip)
///     .encode(&q)
///     .unwrap();
/// assert_eq!(form.part_count(), 1);
/// ```
pub struct Encoder {
    unsupported: UnsupportedPolicy,
    lowercase_keys: bool,
    default_extension: String,
    sniffer: Box<dyn Sniffer + Send + Sync>,
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder {
            unsupported: UnsupportedPolicy::default(),
            lowercase_keys: false,
            default_extension: String::new(),
            sniffer: Box::new(SystemSniffer),
        }
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("unsupported", &self.unsupported)
            .field("lowercase_keys", &self.lowercase_keys)
            .field("default_extension", &self.default_extension)
            .finish_non_exhaustive()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsupported(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported = policy;
        self
    }

    /// Lowercase every key before it goes on the wire.
    ///
    /// Keys are sent exactly as serialized by default. This applies to all
    /// keys, explicit renames included, so it suits records whose names all
    /// come from `#[serde(rename_all = "...")]`.
    pub fn lowercase_keys(mut self, lowercase: bool) -> Self {
        self.lowercase_keys = lowercase;
        self
    }

    /// Extension (including the dot) appended when sniffing finds none.
    pub fn default_extension(mut self, ext: impl Into<String>) -> Self {
        self.default_extension = ext.into();
        self
    }

    /// Replace the content sniffer used to name unnamed files.
    pub fn sniffer<S: Sniffer + Send + Sync + 'static>(mut self, sniffer: S) -> Self {
        self.sniffer = Box::new(sniffer);
        self
    }

    /// Encode `value` into an in-memory [`Form`].
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Form> {
        let mut ser = Serializer::new(Vec::new(), self);
        value.serialize(&mut ser)?;
        let boundary = ser.boundary().to_string();
        let parts = ser.part_count();
        let body = ser.finish()?;
        Ok(Form {
            body,
            boundary,
            parts,
        })
    }

    /// Encode `value` into `writer`, returning the `Content-Type` value.
    pub fn encode_to_writer<W: Write, T: Serialize + ?Sized>(
        &self,
        writer: W,
        value: &T,
    ) -> Result<String> {
        let mut ser = Serializer::new(writer, self);
        value.serialize(&mut ser)?;
        let content_type = ser.content_type();
        ser.finish()?;
        Ok(content_type)
    }

    fn wire_name(&self, key: &'static str) -> Cow<'static, str> {
        if !self.lowercase_keys || !key.chars().any(char::is_uppercase) {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(key.to_lowercase())
        }
    }

    fn file_name(&self, field: &str, explicit: Option<&str>, content: &[u8]) -> String {
        match explicit {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let ext = self.sniffer.detect_extension(content);
                let ext = if ext.is_empty() {
                    self.default_extension.as_str()
                } else {
                    ext.as_str()
                };
                format!("{}{}", field, ext)
            }
        }
    }

    fn reject_or_skip(&self, field: &str, what: &'static str) -> Result<()> {
        match self.unsupported {
            UnsupportedPolicy::Reject => Err(Error::Unsupported {
                field: field.to_string(),
                kind: what,
            }),
            UnsupportedPolicy::Skip => {
                debug!(field, kind = what, "skipping unsupported value");
                Ok(())
            }
        }
    }
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// The form serializer. Generic over any `W: Write`.
///
/// Only structs (possibly behind references, boxes, `Some` or newtype
/// wrappers) are accepted; anything else fails with
/// [`Error::InvalidInput`].
///
/// ```rust
/// use formdata_serde::{Encoder, Serializer};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Ping { count: u32 }
///
/// let encoder = Encoder::new();
/// let mut ser = Serializer::new(Vec::new(), &encoder);
/// Ping { count: 3 }.serialize(&mut ser).unwrap();
/// let boundary = ser.boundary().to_string();
/// let body = ser.finish().unwrap();
/// assert!(body.ends_with(format!("--{}--\r\n", boundary).as_bytes()));
/// ```
pub struct Serializer<'e, W: Write> {
    form: FormWriter<W>,
    encoder: &'e Encoder,
}

impl<'e, W: Write> Serializer<'e, W> {
    pub fn new(writer: W, encoder: &'e Encoder) -> Self {
        Serializer {
            form: FormWriter::new(writer),
            encoder,
        }
    }

    pub fn boundary(&self) -> &str {
        self.form.boundary()
    }

    pub fn content_type(&self) -> String {
        self.form.content_type()
    }

    pub fn part_count(&self) -> usize {
        self.form.part_count()
    }

    /// Close the body and return the inner writer.
    pub fn finish(self) -> Result<W> {
        self.form.finish().map_err(Error::Finalize)
    }

    fn write_text(&mut self, name: &str, kind: FieldKind, value: &[u8]) -> Result<Option<FieldKind>> {
        self.form.write_field(name, value)?;
        trace!(field = name, %kind, len = value.len(), "wrote form field");
        Ok(Some(kind))
    }

    fn write_file(&mut self, name: &str, filename: Option<&str>, content: &[u8]) -> Result<()> {
        let filename = self.encoder.file_name(name, filename, content);
        self.form
            .create_form_file(name, &filename)?
            .write_all(content)?;
        trace!(field = name, %filename, len = content.len(), "wrote file part");
        Ok(())
    }
}

/// Shortest decimal that round-trips, never in exponent form.
fn format_float(v: f64) -> String {
    if v.is_infinite() {
        let inf = if v > 0.0 { "+Inf" } else { "-Inf" };
        inf.to_string()
    } else {
        v.to_string()
    }
}

macro_rules! scalar_fallbacks {
    ($($method:ident($ty:ty) => $ret:expr),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Self::Ok> {
                $ret
            }
        )*
    };
}

// ── serde::Serializer impl (record level) ──────────────────────────────────

impl<'a, 'e, W: Write> ser::Serializer for &'a mut Serializer<'e, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), Error>;

    scalar_fallbacks! {
        serialize_bool(bool) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_i8(i8) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_i16(i16) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_i32(i32) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_i64(i64) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_i128(i128) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_u8(u8) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_u16(u16) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_u32(u32) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_u64(u64) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_u128(u128) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_f32(f32) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_f64(f64) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_char(char) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_str(&str) => Err(Error::InvalidInput(NOT_A_STRUCT)),
        serialize_bytes(&[u8]) => Err(Error::InvalidInput(NOT_A_STRUCT)),
    }

    fn serialize_none(self) -> Result<()> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }

    /// `Some(record)` is treated like a pointer to the record
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        if name == crate::FILE_TOKEN {
            return Err(Error::InvalidInput(NOT_A_STRUCT));
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::InvalidInput(NOT_A_STRUCT))
    }
}

impl<'a, 'e, W: Write> ser::SerializeStruct for &'a mut Serializer<'e, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        if key == crate::SKIP_SENTINEL {
            debug!("skipping field marked `-`");
            return Ok(());
        }
        let name = self.encoder.wire_name(key);
        let kind = value.serialize(FieldSerializer {
            ser: &mut **self,
            name: &name,
        })?;
        match kind {
            None => debug!(field = %name, "omitting empty field"),
            Some(FieldKind::Nested) => {
                let json = serde_json::to_vec(value)?;
                self.write_text(&name, FieldKind::Nested, &json)?;
            }
            Some(FieldKind::Unsupported(what)) => self.encoder.reject_or_skip(&name, what)?,
            Some(_) => {}
        }
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

// ── FieldSerializer ────────────────────────────────────────────────────────
//
// Serializes the value of a single struct field under `name`. Returns the
// kind it resolved to, or `None` when the value produced no part. Nested
// structs and unsupported kinds are only classified here; the struct walker
// acts on them because it still holds the original value.

struct FieldSerializer<'a, 'e, W: Write> {
    ser: &'a mut Serializer<'e, W>,
    name: &'a str,
}

macro_rules! write_decimal {
    ($($method:ident($ty:ty) => $kind:expr),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok> {
                self.ser.write_text(self.name, $kind, v.to_string().as_bytes())
            }
        )*
    };
}

impl<'a, 'e, W: Write> ser::Serializer for FieldSerializer<'a, 'e, W> {
    type Ok = Option<FieldKind>;
    type Error = Error;

    type SerializeSeq = SeqEncoder<'a, 'e, W>;
    type SerializeTuple = SeqEncoder<'a, 'e, W>;
    type SerializeTupleStruct = SeqEncoder<'a, 'e, W>;
    type SerializeTupleVariant = Deferred;
    type SerializeMap = Deferred;
    type SerializeStruct = Deferred;
    type SerializeStructVariant = Deferred;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        let text: &[u8] = if v { b"true" } else { b"false" };
        self.ser.write_text(self.name, FieldKind::Boolean, text)
    }

    write_decimal! {
        serialize_i8(i8) => FieldKind::Integer,
        serialize_i16(i16) => FieldKind::Integer,
        serialize_i32(i32) => FieldKind::Integer,
        serialize_i64(i64) => FieldKind::Integer,
        serialize_i128(i128) => FieldKind::Integer,
        serialize_u8(u8) => FieldKind::Unsigned,
        serialize_u16(u16) => FieldKind::Unsigned,
        serialize_u32(u32) => FieldKind::Unsigned,
        serialize_u64(u64) => FieldKind::Unsigned,
        serialize_u128(u128) => FieldKind::Unsigned,
    }

    /// Widened to `f64` first, so `0.1f32` is sent as `0.10000000149011612`
    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        self.serialize_f64(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        self.ser
            .write_text(self.name, FieldKind::Float, format_float(v).as_bytes())
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut buf = [0u8; 4];
        self.ser
            .write_text(self.name, FieldKind::Text, v.encode_utf8(&mut buf).as_bytes())
    }

    /// Empty strings produce no part at all
    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        if v.is_empty() {
            return Ok(None);
        }
        self.ser.write_text(self.name, FieldKind::Text, v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        self.ser.write_file(self.name, None, v)?;
        Ok(Some(FieldKind::FileBytes))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        if name == crate::FILE_TOKEN {
            value.serialize(FileSerializer {
                ser: self.ser,
                name: self.name,
                filename: None,
                stage: FileStage::Payload,
            })?;
            return Ok(Some(FieldKind::FileBytes));
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Ok(Some(FieldKind::Unsupported("enum newtype variant")))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqEncoder {
            ser: self.ser,
            name: self.name,
        })
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(SeqEncoder {
            ser: self.ser,
            name: self.name,
        })
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(SeqEncoder {
            ser: self.ser,
            name: self.name,
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(Deferred(Some(FieldKind::Unsupported("enum tuple variant"))))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(Deferred(Some(FieldKind::Unsupported("map"))))
    }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(Deferred(Some(FieldKind::Nested)))
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(Deferred(Some(FieldKind::Unsupported("enum struct variant"))))
    }
}

// ── SeqEncoder ─────────────────────────────────────────────────────────────

/// Writes every element of a sequence field as its own part under one name.
struct SeqEncoder<'a, 'e, W: Write> {
    ser: &'a mut Serializer<'e, W>,
    name: &'a str,
}

impl<W: Write> SeqEncoder<'_, '_, W> {
    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let kind = value.serialize(ElementSerializer {
            ser: &mut *self.ser,
            name: self.name,
        })?;
        match kind {
            Some(FieldKind::Unsupported(what)) => self.ser.encoder.reject_or_skip(self.name, what),
            _ => Ok(()),
        }
    }
}

macro_rules! forward_element {
    ($t:path, $method:ident) => {
        impl<'a, 'e, W: Write> $t for SeqEncoder<'a, 'e, W> {
            type Ok = Option<FieldKind>;
            type Error = Error;
            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                self.element(value)
            }
            fn end(self) -> Result<Self::Ok> {
                Ok(Some(FieldKind::Sequence))
            }
        }
    };
}

forward_element!(ser::SerializeSeq, serialize_element);
forward_element!(ser::SerializeTuple, serialize_element);
forward_element!(ser::SerializeTupleStruct, serialize_field);

// ── ElementSerializer ──────────────────────────────────────────────────────
//
// Only text and integer elements have a form representation; everything
// else is reported as unsupported and left to the policy.

struct ElementSerializer<'a, 'e, W: Write> {
    ser: &'a mut Serializer<'e, W>,
    name: &'a str,
}

impl<'a, 'e, W: Write> ser::Serializer for ElementSerializer<'a, 'e, W> {
    type Ok = Option<FieldKind>;
    type Error = Error;

    type SerializeSeq = Deferred;
    type SerializeTuple = Deferred;
    type SerializeTupleStruct = Deferred;
    type SerializeTupleVariant = Deferred;
    type SerializeMap = Deferred;
    type SerializeStruct = Deferred;
    type SerializeStructVariant = Deferred;

    write_decimal! {
        serialize_i8(i8) => FieldKind::Integer,
        serialize_i16(i16) => FieldKind::Integer,
        serialize_i32(i32) => FieldKind::Integer,
        serialize_i64(i64) => FieldKind::Integer,
        serialize_i128(i128) => FieldKind::Integer,
        serialize_u8(u8) => FieldKind::Unsigned,
        serialize_u16(u16) => FieldKind::Unsigned,
        serialize_u32(u32) => FieldKind::Unsigned,
        serialize_u64(u64) => FieldKind::Unsigned,
        serialize_u128(u128) => FieldKind::Unsigned,
    }

    scalar_fallbacks! {
        serialize_bool(bool) => Ok(Some(FieldKind::Unsupported("boolean element"))),
        serialize_f32(f32) => Ok(Some(FieldKind::Unsupported("float element"))),
        serialize_f64(f64) => Ok(Some(FieldKind::Unsupported("float element"))),
        serialize_bytes(&[u8]) => Ok(Some(FieldKind::Unsupported("bytes element"))),
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut buf = [0u8; 4];
        self.ser
            .write_text(self.name, FieldKind::Text, v.encode_utf8(&mut buf).as_bytes())
    }

    /// Unlike whole fields, empty string elements are still written
    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.ser.write_text(self.name, FieldKind::Text, v.as_bytes())
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(None)
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        if name == crate::FILE_TOKEN {
            return Ok(Some(FieldKind::Unsupported("file element")));
        }
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Ok(Some(FieldKind::Unsupported("enum newtype variant element")))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(Deferred(Some(FieldKind::Unsupported("nested sequence"))))
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(Deferred(Some(FieldKind::Unsupported("nested sequence"))))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(Deferred(Some(FieldKind::Unsupported("nested sequence"))))
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(Deferred(Some(FieldKind::Unsupported("enum tuple variant element"))))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(Deferred(Some(FieldKind::Unsupported("map element"))))
    }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(Deferred(Some(FieldKind::Unsupported("struct element"))))
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(Deferred(Some(FieldKind::Unsupported("enum struct variant element"))))
    }
}

// ── FileSerializer ─────────────────────────────────────────────────────────
//
// Reads the `(filename, content)` payload emitted by `File` and writes the
// file part. The same type serves each stage: the payload tuple struct, the
// filename (captured and returned) and the content bytes (written out).

#[derive(Clone, Copy, PartialEq, Eq)]
enum FileStage {
    Payload,
    Filename,
    Content,
}

struct FileSerializer<'a, 'e, W: Write> {
    ser: &'a mut Serializer<'e, W>,
    name: &'a str,
    filename: Option<&'a str>,
    stage: FileStage,
}

const MALFORMED_FILE: &str = "unexpected value in file payload";

impl<'a, 'e, W: Write> ser::Serializer for FileSerializer<'a, 'e, W> {
    type Ok = Option<String>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<String>, Error>;
    type SerializeTuple = Impossible<Option<String>, Error>;
    type SerializeTupleStruct = FileFields<'a, 'e, W>;
    type SerializeTupleVariant = Impossible<Option<String>, Error>;
    type SerializeMap = Impossible<Option<String>, Error>;
    type SerializeStruct = Impossible<Option<String>, Error>;
    type SerializeStructVariant = Impossible<Option<String>, Error>;

    scalar_fallbacks! {
        serialize_bool(bool) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_i8(i8) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_i16(i16) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_i32(i32) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_i64(i64) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_i128(i128) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_u8(u8) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_u16(u16) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_u32(u32) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_u64(u64) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_u128(u128) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_f32(f32) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_f64(f64) => Err(Error::InvalidFile(MALFORMED_FILE)),
        serialize_char(char) => Err(Error::InvalidFile(MALFORMED_FILE)),
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        match self.stage {
            FileStage::Filename => Ok(Some(v.to_string())),
            _ => Err(Error::InvalidFile(MALFORMED_FILE)),
        }
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        match self.stage {
            FileStage::Content => {
                self.ser.write_file(self.name, self.filename, v)?;
                Ok(None)
            }
            _ => Err(Error::InvalidFile(MALFORMED_FILE)),
        }
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        match self.stage {
            FileStage::Filename => Ok(None),
            _ => Err(Error::InvalidFile(MALFORMED_FILE)),
        }
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        if self.stage != FileStage::Payload || name != crate::FILE_TOKEN {
            return Err(Error::InvalidFile(MALFORMED_FILE));
        }
        Ok(FileFields {
            ser: self.ser,
            name: self.name,
            filename: None,
            index: 0,
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::InvalidFile(MALFORMED_FILE))
    }
}

struct FileFields<'a, 'e, W: Write> {
    ser: &'a mut Serializer<'e, W>,
    name: &'a str,
    filename: Option<String>,
    index: usize,
}

impl<'a, 'e, W: Write> ser::SerializeTupleStruct for FileFields<'a, 'e, W> {
    type Ok = Option<String>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let stage = match self.index {
            0 => FileStage::Filename,
            1 => FileStage::Content,
            _ => return Err(Error::InvalidFile(MALFORMED_FILE)),
        };
        let captured = value.serialize(FileSerializer {
            ser: &mut *self.ser,
            name: self.name,
            filename: self.filename.as_deref(),
            stage,
        })?;
        if stage == FileStage::Filename {
            self.filename = captured;
        }
        self.index += 1;
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        if self.index != 2 {
            return Err(Error::InvalidFile("incomplete file payload"));
        }
        Ok(None)
    }
}

// ── Deferred ───────────────────────────────────────────────────────────────
//
// A compound sink that ignores its contents and reports a fixed outcome.
// Used for kinds decided by their shape alone (nested structs, maps, ...).

struct Deferred(Option<FieldKind>);

macro_rules! deferred_element {
    ($t:path, $method:ident) => {
        impl $t for Deferred {
            type Ok = Option<FieldKind>;
            type Error = Error;
            fn $method<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
                Ok(())
            }
            fn end(self) -> Result<Self::Ok> {
                Ok(self.0)
            }
        }
    };
}

macro_rules! deferred_field {
    ($t:path) => {
        impl $t for Deferred {
            type Ok = Option<FieldKind>;
            type Error = Error;
            fn serialize_field<T: Serialize + ?Sized>(
                &mut self,
                _key: &'static str,
                _value: &T,
            ) -> Result<()> {
                Ok(())
            }
            fn end(self) -> Result<Self::Ok> {
                Ok(self.0)
            }
        }
    };
}

deferred_element!(ser::SerializeSeq, serialize_element);
deferred_element!(ser::SerializeTuple, serialize_element);
deferred_element!(ser::SerializeTupleStruct, serialize_field);
deferred_element!(ser::SerializeTupleVariant, serialize_field);
deferred_field!(ser::SerializeStruct);
deferred_field!(ser::SerializeStructVariant);

impl ser::SerializeMap for Deferred {
    type Ok = Option<FieldKind>;
    type Error = Error;
    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<()> {
        Ok(())
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }
    fn end(self) -> Result<Self::Ok> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(1e21), "1000000000000000000000");
        assert_eq!(format_float(f64::from(0.1f32)), "0.10000000149011612");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn test_wire_name() {
        let enc = Encoder::new();
        assert_eq!(enc.wire_name("X-Request-ID"), "X-Request-ID");
        assert!(matches!(enc.wire_name("user_age"), Cow::Borrowed("user_age")));
        let enc = Encoder::new().lowercase_keys(true);
        assert_eq!(enc.wire_name("IsActive"), "isactive");
        assert!(matches!(enc.wire_name("user_age"), Cow::Borrowed("user_age")));
    }

    #[test]
    fn test_file_name_resolution() {
        let enc = Encoder::new();
        assert_eq!(enc.file_name("avatar", Some("me.jpg"), b"\x89PNG\r\n\x1a\n"), "me.jpg");
        assert_eq!(enc.file_name("avatar", None, b"\x89PNG\r\n\x1a\n"), "avatar.png");
        assert_eq!(enc.file_name("avatar", Some(""), b"GIF89a.."), "avatar.gif");
        assert_eq!(enc.file_name("blob", None, &[0, 1]), "blob");

        let enc = Encoder::new().default_extension(".bin");
        assert_eq!(enc.file_name("blob", None, &[0, 1]), "blob.bin");
    }
}
