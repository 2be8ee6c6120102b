//! A minimal multipart/form-data writer (RFC 7578).
//!
//! [`FormWriter`] owns the boundary and frames parts around an arbitrary
//! `W: std::io::Write`. Each `create_*` call writes the delimiter and part
//! headers and returns a [`Part`] handle for the body bytes; the next call
//! (or [`FormWriter::finish`]) implicitly ends the previous part.
//!
//! ## Wire format
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="title"\r\n
//! \r\n
//! hello
//! \r\n--<boundary>\r\n
//! Content-Disposition: form-data; name="avatar"; filename="avatar.png"\r\n
//! Content-Type: application/octet-stream\r\n
//! \r\n
//! <raw bytes>
//! \r\n--<boundary>--\r\n
//! ```

use std::cell::Cell;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::io::{self, Write};
use std::num::Wrapping;

/// Content type given to every file part.
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Writes multipart/form-data framing into `W`.
pub struct FormWriter<W: Write> {
    writer: W,
    boundary: String,
    parts: usize,
}

impl<W: Write> FormWriter<W> {
    /// Create a writer with a freshly generated random boundary.
    pub fn new(writer: W) -> Self {
        FormWriter {
            writer,
            boundary: gen_boundary(),
            parts: 0,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Number of parts created so far.
    pub fn part_count(&self) -> usize {
        self.parts
    }

    /// The `Content-Type` header value matching this body.
    pub fn content_type(&self) -> String {
        content_type_for(&self.boundary)
    }

    /// Start a plain form field named `name`.
    pub fn create_form_field(&mut self, name: &str) -> io::Result<Part<'_, W>> {
        let mut headers = Vec::with_capacity(name.len() + 48);
        headers.extend_from_slice(b"Content-Disposition: form-data; name=\"");
        headers.extend_from_slice(escape_param(name).as_bytes());
        headers.extend_from_slice(b"\"\r\n");
        self.create_part(&headers)
    }

    /// Start a file part named `name` carrying `filename`.
    pub fn create_form_file(&mut self, name: &str, filename: &str) -> io::Result<Part<'_, W>> {
        let mut headers = Vec::with_capacity(name.len() + filename.len() + 96);
        headers.extend_from_slice(b"Content-Disposition: form-data; name=\"");
        headers.extend_from_slice(escape_param(name).as_bytes());
        headers.extend_from_slice(b"\"; filename=\"");
        headers.extend_from_slice(escape_param(filename).as_bytes());
        headers.extend_from_slice(b"\"\r\nContent-Type: ");
        headers.extend_from_slice(FILE_CONTENT_TYPE.as_bytes());
        headers.extend_from_slice(b"\r\n");
        self.create_part(&headers)
    }

    /// Write a complete form field in one call.
    pub fn write_field(&mut self, name: &str, value: &[u8]) -> io::Result<()> {
        self.create_form_field(name)?.write_all(value)
    }

    /// Write the closing delimiter and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.parts > 0 {
            write!(self.writer, "\r\n--{}--\r\n", self.boundary)?;
        } else {
            write!(self.writer, "--{}--\r\n", self.boundary)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn create_part(&mut self, headers: &[u8]) -> io::Result<Part<'_, W>> {
        if self.parts > 0 {
            write!(self.writer, "\r\n--{}\r\n", self.boundary)?;
        } else {
            write!(self.writer, "--{}\r\n", self.boundary)?;
        }
        self.parts += 1;
        self.writer.write_all(headers)?;
        self.writer.write_all(b"\r\n")?;
        Ok(Part {
            writer: &mut self.writer,
        })
    }
}

/// Body writer for the part most recently created on a [`FormWriter`].
pub struct Part<'a, W: Write> {
    writer: &'a mut W,
}

impl<W: Write> Write for Part<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

pub(crate) fn content_type_for(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

// Quoted-string escaping for `name` / `filename`. Line breaks are
// percent-encoded so a value can never end the header line.
fn escape_param(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains(['\\', '"', '\r', '\n']) {
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\r', "%0D")
            .replace('\n', "%0A")
            .into()
    } else {
        value.into()
    }
}

fn gen_boundary() -> String {
    let a = fast_random();
    let b = fast_random();
    let c = fast_random();
    let d = fast_random();

    format!("{a:016x}-{b:016x}-{c:016x}-{d:016x}")
}

// xorshift64*, seeded once per thread from the std hasher keys
fn fast_random() -> u64 {
    thread_local! {
        static RNG: Cell<Wrapping<u64>> = Cell::new(Wrapping(seed()));
    }

    fn seed() -> u64 {
        let seed = RandomState::new();
        let mut out = 0;
        let mut cnt = 0;
        while out == 0 {
            cnt += 1;
            let mut hasher = seed.build_hasher();
            hasher.write_usize(cnt);
            out = hasher.finish();
        }
        out
    }

    RNG.with(|rng| {
        let mut n = rng.get();
        debug_assert_ne!(n.0, 0);
        n ^= n >> 12;
        n ^= n << 25;
        n ^= n >> 27;
        rng.set(n);
        n.0.wrapping_mul(0x2545_f491_4f6c_dd1d)
    })
}
