#![allow(dead_code)]

use bytes::Bytes;
use formdata_serde::Form;
use std::convert::Infallible;
use std::io::{self, Write};

/// One part as seen by an independent multipart parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Decoded {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.data).unwrap()
    }
}

/// Parse `body` with `multer`, the way a server would receive it.
pub fn decode_body(body: Vec<u8>, content_type: &str) -> Vec<Decoded> {
    let boundary = multer::parse_boundary(content_type).unwrap();
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(async move {
        let stream =
            futures_util::stream::once(async move { Ok::<_, Infallible>(Bytes::from(body)) });
        let mut multipart = multer::Multipart::new(stream, boundary);
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(|m| m.to_string());
            let data = field.bytes().await.unwrap().to_vec();
            parts.push(Decoded {
                name,
                filename,
                content_type,
                data,
            });
        }
        parts
    })
}

pub fn decode(form: &Form) -> Vec<Decoded> {
    decode_body(form.body().to_vec(), &form.content_type())
}

pub fn named<'a>(parts: &'a [Decoded], name: &str) -> Vec<&'a Decoded> {
    parts.iter().filter(|p| p.name == name).collect()
}

/// A writer that accepts `limit` bytes and fails every write after that.
pub struct FailAfter {
    pub limit: usize,
    pub written: usize,
}

impl FailAfter {
    pub fn new(limit: usize) -> Self {
        FailAfter { limit, written: 0 }
    }
}

impl Write for FailAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.limit {
            return Err(io::Error::other("disk full"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const JPEG: [u8; 8] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
pub const GIF: [u8; 8] = [0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00];
pub const PDF: [u8; 8] = [0x25, 0x50, 0x44, 0x46, 0x2D, 0x31, 0x2E, 0x35];
