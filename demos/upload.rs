//! Builds an upload request and prints it as raw HTTP/1.1.
//!
//! ```text
//! cargo run --example upload
//! ```

use formdata_serde::{File, to_form};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct Address {
    street: String,
    city: String,
}

#[derive(Serialize)]
struct Upload {
    username: String,
    #[serde(rename = "user_age")]
    age: u32,
    #[serde(rename = "-")]
    session_token: String,
    tags: Vec<String>,
    #[serde(with = "serde_bytes")]
    avatar: Vec<u8>,
    resume: File,
    address: Address,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let upload = Upload {
        username: "johndoe".into(),
        age: 30,
        session_token: "never sent".into(),
        tags: vec!["example".into(), "upload".into()],
        avatar: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        resume: File::named("resume.pdf", b"%PDF-1.5 fake resume".to_vec()),
        address: Address {
            street: "123 Main St".into(),
            city: "Springfield".into(),
        },
    };

    let form = to_form(&upload)?;
    let parts = form.part_count();
    let (body, content_type) = form.into_parts();

    let mut out = io::stdout().lock();
    write!(out, "POST /upload HTTP/1.1\r\n")?;
    write!(out, "Host: localhost:8080\r\n")?;
    write!(out, "Content-Type: {}\r\n", content_type)?;
    write!(out, "Content-Length: {}\r\n\r\n", body.len())?;
    out.write_all(&body)?;
    writeln!(out)?;
    eprintln!("{} parts, {} bytes", parts, body.len());
    Ok(())
}
