#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::write::FileOptions;

pub const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <groupId>org.mozilla.telemetry</groupId>
  <artifactId>glean</artifactId>
  <version>1.2.3</version>
</project>
"#;

/// Deterministic bytes that deflate does not shrink.
pub fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

pub enum Member<'a> {
    File(&'a str, &'a [u8], CompressionMethod),
    Dir(&'a str),
}

/// Build a zip archive in memory.
pub fn build_zip(members: &[Member<'_>], comment: Option<&str>) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for member in members {
        match member {
            Member::File(name, data, method) => {
                let options = FileOptions::default().compression_method(*method);
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            Member::Dir(name) => {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            }
        }
    }
    if let Some(comment) = comment {
        writer.set_comment(comment);
    }
    writer.finish().unwrap().into_inner()
}

/// The release archive used across tests: two glean artifacts and one stray file.
pub fn release_zip() -> Vec<u8> {
    let aar = noise(4096);
    build_zip(
        &[
            Member::File("glean-1.2.3.aar", &aar, CompressionMethod::Deflated),
            Member::File("glean-1.2.3.pom", POM.as_bytes(), CompressionMethod::Stored),
            Member::File("unrelated.txt", b"not published", CompressionMethod::Deflated),
        ],
        None,
    )
}
