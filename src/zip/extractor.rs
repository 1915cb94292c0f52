use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all entries in the archive, directories included
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Decompress an entry into memory.
    ///
    /// Output is capped at the declared uncompressed size, and both the size
    /// and the CRC-32 must match the Central Directory.
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            bail!("Entry {:?} is encrypted", entry.file_name);
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut compressed)
            .await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => {
                if entry.compressed_size != entry.uncompressed_size {
                    bail!(
                        "Stored entry {:?} has mismatched sizes ({} compressed, {} uncompressed)",
                        entry.file_name,
                        entry.compressed_size,
                        entry.uncompressed_size
                    );
                }
                compressed
            }
            CompressionMethod::Deflate => {
                let mut data = Vec::with_capacity(entry.uncompressed_size as usize);
                DeflateDecoder::new(compressed.as_slice())
                    .take(entry.uncompressed_size + 1)
                    .read_to_end(&mut data)
                    .with_context(|| format!("Failed to inflate {:?}", entry.file_name))?;
                if data.len() as u64 != entry.uncompressed_size {
                    bail!(
                        "Entry {:?} inflated to {} bytes, expected {}",
                        entry.file_name,
                        data.len(),
                        entry.uncompressed_size
                    );
                }
                data
            }
            CompressionMethod::Unknown(method) => bail!(
                "Unsupported compression method {} for {:?} (only STORED and DEFLATE are supported)",
                method,
                entry.file_name
            ),
        };

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!(
                "CRC-32 mismatch for {:?}: expected {:08x}, got {:08x}",
                entry.file_name,
                entry.crc32,
                crc.sum()
            );
        }

        Ok(data)
    }
}
