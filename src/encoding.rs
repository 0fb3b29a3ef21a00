//! Corpus decoding
//!
//! Dictionary exports are frequently Latin-1 or Windows-1252 rather than UTF-8.
//! A byte order mark decides first; otherwise `chardetng` guesses from a sample.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::fs::File;
use std::path::Path;

/// Bytes fed to the detector
const SAMPLE_SIZE: usize = 64 * 1024;

/// How a corpus was decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEncoding {
    pub encoding: &'static Encoding,
    /// Byte order mark length skipped before decoding
    pub bom_len: usize,
    /// Whether malformed sequences were replaced
    pub lossy: bool,
}

impl SourceEncoding {
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

impl Default for SourceEncoding {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            bom_len: 0,
            lossy: false,
        }
    }
}

/// Pick the encoding of `bytes`: BOM, then a detector guess on the leading sample
pub fn sniff(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some(found) = Encoding::for_bom(bytes) {
        return found;
    }

    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    (detector.guess(None, true), 0)
}

/// Decode `bytes` to UTF-8, replacing malformed sequences
pub fn decode(bytes: &[u8]) -> (String, SourceEncoding) {
    if bytes.is_empty() {
        return (String::new(), SourceEncoding::default());
    }

    let (encoding, bom_len) = sniff(bytes);
    let (text, lossy) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if lossy {
        log::warn!("Malformed {} sequences replaced while decoding", encoding.name());
    }

    let source = SourceEncoding {
        encoding,
        bom_len,
        lossy,
    };
    (text.into_owned(), source)
}

/// Memory-map a file and decode it to UTF-8
pub fn read_to_utf8(path: &Path) -> anyhow::Result<(String, SourceEncoding)> {
    let file = File::open(path).map_err(|e| anyhow::anyhow!("Cannot open {:?}: {}", path, e))?;

    if file.metadata()?.len() == 0 {
        return Ok((String::new(), SourceEncoding::default()));
    }

    // SAFETY: the map is read-only and dropped before this function returns
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    let (text, source) = decode(&mmap);

    log::debug!("{:?}: {} bytes decoded as {}", path, mmap.len(), source.name());
    Ok((text, source))
}
