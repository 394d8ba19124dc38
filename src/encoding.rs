//! Byte-order-mark detection.
//!
//! Encodings are identified only so that line terminators can be found and
//! written in the file's own code units. Content is never transcoded.

use std::io::{self, Read, Seek, SeekFrom};

use thiserror::Error;

/// Text encodings recognised by their byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf32Be,
    Utf32Le,
    Utf16Le,
    Utf16Be,
    Utf8,
    /// No BOM: the platform's single-byte default. UTF-8 without a BOM also lands here,
    /// which is fine because CR and LF are single bytes in both.
    SingleByte,
}

impl Encoding {
    /// Width in bytes of one code unit.
    pub fn unit_width(self) -> usize {
        match self {
            Encoding::Utf32Be | Encoding::Utf32Le => 4,
            Encoding::Utf16Le | Encoding::Utf16Be => 2,
            Encoding::Utf8 | Encoding::SingleByte => 1,
        }
    }

    /// Encodes an ASCII character as a single code unit.
    pub fn encode_ascii(self, ch: u8) -> ([u8; 4], usize) {
        match self {
            Encoding::Utf32Be => ([0, 0, 0, ch], 4),
            Encoding::Utf32Le => ([ch, 0, 0, 0], 4),
            Encoding::Utf16Le => ([ch, 0, 0, 0], 2),
            Encoding::Utf16Be => ([0, ch, 0, 0], 2),
            Encoding::Utf8 | Encoding::SingleByte => ([ch, 0, 0, 0], 1),
        }
    }

    /// The byte-order mark written at the start of files in this encoding.
    pub fn bom(self) -> &'static [u8] {
        SIGNATURES
            .iter()
            .find(|s| s.encoding == self)
            .map(|s| s.bytes)
            .unwrap_or(&[])
    }

    /// Human-readable name used in log output, e.g. `UTF-16LE`.
    ///
    /// Streams without a byte-order mark report `default`.
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf32Be => "UTF-32BE",
            Encoding::Utf32Le => "UTF-32LE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf8 => "UTF-8",
            Encoding::SingleByte => "default",
        }
    }
}

struct Signature {
    bytes: &'static [u8],
    encoding: Encoding,
}

/// Scanned in order; the first prefix match wins. `FF FE 00 00` must stay ahead
/// of `FF FE` so UTF-32LE takes precedence over UTF-16LE.
const SIGNATURES: &[Signature] = &[
    Signature { bytes: &[0x00, 0x00, 0xFE, 0xFF], encoding: Encoding::Utf32Be },
    Signature { bytes: &[0xFF, 0xFE, 0x00, 0x00], encoding: Encoding::Utf32Le },
    Signature { bytes: &[0xFF, 0xFE], encoding: Encoding::Utf16Le },
    Signature { bytes: &[0xFE, 0xFF], encoding: Encoding::Utf16Be },
    Signature { bytes: &[0xEF, 0xBB, 0xBF], encoding: Encoding::Utf8 },
];

/// Result of BOM detection: the encoding and how many leading bytes the BOM occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub encoding: Encoding,
    pub bom_length: usize,
}

/// The stream could not be rewound or read, so its leading bytes are unknown.
#[derive(Debug, Error)]
#[error("encoding detection requires a seekable and readable stream: {0}")]
pub struct UnsupportedStreamError(#[from] io::Error);

/// Matches up to four leading bytes against the signature table.
pub fn detect_prefix(prefix: &[u8]) -> Detection {
    match SIGNATURES.iter().find(|s| prefix.starts_with(s.bytes)) {
        Some(s) => Detection { encoding: s.encoding, bom_length: s.bytes.len() },
        None => Detection { encoding: Encoding::SingleByte, bom_length: 0 },
    }
}

/// Detects the encoding of `stream` from its first four bytes.
///
/// On return the cursor sits immediately after the BOM, or at offset 0 when
/// there is none.
pub fn detect<S: Read + Seek>(stream: &mut S) -> Result<Detection, UnsupportedStreamError> {
    stream.seek(SeekFrom::Start(0))?;

    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        match stream.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let detection = detect_prefix(&prefix[..filled]);
    stream.seek(SeekFrom::Start(detection.bom_length as u64))?;
    Ok(detection)
}
