use xxhash_rust::xxh3::xxh3_64;

use crate::persistence::Error;

/// Identifies a catalogue snapshot.
pub const MAGIC: [u8; 4] = *b"TRCT";

/// Bumped whenever the payload schema changes.
pub const FORMAT_VERSION: u32 = 1;

/// magic (4) + version (4) + payload length (8) + checksum (8)
pub const HEADER_SIZE: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub payload_len: u64,
    pub checksum: u64,
}

impl Header {
    pub fn new(payload: &[u8]) -> Self {
        Self {
            version: FORMAT_VERSION,
            payload_len: payload.len() as u64,
            checksum: xxh3_64(payload),
        }
    }
}

/// Prepends the header to an encoded payload.
pub fn wrap(payload: &[u8]) -> Vec<u8> {
    let header = Header::new(payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.version.to_le_bytes());
    out.extend_from_slice(&header.payload_len.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Checks the header and returns the payload it guards.
pub fn unwrap(bytes: &[u8]) -> Result<&[u8], Error> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::BadMagic);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(Error::Truncated);
    }

    let version = u32::from_le_bytes(fixed(&bytes[4..8]));
    let payload_len = u64::from_le_bytes(fixed(&bytes[8..16]));
    let checksum = u64::from_le_bytes(fixed(&bytes[16..24]));

    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let payload = &bytes[HEADER_SIZE..];
    if (payload.len() as u64) < payload_len {
        return Err(Error::Truncated);
    }
    if (payload.len() as u64) > payload_len {
        return Err(Error::Corrupt(format!(
            "{} trailing bytes after the payload",
            payload.len() as u64 - payload_len
        )));
    }
    if xxh3_64(payload) != checksum {
        return Err(Error::ChecksumMismatch);
    }
    Ok(payload)
}

fn fixed<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}
