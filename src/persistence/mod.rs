use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

use thiserror::Error;
use tracing::debug;

pub mod header;
mod restore;
pub mod schema;

use crate::{
    repository::Repository,
    router::TransportRouter,
    shared::settings::{RenderSettings, RoutingSettings},
};
use schema::CatalogueRecord;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("Not a catalogue snapshot")]
    BadMagic,
    #[error("Snapshot format version {0} is not supported")]
    UnsupportedVersion(u32),
    #[error("Snapshot is truncated")]
    Truncated,
    #[error("Snapshot checksum does not match its payload")]
    ChecksumMismatch,
    #[error("Snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// Everything the query step needs, written by the build step.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub repository: Repository,
    pub render_settings: RenderSettings,
    pub routing_settings: RoutingSettings,
    pub router: TransportRouter,
}

pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, self::Error> {
    debug!("Encoding snapshot...");
    let now = Instant::now();
    let payload = bincode::serialize(&CatalogueRecord::from(snapshot))?;
    let bytes = header::wrap(&payload);
    debug!("Encoding snapshot took {:?} ({} bytes)", now.elapsed(), bytes.len());
    Ok(bytes)
}

/// Decodes and validates a snapshot. Nothing is returned unless every
/// reference inside the blob checks out.
pub fn decode(bytes: &[u8]) -> Result<Snapshot, self::Error> {
    debug!("Decoding snapshot...");
    let now = Instant::now();
    let payload = header::unwrap(bytes)?;
    let record: CatalogueRecord = bincode::deserialize(payload)?;
    let snapshot = Snapshot::try_from(record)?;
    debug!("Decoding snapshot took {:?}", now.elapsed());
    Ok(snapshot)
}

/// Writes the snapshot next to `path` first and renames it into place, so
/// a crash never leaves a half written file behind. A failed write removes
/// the temporary file again.
pub fn save<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<(), self::Error> {
    let path = path.as_ref();
    let bytes = encode(snapshot)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path(path);
    if let Err(err) = write_and_replace(&tmp_path, path, &bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    debug!("Saved snapshot to {}", path.display());
    Ok(())
}

fn write_and_replace(tmp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(tmp_path, path)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Snapshot, self::Error> {
    let path = path.as_ref();
    debug!("Loading snapshot from {}", path.display());
    let bytes = fs::read(path)?;
    decode(&bytes)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
