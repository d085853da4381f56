//! Replay file storage with Zstd compression.
//!
//! Replays are stored as compressed binary files named `{hash}.r` inside a
//! caller-chosen directory. Data is serialized with `bincode` before
//! compression to minimize size.

use crate::models::replay::ReplayData;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zstd::stream::{decode_all, encode_all};

/// Zstd level used for new files (maximum).
const COMPRESSION_LEVEL: i32 = 21;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("replay I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("replay serialization error: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("replay deserialization error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Get the path for a replay file given its hash.
pub fn replay_path(dir: &Path, hash: &str) -> PathBuf {
    dir.join(format!("{}.r", hash))
}

/// Save replay data to a compressed binary file and return its path.
pub fn save_replay(dir: &Path, data: &ReplayData) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(dir)?;

    let hash = data.hash()?;
    let path = replay_path(dir, &hash);

    let binary_data = bincode::serde::encode_to_vec(data, bincode::config::standard())?;
    let compressed_data = encode_all(&binary_data[..], COMPRESSION_LEVEL)?;

    let mut file = File::create(&path)?;
    file.write_all(&compressed_data)?;

    log::info!(
        "Saved replay {:?} ({} events, {} bytes)",
        path,
        data.events.len(),
        compressed_data.len()
    );
    Ok(path)
}

/// Load and decompress replay data stored under `hash`.
pub fn load_replay(dir: &Path, hash: &str) -> Result<ReplayData, StorageError> {
    load_replay_from_path(&replay_path(dir, hash))
}

/// Load replay data from a specific path.
pub fn load_replay_from_path(path: &Path) -> Result<ReplayData, StorageError> {
    let file = File::open(path)?;
    let binary_data = decode_all(file)?;

    let (data, _len): (ReplayData, usize) =
        bincode::serde::decode_from_slice(&binary_data, bincode::config::standard())?;

    log::info!("Loaded replay {:?} ({} events)", path, data.events.len());
    Ok(data)
}

/// Delete a replay file.
pub fn delete_replay(dir: &Path, hash: &str) -> Result<(), StorageError> {
    let path = replay_path(dir, hash);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Check if a replay file exists.
pub fn replay_exists(dir: &Path, hash: &str) -> bool {
    replay_path(dir, hash).exists()
}
