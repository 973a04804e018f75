use crate::map::{MapBounds, Minimap, MinimapConfig};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// Magic number for map snapshot files ("MMAP" in ASCII)
const MAGIC_NUMBER: [u8; 4] = [b'M', b'M', b'A', b'P'];

/// Current snapshot file format version
const VERSION: u16 = 1;

/// Error type for snapshot save/load
#[derive(Debug)]
pub enum PersistError {
    Io(io::Error),
    Encode(bincode::Error),
    InvalidMagicNumber,
    InvalidVersion(u16),
    InvalidLength(u32),
    InvalidChecksum,
}

impl From<io::Error> for PersistError {
    fn from(err: io::Error) -> Self {
        PersistError::Io(err)
    }
}

impl From<bincode::Error> for PersistError {
    fn from(err: bincode::Error) -> Self {
        PersistError::Encode(err)
    }
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "IO error: {}", e),
            PersistError::Encode(e) => write!(f, "Encoding error: {}", e),
            PersistError::InvalidMagicNumber => write!(f, "Invalid magic number"),
            PersistError::InvalidVersion(v) => write!(f, "Invalid version: {}", v),
            PersistError::InvalidLength(len) => write!(f, "Invalid payload length: {}", len),
            PersistError::InvalidChecksum => write!(f, "Checksum mismatch"),
        }
    }
}

impl std::error::Error for PersistError {}

/// Configuration plus runtime state of a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapSnapshot {
    pub config: MinimapConfig,
    pub visible: bool,
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    /// Only present once bounds were detected
    pub bounds: Option<MapBounds>,
}

impl MinimapSnapshot {
    pub fn capture(map: &Minimap) -> Self {
        Self {
            config: map.config().clone(),
            visible: map.is_visible(),
            position: map.position(),
            width: map.width(),
            height: map.height(),
            zoom: map.zoom_level(),
            bounds: map.bounds_detected().then(|| map.bounds()),
        }
    }

    pub fn restore(&self) -> Minimap {
        let mut map = Minimap::from_config(self.config.clone()).with_position(self.position);
        map.set_visible(self.visible);
        map.set_width(self.width);
        map.set_height(self.height);
        map.set_zoom(self.zoom);
        if let Some(bounds) = self.bounds {
            map.set_bounds(bounds);
        }
        map
    }
}

/// Save a map snapshot to disk in binary format
pub fn save_minimap<P: AsRef<Path>>(snapshot: &MinimapSnapshot, path: P) -> Result<(), PersistError> {
    // Ensure directory exists
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = bincode::serialize(snapshot)?;
    let mut file = File::create(path)?;

    file.write_all(&MAGIC_NUMBER)?;
    file.write_all(&VERSION.to_le_bytes())?;
    file.write_all(&(payload.len() as u32).to_le_bytes())?;
    file.write_all(&payload)?;

    let checksum = crc32fast::hash(&payload);
    file.write_all(&checksum.to_le_bytes())?;

    file.sync_all()?;
    Ok(())
}

/// Load a map snapshot from disk
pub fn load_minimap<P: AsRef<Path>>(path: P) -> Result<MinimapSnapshot, PersistError> {
    let mut file = File::open(path)?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if magic != MAGIC_NUMBER {
        return Err(PersistError::InvalidMagicNumber);
    }

    let mut version_bytes = [0u8; 2];
    file.read_exact(&mut version_bytes)?;
    let version = u16::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(PersistError::InvalidVersion(version));
    }

    let mut len_bytes = [0u8; 4];
    file.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes);
    if u64::from(len) > file.metadata()?.len() {
        return Err(PersistError::InvalidLength(len));
    }
    let mut payload = vec![0u8; len as usize];
    file.read_exact(&mut payload)?;

    let mut checksum_bytes = [0u8; 4];
    file.read_exact(&mut checksum_bytes)?;
    if crc32fast::hash(&payload) != u32::from_le_bytes(checksum_bytes) {
        return Err(PersistError::InvalidChecksum);
    }

    Ok(bincode::deserialize(&payload)?)
}
