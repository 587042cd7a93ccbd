//! Map persistence
//!
//! Features:
//! - Fixed-layout little-endian binary format with a stride field for forward compatibility
//! - Storage abstracted behind [`MapStore`] (filesystem or in-memory)
//! - Numbered map slots with lazy creation of empty maps

pub mod codec;
pub mod library;
pub mod store;

pub use codec::{deserialize_map, serialize_map};
pub use library::{MAX_MAP_SLOTS, MapLibrary, map_path};
pub use store::{FsStore, MapStore, MemoryStore};

use thiserror::Error;

/// Errors raised while reading, writing or selecting maps
#[derive(Debug, Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Map data is empty or has no header")]
    Empty,

    #[error("Map data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Map declares {count} elements with a zero-byte record size")]
    ZeroStride { count: usize },

    #[error("Map slot {index} out of range (0..{slots})")]
    SlotOutOfRange { index: usize, slots: usize },
}
