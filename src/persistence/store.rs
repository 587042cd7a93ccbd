//! Byte storage for map files

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Whole-file read and write, keyed by relative path
pub trait MapStore {
    fn load(&self, path: &str) -> io::Result<Vec<u8>>;
    fn save(&mut self, path: &str, data: &[u8]) -> io::Result<()>;
}

/// Files under a root directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MapStore for FsStore {
    fn load(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }

    fn save(&mut self, path: &str, data: &[u8]) -> io::Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, data)
    }
}

/// In-memory files, for tests and tools
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub files: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapStore for MemoryStore {
    fn load(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn save(&mut self, path: &str, data: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.load("maps/map0.bin").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        store.save("maps/map0.bin", &[1, 2, 3]).unwrap();
        assert_eq!(store.load("maps/map0.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_fs_store_creates_directories() {
        let root = std::env::temp_dir().join(format!("laser_puzzle_store_{}", std::process::id()));
        let mut store = FsStore::new(&root);
        store.save("maps/map3.bin", b"abc").unwrap();
        assert_eq!(store.load("maps/map3.bin").unwrap(), b"abc");
        let _ = std::fs::remove_dir_all(&root);
    }
}
