// File: crates/overlay-core/src/storage.rs
// Summary: Key/value persistence seam for shape lists, with in-memory and file-backed stores.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{OverlayError, Result};
use crate::shape::DomainShape;

/// String key/value storage the drawing store persists into.
pub trait ShapeStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl ShapeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_err(path: &Path, source: std::io::Error) -> OverlayError {
    OverlayError::Io { path: path.to_path_buf(), source }
}

fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "empty"
    } else if key.starts_with('.') {
        "leading dot"
    } else if !key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        "only ASCII letters, digits, '.', '_' and '-' are allowed"
    } else {
        return Ok(());
    };
    Err(OverlayError::InvalidKey { key: key.to_string(), reason: reason.to_string() })
}

impl ShapeStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        std::fs::write(&path, value).map_err(|e| io_err(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_err(&path, e)),
            _ => Ok(()),
        }
    }
}

/// Storage key for one (symbol, timeframe) scope: `<namespace>.<symbol>.<timeframe>`.
pub fn storage_key(namespace: &str, symbol: &str, timeframe: &str) -> String {
    format!("{namespace}.{symbol}.{timeframe}")
}

pub fn encode_shapes(shapes: &[DomainShape]) -> Result<String> {
    Ok(serde_json::to_string(shapes)?)
}

/// Parse a persisted shape list. Ids must be unique within the list.
pub fn decode_shapes(raw: &str) -> Result<Vec<DomainShape>> {
    let shapes: Vec<DomainShape> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(shapes.len());
    if let Some(dup) = shapes.iter().find(|s| !seen.insert(s.id)) {
        return Err(OverlayError::DuplicateId(dup.id));
    }
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Geometry, Shape, ShapeId};
    use crate::types::DomainPoint;

    #[test]
    fn key_joins_scope_parts() {
        assert_eq!(storage_key("overlay", "BTCUSD", "1h"), "overlay.BTCUSD.1h");
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut fs = FileStorage::new(dir.path());
        assert!(matches!(fs.set("../escape", "[]"), Err(OverlayError::InvalidKey { .. })));
        assert!(matches!(fs.get("a/b"), Err(OverlayError::InvalidKey { .. })));
        assert!(fs.set("overlay.ES.5m", "[]").is_ok());
        assert_eq!(fs.get("overlay.ES.5m").unwrap().as_deref(), Some("[]"));
        fs.remove("overlay.ES.5m").unwrap();
        fs.remove("overlay.ES.5m").unwrap();
        assert_eq!(fs.get("overlay.ES.5m").unwrap(), None);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let s = Shape::new(ShapeId(1), Geometry::Hline { points: [DomainPoint::new(0.0, 1.0)] });
        let raw = encode_shapes(&[s.clone(), s]).unwrap();
        assert!(matches!(decode_shapes(&raw), Err(OverlayError::DuplicateId(ShapeId(1)))));
    }
}
