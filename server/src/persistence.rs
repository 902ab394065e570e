//! Vehicle persistence - disk I/O for vehicle records
//!
//! Records are stored one file per vehicle using bincode serialization.
//! Writes are atomic (temp file + rename) to prevent corruption.

use std::collections::HashMap;
use std::path::PathBuf;

use bevy::prelude::*;
use paint_shop_shared::{VehicleRecord, RECORD_VERSION};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vehicle record '{0}' not found")]
    NotFound(String),
    #[error("record version mismatch: found v{found}, expected v{expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),
}

/// Backend for the persisted vehicle documents
pub trait VehicleRecordStore: Send + Sync {
    fn save(&mut self, record: &VehicleRecord) -> Result<(), StoreError>;
    fn load(&self, id: &str) -> Result<VehicleRecord, StoreError>;
    fn load_all(&self) -> Result<Vec<VehicleRecord>, StoreError>;
}

/// Resource wrapping whichever store the server was started with
#[derive(Resource)]
pub struct VehicleStore {
    backend: Box<dyn VehicleRecordStore>,
}

impl VehicleStore {
    pub fn new(backend: impl VehicleRecordStore + 'static) -> Self {
        Self { backend: Box::new(backend) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryVehicleStore::default())
    }

    pub fn save(&mut self, record: &VehicleRecord) -> Result<(), StoreError> {
        self.backend.save(record)
    }

    pub fn load(&self, id: &str) -> Result<VehicleRecord, StoreError> {
        self.backend.load(id)
    }

    pub fn load_all(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        self.backend.load_all()
    }
}

/// File-per-record store under `storage_dir`
pub struct FileVehicleStore {
    storage_dir: PathBuf,
}

impl FileVehicleStore {
    /// Create the store, creating the directory if it doesn't exist
    pub fn new(storage_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&storage_dir)?;
        info!("Vehicle records will be saved to: {:?}", storage_dir);
        Ok(Self { storage_dir })
    }

    fn record_path(&self, id: &str, extension: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.{}", file_stem(id), extension))
    }

    fn read_path(&self, path: &std::path::Path) -> Result<VehicleRecord, StoreError> {
        let bytes = std::fs::read(path)?;
        let record: VehicleRecord = bincode::deserialize(&bytes)?;

        if record.version != RECORD_VERSION {
            return Err(StoreError::VersionMismatch {
                found: record.version,
                expected: RECORD_VERSION,
            });
        }

        Ok(record)
    }
}

impl VehicleRecordStore for FileVehicleStore {
    fn save(&mut self, record: &VehicleRecord) -> Result<(), StoreError> {
        let final_path = self.record_path(&record.id, "bin");
        let temp_path = self.record_path(&record.id, "tmp");

        let bytes = bincode::serialize(record)?;
        std::fs::write(&temp_path, &bytes)?;
        // Atomic rename (this is atomic on most filesystems)
        std::fs::rename(&temp_path, &final_path)?;

        debug!("Saved vehicle record: {} ({} bytes)", record.id, bytes.len());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<VehicleRecord, StoreError> {
        let path = self.record_path(id, "bin");
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.read_path(&path)
    }

    fn load_all(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.storage_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("bin") {
                continue;
            }
            match self.read_path(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable vehicle record {:?}: {}", path, e),
            }
        }
        Ok(records)
    }
}

/// In-memory store for tests and throwaway servers
#[derive(Default)]
pub struct MemoryVehicleStore {
    records: HashMap<String, VehicleRecord>,
}

impl VehicleRecordStore for MemoryVehicleStore {
    fn save(&mut self, record: &VehicleRecord) -> Result<(), StoreError> {
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<VehicleRecord, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn load_all(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

/// Keep ids usable as file names
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paint_shop_shared::{Rgb, Tuning, VehicleColor, VehicleType};
    use tempfile::TempDir;

    fn painted_record() -> VehicleRecord {
        let mut record = VehicleRecord::new("car-1", "alice", VehicleType::Car, [1.0, 2.0, 3.0]);
        record.tuning = Some(Tuning);
        record.state.primary_color = Some(VehicleColor::Custom(Rgb::new(10, 20, 30)));
        record.state.pearl_color = Some(3);
        record
    }

    #[test]
    fn test_file_store_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileVehicleStore::new(temp_dir.path().to_path_buf()).unwrap();

        let record = painted_record();
        store.save(&record).unwrap();

        assert_eq!(store.load("car-1").unwrap(), record);
        assert!(!temp_dir.path().join("car-1.tmp").exists());
    }

    #[test]
    fn test_file_store_missing_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileVehicleStore::new(temp_dir.path().to_path_buf()).unwrap();

        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_file_store_rejects_old_version() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileVehicleStore::new(temp_dir.path().to_path_buf()).unwrap();

        let mut record = painted_record();
        record.version = RECORD_VERSION + 1;
        store.save(&record).unwrap();

        assert!(matches!(
            store.load("car-1"),
            Err(StoreError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_file_store_load_all_skips_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileVehicleStore::new(temp_dir.path().to_path_buf()).unwrap();

        store.save(&painted_record()).unwrap();
        std::fs::write(temp_dir.path().join("broken.bin"), b"not a record").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"ignored").unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "car-1");
    }

    #[test]
    fn test_ids_are_sanitized() {
        assert_eq!(file_stem("../evil/id"), "___evil_id");
        assert_eq!(file_stem("car-1_b"), "car-1_b");
    }

    #[test]
    fn test_memory_store() {
        let mut store = VehicleStore::in_memory();
        store.save(&painted_record()).unwrap();

        assert_eq!(store.load("car-1").unwrap().state.pearl_color, Some(3));
        assert_eq!(store.load_all().unwrap().len(), 1);
    }
}
