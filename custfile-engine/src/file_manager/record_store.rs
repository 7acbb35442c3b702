//! Record store - positional lookup over a flat fixed-width record file
//!
//! Record `n` (1-based) lives at byte offset `(n - 1) * width`. Each fetch
//! seeks there and reads exactly one record; nothing is cached and nothing
//! is written.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::storage::layout::RecordLayout;
use crate::storage::record::{self, Record};

/// Lifecycle state of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed, file not opened yet
    Unopened,
    /// File handle held, fetches allowed
    Open,
    /// File handle released
    Closed,
}

/// Read-only store over one record file
///
/// The file handle sits behind a mutex so that a seek and its read are never
/// interleaved with another caller's. Independent stores over the same file
/// each own their own handle.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    layout: Arc<RecordLayout>,
    file: Option<Mutex<File>>,
    state: StoreState,
}

impl RecordStore {
    /// Create a store without opening the file
    pub fn new(path: impl AsRef<Path>, layout: Arc<RecordLayout>) -> Self {
        RecordStore {
            path: path.as_ref().to_path_buf(),
            layout,
            file: None,
            state: StoreState::Unopened,
        }
    }

    /// Open a record file for lookups
    pub fn open(path: impl AsRef<Path>, layout: Arc<RecordLayout>) -> StoreResult<Self> {
        let mut store = RecordStore::new(path, layout);
        store.open_file()?;
        Ok(store)
    }

    /// Acquire the file handle, moving the store to `Open`
    ///
    /// Calling this on an open store is a no-op. A closed store can be
    /// opened again.
    pub fn open_file(&mut self) -> StoreResult<()> {
        if self.state == StoreState::Open {
            return Ok(());
        }

        let unavailable = |source: io::Error| StoreError::StoreUnavailable {
            path: self.path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .open(&self.path)
            .map_err(unavailable)?;

        // Some platforms happily open a directory for reading
        let metadata = file.metadata().map_err(unavailable)?;
        if metadata.is_dir() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::Other,
                "is a directory",
            )));
        }

        self.file = Some(Mutex::new(file));
        self.state = StoreState::Open;
        Ok(())
    }

    /// Fetch the record for a 1-based decimal identifier
    pub fn fetch(&self, identifier: &str) -> StoreResult<Record> {
        let file = self.file.as_ref().ok_or(StoreError::NotOpen)?;

        let number: i64 = identifier
            .parse()
            .map_err(|_| StoreError::InvalidIdentifier(identifier.to_string()))?;

        let offset = self
            .offset_of(number)
            .ok_or(StoreError::NotFound(number))?;

        let mut data = vec![0u8; self.layout.total_width()];
        {
            let mut file = file.lock();
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut data).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    StoreError::NotFound(number)
                } else {
                    StoreError::IoFault(e)
                }
            })?;
        }

        Ok(record::decode(&self.layout, &data))
    }

    /// Byte offset of record `number`, or `None` if it cannot exist
    ///
    /// Offsets past `i64::MAX` are rejected: the OS seek takes a signed offset.
    fn offset_of(&self, number: i64) -> Option<u64> {
        let index = u64::try_from(number.checked_sub(1)?).ok()?;
        let width = u64::try_from(self.layout.total_width()).ok()?;
        index
            .checked_mul(width)
            .filter(|&offset| offset <= i64::MAX as u64)
    }

    /// Number of complete records in the file
    ///
    /// A trailing partial record is not counted.
    pub fn record_count(&self) -> StoreResult<u64> {
        let file = self.file.as_ref().ok_or(StoreError::NotOpen)?;
        let len = file.lock().metadata()?.len();
        Ok(len / self.layout.total_width() as u64)
    }

    /// Release the file handle
    ///
    /// Safe to call repeatedly and on a store that never opened.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            self.state = StoreState::Closed;
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Check if fetches are allowed
    pub fn is_open(&self) -> bool {
        self.state == StoreState::Open
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Layout used to decode records
    pub fn layout(&self) -> &Arc<RecordLayout> {
        &self.layout
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::layout::FieldSpec;
    use crate::storage::record::encode;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn id_name() -> Arc<RecordLayout> {
        Arc::new(
            RecordLayout::new(vec![FieldSpec::new("id", 6), FieldSpec::new("name", 10)])
                .unwrap(),
        )
    }

    const NAMES: [&str; 3] = ["John", "Mary Ann", "Zed"];

    fn fixture(layout: &RecordLayout) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for (i, name) in NAMES.iter().enumerate() {
            let record = Record::new()
                .with("id", format!("{:06}", i + 1))
                .with("name", *name);
            file.write_all(&encode(layout, &record).unwrap()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_fetch_every_record() {
        let layout = id_name();
        let file = fixture(&layout);
        let store = RecordStore::open(file.path(), layout).unwrap();

        for (i, name) in NAMES.iter().enumerate() {
            let record = store.fetch(&(i + 1).to_string()).unwrap();
            assert_eq!(record.get("id"), Some(format!("{:06}", i + 1).as_str()));
            assert_eq!(record.get("name"), Some(*name));
        }
    }

    #[test]
    fn test_fetch_matches_raw_bytes() {
        let layout = id_name();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"000001John      000002Mary      ").unwrap();
        file.flush().unwrap();

        let store = RecordStore::open(file.path(), layout).unwrap();
        let record = store.fetch("2").unwrap();
        assert_eq!(record.get("id"), Some("000002"));
        assert_eq!(record.get("name"), Some("Mary"));
    }

    #[test]
    fn test_fetch_out_of_range_is_not_found() {
        let layout = id_name();
        let file = fixture(&layout);
        let store = RecordStore::open(file.path(), layout).unwrap();

        for id in ["0", "-1", "4", "9223372036854775807", "-9223372036854775808"] {
            let err = store.fetch(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "identifier {id}");
        }
    }

    #[test]
    fn test_fetch_offset_beyond_signed_range_is_not_found() {
        let layout = Arc::new(RecordLayout::customer());
        let mut file = NamedTempFile::new().unwrap();
        let record = Record::new().with("id", "000001").with("name", "John");
        file.write_all(&encode(&layout, &record).unwrap()).unwrap();
        file.flush().unwrap();

        let store = RecordStore::open(file.path(), layout).unwrap();
        for id in ["92233720368547759", "100000000000000000", "184467440737095516"] {
            let err = store.fetch(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "identifier {id}");
        }
        assert_eq!(store.fetch("1").unwrap().get("name"), Some("John"));
    }

    #[test]
    fn test_fetch_rejects_non_numeric() {
        let layout = id_name();
        let file = fixture(&layout);
        let store = RecordStore::open(file.path(), layout).unwrap();

        for id in ["abc", "", "12.5", " 1", "1x", "99999999999999999999"] {
            let err = store.fetch(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidIdentifier, "identifier {id:?}");
        }
    }

    #[test]
    fn test_trailing_partial_record_is_not_found() {
        let layout = id_name();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"000001John      000002Ma").unwrap();
        file.flush().unwrap();

        let store = RecordStore::open(file.path(), layout).unwrap();
        assert!(store.fetch("1").is_ok());
        assert!(matches!(store.fetch("2"), Err(StoreError::NotFound(2))));
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_record_count() {
        let layout = id_name();
        let file = fixture(&layout);
        let store = RecordStore::open(file.path(), layout).unwrap();
        assert_eq!(store.record_count().unwrap(), NAMES.len() as u64);
    }

    #[test]
    fn test_open_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = RecordStore::open(dir.path().join("custfile.dat"), id_name()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(matches!(err, StoreError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_open_directory_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = RecordStore::open(dir.path(), id_name()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_close_is_idempotent() {
        let layout = id_name();
        let file = fixture(&layout);
        let mut store = RecordStore::open(file.path(), layout).unwrap();
        assert_eq!(store.state(), StoreState::Open);

        store.close();
        store.close();
        assert_eq!(store.state(), StoreState::Closed);
        assert!(matches!(store.fetch("1"), Err(StoreError::NotOpen)));
    }

    #[test]
    fn test_close_unopened_is_noop() {
        let layout = id_name();
        let file = fixture(&layout);
        let mut store = RecordStore::new(file.path(), layout);

        store.close();
        assert_eq!(store.state(), StoreState::Unopened);
        assert_eq!(store.fetch("1").unwrap_err().kind(), ErrorKind::StoreUnavailable);

        store.open_file().unwrap();
        assert_eq!(store.fetch("1").unwrap().get("name"), Some("John"));
    }

    #[test]
    fn test_reopen_after_close() {
        let layout = id_name();
        let file = fixture(&layout);
        let mut store = RecordStore::open(file.path(), layout).unwrap();
        store.close();
        store.open_file().unwrap();
        assert!(store.is_open());
        assert_eq!(store.fetch("3").unwrap().get("name"), Some("Zed"));
    }

    #[test]
    fn test_independent_stores_concurrently() {
        let layout = id_name();
        let file = fixture(&layout);

        std::thread::scope(|s| {
            for _ in 0..4 {
                let layout = layout.clone();
                let path = file.path();
                s.spawn(move || {
                    let store = RecordStore::open(path, layout).unwrap();
                    for round in 0..50 {
                        let n = round % NAMES.len();
                        let record = store.fetch(&(n + 1).to_string()).unwrap();
                        assert_eq!(record.get("name"), Some(NAMES[n]));
                    }
                });
            }
        });
    }

    #[test]
    fn test_shared_store_concurrently() {
        let layout = id_name();
        let file = fixture(&layout);
        let store = Arc::new(RecordStore::open(file.path(), layout).unwrap());

        std::thread::scope(|s| {
            for t in 0..4 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    for round in 0..50 {
                        let n = (round + t) % NAMES.len();
                        let record = store.fetch(&(n + 1).to_string()).unwrap();
                        assert_eq!(record.get("id"), Some(format!("{:06}", n + 1).as_str()));
                        assert_eq!(record.get("name"), Some(NAMES[n]));
                    }
                });
            }
        });
    }
}
