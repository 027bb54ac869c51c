//! Load-all / rewrite-all persistence of annotation records

use crate::error::{LoadError, StoreError};
use crate::io::{atomic_write, to_pretty_json};
use crate::record::AnnotationRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read every record from the backing file, or an empty history if that fails
///
/// Never fails the caller. A malformed file is moved aside before the empty
/// history is returned, so the next save cannot overwrite it.
pub fn load_all(path: &Path) -> Vec<AnnotationRecord> {
    load_history(path).unwrap_or_default()
}

/// Like [`load_all`], but reports history that exists and could not be
/// taken over: an unreadable file, or a malformed one that could not be
/// moved aside. Writing over either would lose it.
fn load_history(path: &Path) -> Result<Vec<AnnotationRecord>, LoadError> {
    match read_records(path) {
        Ok(records) => {
            debug!(path = %path.display(), count = records.len(), "Loaded annotations");
            Ok(records)
        }
        Err(LoadError::Missing) => {
            debug!(path = %path.display(), "No annotation file yet, starting empty");
            Ok(Vec::new())
        }
        Err(e @ LoadError::Unreadable(_)) => {
            warn!(path = %path.display(), error = %e, "Starting with empty history");
            Err(e)
        }
        Err(e @ LoadError::Malformed(_)) => {
            warn!(path = %path.display(), error = %e, "Starting with empty history");
            match preserve_malformed(path) {
                Ok(()) => Ok(Vec::new()),
                Err(_) => Err(e),
            }
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<AnnotationRecord>, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::Missing,
        _ => LoadError::Unreadable(e),
    })?;
    serde_json::from_slice(&bytes).map_err(LoadError::Malformed)
}

fn preserve_malformed(path: &Path) -> std::io::Result<()> {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    let mut backup = path.as_os_str().to_owned();
    backup.push(format!(".corrupt-{}", stamp));
    let backup = PathBuf::from(backup);

    match std::fs::rename(path, &backup) {
        Ok(()) => {
            warn!(backup = %backup.display(), "Moved malformed annotation file aside");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Could not move malformed annotation file aside");
            Err(e)
        }
    }
}

/// In-memory record collection mirrored to a single JSON array file
///
/// Every append rewrites the whole file. Two stores on the same path do not
/// coordinate: the last writer wins.
///
/// When existing history could not be loaded at open, appends re-read the
/// file first and are refused while it stays unreadable.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<AnnotationRecord>,
    history_pending: bool,
}

impl RecordStore {
    /// Open the store at `path`, loading whatever history is readable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (records, history_pending) = match load_history(&path) {
            Ok(records) => (records, false),
            Err(_) => (Vec::new(), true),
        };
        info!(
            path = %path.display(),
            count = records.len(),
            history_pending,
            "Record store opened"
        );
        Self {
            path,
            records,
            history_pending,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add one record and rewrite the backing file
    ///
    /// On failure the record is not kept in memory either, so a retry does
    /// not duplicate it.
    pub fn append(&mut self, record: AnnotationRecord) -> Result<(), StoreError> {
        if self.history_pending {
            self.reload_history()?;
        }

        let kind = record.kind();
        self.records.push(record);

        if let Err(e) = self.persist() {
            self.records.pop();
            warn!(path = %self.path.display(), error = %e, "Failed to save annotation");
            return Err(e);
        }

        info!(kind, total = self.records.len(), "Annotation saved");
        Ok(())
    }

    fn reload_history(&mut self) -> Result<(), StoreError> {
        match load_history(&self.path) {
            Ok(records) => {
                info!(count = records.len(), "Existing history recovered");
                self.records = records;
                self.history_pending = false;
                Ok(())
            }
            Err(source) => Err(StoreError::HistoryUnavailable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = to_pretty_json(&self.records)?;
        atomic_write(&self.path, &json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::temp_path_for;
    use crate::record::{Hallucination, HallucinationFlags, ImageEval, SessionId, Verdict};
    use tempfile::TempDir;

    fn hallucination(session: &SessionId, response: &str) -> AnnotationRecord {
        AnnotationRecord::from(Hallucination {
            session_id: session.clone(),
            response: response.to_string(),
            flags: HallucinationFlags::default(),
            notes: String::new(),
        })
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let records = load_all(&temp.path().join("absent.json"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_file_loads_empty_and_is_preserved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");
        std::fs::write(&path, "{not json").unwrap();

        let records = load_all(&path);
        assert!(records.is_empty());
        assert!(!path.exists());

        let backups: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            std::fs::read_to_string(backups[0].path()).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");
        std::fs::write(&path, r#"{"type":"hallucination"}"#).unwrap();

        assert!(load_all(&path).is_empty());
    }

    #[test]
    fn test_directory_path_loads_empty() {
        let temp = TempDir::new().unwrap();
        assert!(load_all(temp.path()).is_empty());
    }

    #[test]
    fn test_unloadable_history_blocks_append_until_readable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");
        let session = SessionId::generate();
        std::fs::create_dir(&path).unwrap();

        let mut store = RecordStore::open(&path);
        assert!(store.is_empty());
        let err = store.append(hallucination(&session, "new")).unwrap_err();
        assert!(matches!(err, StoreError::HistoryUnavailable { .. }));
        assert!(store.is_empty());
        assert!(path.is_dir());

        // Once the history is readable it is taken over, not replaced
        std::fs::remove_dir(&path).unwrap();
        RecordStore::open(&path)
            .append(hallucination(&session, "old"))
            .unwrap();
        store.append(hallucination(&session, "new")).unwrap();

        let records = load_all(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records, store.records());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_survives_append() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");
        let session = SessionId::generate();
        RecordStore::open(&path)
            .append(hallucination(&session, "old"))
            .unwrap();
        let before = std::fs::read(&path).unwrap();

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o200)).unwrap();
        if std::fs::read(&path).is_ok() {
            // Permission bits do not apply to this user (root)
            return;
        }

        let mut store = RecordStore::open(&path);
        assert!(store.is_empty());
        assert!(store.append(hallucination(&session, "new")).is_err());

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), before);

        store.append(hallucination(&session, "new")).unwrap();
        assert_eq!(load_all(&path).len(), 2);
    }

    #[test]
    fn test_append_then_reopen_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");
        let session = SessionId::generate();

        let mut store = RecordStore::open(&path);
        assert!(store.is_empty());
        for text in ["first", "second", "third"] {
            store.append(hallucination(&session, text)).unwrap();
        }

        let reopened = RecordStore::open(&path);
        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.records(), store.records());
    }

    #[test]
    fn test_append_extends_existing_history() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");

        let first_session = SessionId::generate();
        RecordStore::open(&path)
            .append(hallucination(&first_session, "old"))
            .unwrap();

        let second_session = SessionId::generate();
        let mut store = RecordStore::open(&path);
        store
            .append(AnnotationRecord::from(ImageEval::new(
                second_session.clone(),
                "cat".to_string(),
                Verdict::Yes,
                None,
            )))
            .unwrap();

        let records = load_all(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].session_id(), &first_session);
        assert_eq!(records[1].session_id(), &second_session);
    }

    #[test]
    fn test_file_is_indented_array() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");

        let mut store = RecordStore::open(&path);
        store
            .append(hallucination(&SessionId::generate(), "x"))
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"type\": \"hallucination\""));
    }

    #[test]
    fn test_failed_append_keeps_durable_data_and_memory_in_sync() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("annotations.json");
        let session = SessionId::generate();

        let mut store = RecordStore::open(&path);
        store.append(hallucination(&session, "kept")).unwrap();
        let before = std::fs::read(&path).unwrap();

        std::fs::create_dir(temp_path_for(&path)).unwrap();
        let err = store.append(hallucination(&session, "dropped")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), before);

        // Retry succeeds once the obstruction is gone
        std::fs::remove_dir(temp_path_for(&path)).unwrap();
        store.append(hallucination(&session, "dropped")).unwrap();
        assert_eq!(load_all(&path).len(), 2);
    }
}
