use crate::dataset;
use crate::snapshot::KnowledgeSnapshot;
use crate::store::InteractionStore;
use crate::types::SnapshotError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tempfile::NamedTempFile;

/// Name of the single persisted slot a session writes its snapshot to.
pub const SESSION_SLOT_NAME: &str = "pharmaguard_data.json";

// ============================================================================
// Snapshot Slots
// ============================================================================

/// One named storage slot for the serialized snapshot. `read` returning
/// `Ok(None)` means the slot has never been written.
pub trait SnapshotSlot: Send + Sync {
    fn read(&self) -> std::io::Result<Option<String>>;
    fn write(&self, json: &str) -> std::io::Result<()>;
}

/// Slot file under a directory, replaced atomically on every write so a
/// crash mid-write never leaves a torn snapshot behind.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_SLOT_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSlot for FileSlot {
    fn read(&self) -> std::io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path).map(Some)
    }

    fn write(&self, json: &str) -> std::io::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(&self.path)?;
        Ok(())
    }
}

/// Volatile slot; state dies with the process.
#[derive(Debug, Default)]
pub struct MemorySlot {
    content: RwLock<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSlot for MemorySlot {
    fn read(&self) -> std::io::Result<Option<String>> {
        Ok(read_lock(&self.content).clone())
    }

    fn write(&self, json: &str) -> std::io::Result<()> {
        *write_lock(&self.content) = Some(json.to_string());
        Ok(())
    }
}

// ============================================================================
// Session Cache
// ============================================================================

/// Owner of the session's knowledge-base snapshot.
///
/// The snapshot is replaced by pointer swap, never mutated in place, so a
/// store handed out before a replacement keeps reading a consistent snapshot.
/// Every successful replacement is persisted to the slot first; a failed
/// persist or validation leaves the previous snapshot authoritative.
pub struct SessionCache {
    slot: Box<dyn SnapshotSlot>,
    current: RwLock<Arc<KnowledgeSnapshot>>,
}

impl SessionCache {
    /// Open a session over the given slot. An empty slot starts from the
    /// bundled dataset; unreadable or invalid slot content is logged and
    /// also falls back to the bundled dataset.
    pub fn open(slot: Box<dyn SnapshotSlot>) -> Self {
        let snapshot = match slot.read() {
            Ok(Some(json)) => match KnowledgeSnapshot::from_str(&json) {
                Ok(snapshot) => {
                    log::info!(
                        "Restored session snapshot ({}, {} interactions)",
                        snapshot.cpic_version,
                        snapshot.interactions.len()
                    );
                    snapshot
                }
                Err(err) => {
                    log::warn!("Session slot holds an unusable snapshot ({err}); using the bundled dataset");
                    dataset::default_snapshot()
                }
            },
            Ok(None) => dataset::default_snapshot(),
            Err(err) => {
                log::warn!("Failed to read the session slot ({err}); using the bundled dataset");
                dataset::default_snapshot()
            }
        };

        Self {
            slot,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemorySlot::new()))
    }

    /// The current snapshot. Callers keep the returned `Arc` for the duration
    /// of one operation to observe a single knowledge-base version.
    pub fn current(&self) -> Arc<KnowledgeSnapshot> {
        read_lock(&self.current).clone()
    }

    /// Lookup view over the current snapshot.
    pub fn store(&self) -> InteractionStore {
        InteractionStore::new(self.current())
    }

    /// Validate, persist, then swap in a new snapshot. Rejection at any step
    /// leaves the previous snapshot in place.
    pub fn replace(&self, snapshot: KnowledgeSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;
        let json = snapshot.to_json()?;
        self.slot
            .write(&json)
            .map_err(|err| SnapshotError::Persist(err.to_string()))?;

        *write_lock(&self.current) = Arc::new(snapshot);
        Ok(())
    }

    /// Parse, validate and install snapshot JSON, e.g. from `--snapshot`.
    pub fn load_json(&self, json: &str) -> Result<(), SnapshotError> {
        self.replace(KnowledgeSnapshot::from_str(json)?)
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Request Ordering
// ============================================================================

/// Opaque handle for one in-flight screening request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Last-request-wins ordering for the asynchronous analysis phase.
///
/// Each `begin` supersedes every earlier token, so a result computed for an
/// abandoned request can never be applied after a newer request has started.
#[derive(Debug, Default)]
pub struct ScreeningGate {
    latest: AtomicU64,
}

impl ScreeningGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest.load(Ordering::SeqCst)
    }

    /// Accept a finished result only if its request is still the latest;
    /// superseded results are discarded.
    pub fn commit<T>(&self, token: RequestToken, result: T) -> Option<T> {
        if self.is_current(token) {
            Some(result)
        } else {
            log::debug!("Discarding superseded screening result (request {})", token.0);
            None
        }
    }
}
