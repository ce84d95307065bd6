use crate::snapshot::KnowledgeSnapshot;
use crate::types::InteractionRecord;
use std::sync::Arc;

/// Read-only lookup view over exactly one knowledge-base snapshot.
///
/// A store created before a snapshot replacement keeps serving the snapshot
/// it was created with, so one screening run never mixes records from two
/// knowledge-base versions.
#[derive(Debug, Clone)]
pub struct InteractionStore {
    snapshot: Arc<KnowledgeSnapshot>,
}

impl InteractionStore {
    pub fn new(snapshot: Arc<KnowledgeSnapshot>) -> Self {
        Self { snapshot }
    }

    /// Pure, side-effect-free read. Exact match on canonical drug and gene
    /// names, the same key construction the snapshot format uses.
    pub fn lookup(&self, drug: &str, gene: &str) -> Option<&InteractionRecord> {
        self.snapshot.interactions.get(&format!("{drug}-{gene}"))
    }

    pub fn schema_version(&self) -> &str {
        &self.snapshot.schema_version
    }

    pub fn cpic_version(&self) -> &str {
        &self.snapshot.cpic_version
    }

    pub fn patient_id(&self) -> &str {
        &self.snapshot.patient_id
    }

    pub fn record_count(&self) -> usize {
        self.snapshot.interactions.len()
    }

    pub fn snapshot(&self) -> &KnowledgeSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    fn store() -> InteractionStore {
        InteractionStore::new(Arc::new(dataset::default_snapshot()))
    }

    #[test]
    fn test_lookup_hit() {
        let store = store();
        let record = store.lookup("Warfarin", "CYP2C9").unwrap();
        assert_eq!(record.diplotype, "*3/*3");
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let store = store();
        assert!(store.lookup("Warfarin", "CYP2D6").is_none());
        assert!(store.lookup("Aspirin", "CYP2C9").is_none());
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let store = store();
        assert!(store.lookup("warfarin", "CYP2C9").is_none());
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let store = store();
        let first = store.lookup("Codeine", "CYP2D6").cloned();
        let second = store.lookup("Codeine", "CYP2D6").cloned();
        assert_eq!(first, second);
        assert_eq!(store.record_count(), 11);
    }
}
