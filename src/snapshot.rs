use crate::types::*;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Snapshot schema versions this build understands.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0"];

/// One immutable, versioned loading of the interaction knowledge base.
/// Interactions are keyed "Drug-Gene"; the key must agree with the record it
/// maps to, so a snapshot can never hold two records for the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub schema_version: String,
    pub cpic_version: String,
    pub patient_id: String,
    pub interactions: HashMap<String, InteractionRecord>,
}

impl KnowledgeSnapshot {
    /// Parse and validate a snapshot from a JSON string. Validation covers
    /// the whole document before anything is returned: a snapshot is either
    /// fully usable or rejected.
    pub fn from_str(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: KnowledgeSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: KnowledgeSnapshot = serde_json::from_reader(reader)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load from a file path. Files ending in `.gz` are decompressed on the
    /// fly.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        log::info!("Loading knowledge-base snapshot from {}", path.display());

        if path.extension().map(|e| e == "gz").unwrap_or(false) {
            Self::from_reader(MultiGzDecoder::new(reader))
        } else {
            Self::from_reader(reader)
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&self.schema_version.as_str()) {
            return Err(SnapshotError::UnsupportedSchemaVersion(
                self.schema_version.clone(),
            ));
        }

        for (key, record) in &self.interactions {
            if record.drug.is_empty() {
                return Err(SnapshotError::EmptyField {
                    key: key.clone(),
                    field: "drug",
                });
            }
            if record.gene.is_empty() {
                return Err(SnapshotError::EmptyField {
                    key: key.clone(),
                    field: "gene",
                });
            }
            if record.diplotype.is_empty() {
                return Err(SnapshotError::EmptyField {
                    key: key.clone(),
                    field: "diplotype",
                });
            }
            if key != &record.key() {
                return Err(SnapshotError::KeyMismatch {
                    key: key.clone(),
                    drug: record.drug.clone(),
                    gene: record.gene.clone(),
                });
            }
            if !(0.0..=1.0).contains(&record.ai_confidence) {
                return Err(SnapshotError::ConfidenceOutOfRange {
                    key: key.clone(),
                    value: record.ai_confidence,
                });
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const MINIMAL_SNAPSHOT: &str = r#"{
        "schema_version": "1.0",
        "cpic_version": "CPIC v4.0",
        "patient_id": "TEST-01",
        "interactions": {
            "Warfarin-CYP2C9": {
                "drug": "Warfarin",
                "gene": "CYP2C9",
                "diplotype": "*3/*3",
                "phenotype": "Poor Metabolizer",
                "risk": "HIGH",
                "badge": "Contraindicated",
                "summary": "Non-functional enzyme.",
                "suggestion": "Reduce dose.",
                "ai_confidence": 0.98
            }
        }
    }"#;

    #[test]
    fn test_parse_minimal_snapshot() {
        let snapshot = KnowledgeSnapshot::from_str(MINIMAL_SNAPSHOT).unwrap();
        assert_eq!(snapshot.schema_version, "1.0");
        assert_eq!(snapshot.cpic_version, "CPIC v4.0");
        assert_eq!(snapshot.interactions.len(), 1);
        let record = &snapshot.interactions["Warfarin-CYP2C9"];
        assert_eq!(record.risk, RiskTier::High);
        assert_eq!(record.phenotype, Phenotype::PoorMetabolizer);
    }

    #[test]
    fn test_rejects_unknown_risk_tier() {
        let json = MINIMAL_SNAPSHOT.replace("\"HIGH\"", "\"SEVERE\"");
        assert!(matches!(
            KnowledgeSnapshot::from_str(&json),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_unsupported_schema_version() {
        let json = MINIMAL_SNAPSHOT.replace("\"1.0\"", "\"9.9\"");
        assert!(matches!(
            KnowledgeSnapshot::from_str(&json),
            Err(SnapshotError::UnsupportedSchemaVersion(v)) if v == "9.9"
        ));
    }

    #[test]
    fn test_rejects_key_record_mismatch() {
        let json = MINIMAL_SNAPSHOT.replace("Warfarin-CYP2C9", "Codeine-CYP2D6");
        assert!(matches!(
            KnowledgeSnapshot::from_str(&json),
            Err(SnapshotError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_confidence_out_of_range() {
        let json = MINIMAL_SNAPSHOT.replace("0.98", "1.7");
        assert!(matches!(
            KnowledgeSnapshot::from_str(&json),
            Err(SnapshotError::ConfidenceOutOfRange { value, .. }) if value == 1.7
        ));
    }

    #[test]
    fn test_rejects_empty_diplotype() {
        let json = MINIMAL_SNAPSHOT.replace("\"*3/*3\"", "\"\"");
        assert!(matches!(
            KnowledgeSnapshot::from_str(&json),
            Err(SnapshotError::EmptyField {
                field: "diplotype",
                ..
            })
        ));
    }

    #[test]
    fn test_round_trip_through_json() {
        let snapshot = dataset::default_snapshot();
        let json = snapshot.to_json().unwrap();
        let reparsed = KnowledgeSnapshot::from_str(&json).unwrap();
        assert_eq!(reparsed, snapshot);
    }

    #[test]
    fn test_load_gzipped_snapshot_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json.gz");

        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(MINIMAL_SNAPSHOT.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let snapshot = KnowledgeSnapshot::from_path(&path).unwrap();
        assert_eq!(snapshot.interactions.len(), 1);
    }
}
