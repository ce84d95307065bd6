use crate::types::{ExportError, InteractionRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Version stamp written into every exported document.
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

// ============================================================================
// Time Source
// ============================================================================

/// Clock injection point. Export never reads an ambient global clock, so a
/// fixed clock makes report generation fully deterministic under test.
pub trait TimeSource {
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl TimeSource for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

// ============================================================================
// Exported Report Document
// ============================================================================

/// Canonical single-interaction report. Field order is the document's wire
/// order; written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedReport {
    pub schema_version: String,
    pub generated_at: String,
    pub patient_id: String,
    pub drug: String,
    pub gene: String,
    pub diplotype: String,
    pub phenotype: String,
    pub risk_level: String,
    pub cpic_guideline: String,
    pub mechanism: String,
    pub suggestion: String,
    pub ai_confidence: f64,
}

impl ExportedReport {
    /// Canonical serialized form; byte-stable for identical inputs.
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the report document for one interaction record. Validation runs
/// before construction; a failing record produces no document at all.
pub fn export_report(
    record: &InteractionRecord,
    patient_id: &str,
    cpic_guideline: &str,
    clock: &dyn TimeSource,
) -> Result<ExportedReport, ExportError> {
    if patient_id.is_empty() {
        return Err(ExportError::EmptyPatientId);
    }
    if record.drug.is_empty() {
        return Err(ExportError::EmptyField("drug"));
    }
    if record.gene.is_empty() {
        return Err(ExportError::EmptyField("gene"));
    }
    if record.diplotype.is_empty() {
        return Err(ExportError::EmptyField("diplotype"));
    }
    if !(0.0..=1.0).contains(&record.ai_confidence) {
        return Err(ExportError::ConfidenceOutOfRange(record.ai_confidence));
    }

    Ok(ExportedReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        generated_at: clock
            .now_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        patient_id: patient_id.to_string(),
        drug: record.drug.clone(),
        gene: record.gene.clone(),
        diplotype: record.diplotype.clone(),
        phenotype: record.phenotype.as_str().to_string(),
        risk_level: record.risk.as_str().to_string(),
        cpic_guideline: cpic_guideline.to_string(),
        mechanism: record.summary.clone(),
        suggestion: record.suggestion.clone(),
        ai_confidence: record.ai_confidence,
    })
}

/// Download-style file name for one report, e.g.
/// `pharmaguard_warfarin_CYP2C9.json`.
pub fn report_file_name(record: &InteractionRecord) -> String {
    format!(
        "pharmaguard_{}_{}.json",
        record.drug.to_lowercase(),
        record.gene
    )
}
