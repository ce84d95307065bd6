use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Risk Tiers & Phenotypes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    High,
    Moderate,
    Low,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::High => "HIGH",
            RiskTier::Moderate => "MODERATE",
            RiskTier::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phenotype {
    #[serde(rename = "Poor Metabolizer")]
    PoorMetabolizer,
    #[serde(rename = "Intermediate Metabolizer")]
    IntermediateMetabolizer,
    #[serde(rename = "Normal Metabolizer")]
    NormalMetabolizer,
    #[serde(rename = "Rapid Metabolizer")]
    RapidMetabolizer,
    #[serde(rename = "Ultra-rapid Metabolizer")]
    UltrarapidMetabolizer,
    #[serde(rename = "Decreased Function")]
    DecreasedFunction,
    #[serde(rename = "DPD Deficient")]
    DpdDeficient,
}

impl Phenotype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phenotype::PoorMetabolizer => "Poor Metabolizer",
            Phenotype::IntermediateMetabolizer => "Intermediate Metabolizer",
            Phenotype::NormalMetabolizer => "Normal Metabolizer",
            Phenotype::RapidMetabolizer => "Rapid Metabolizer",
            Phenotype::UltrarapidMetabolizer => "Ultra-rapid Metabolizer",
            Phenotype::DecreasedFunction => "Decreased Function",
            Phenotype::DpdDeficient => "DPD Deficient",
        }
    }
}

// ============================================================================
// Interaction Records
// ============================================================================

/// One precomputed drug-gene interaction fact. The (drug, gene) pair is the
/// natural key: a knowledge-base snapshot carries at most one record per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug: String,
    pub gene: String,
    pub diplotype: String,
    pub phenotype: Phenotype,
    pub risk: RiskTier,
    pub badge: String,
    pub summary: String,
    pub suggestion: String,
    pub ai_confidence: f64,
}

impl InteractionRecord {
    /// Snapshot key for this record, e.g. "Warfarin-CYP2C9".
    pub fn key(&self) -> String {
        format!("{}-{}", self.drug, self.gene)
    }
}

// ============================================================================
// Screening Inputs
// ============================================================================

/// Ordered, duplicate-free set of gene symbols defining the matrix columns.
/// Ordering is stable for the lifetime of a screening result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenePanel {
    genes: Vec<String>,
}

impl GenePanel {
    pub fn new<I, S>(genes: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let genes: Vec<String> = genes.into_iter().map(Into::into).collect();
        if genes.is_empty() {
            return Err(ValidationError::EmptyGenePanel);
        }
        for (i, gene) in genes.iter().enumerate() {
            if genes[..i].contains(gene) {
                return Err(ValidationError::DuplicateGene(gene.clone()));
            }
        }
        Ok(Self { genes })
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Drug names chosen for one screening. Unique by name; selection order is
/// preserved for row display but carries no classification semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugSelection {
    drugs: Vec<String>,
}

impl DrugSelection {
    /// Duplicates collapse to their first occurrence.
    pub fn new<I, S>(drugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = Vec::new();
        for drug in drugs {
            let drug = drug.into();
            if !unique.contains(&drug) {
                unique.push(drug);
            }
        }
        Self { drugs: unique }
    }

    pub fn drugs(&self) -> &[String] {
        &self.drugs
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }
}

// ============================================================================
// Screening Results
// ============================================================================

/// Resolution of a single matrix cell. `Absent` means the loaded snapshot
/// carries no evaluation for the pair; it is a distinct outcome, never folded
/// into low risk.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    Record(InteractionRecord),
    Absent,
}

impl CellOutcome {
    pub fn record(&self) -> Option<&InteractionRecord> {
        match self {
            CellOutcome::Record(record) => Some(record),
            CellOutcome::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellOutcome::Absent)
    }
}

/// Row-major matrix over selection x panel. Total: every (drug, gene) pair in
/// the domain resolves to exactly one outcome.
#[derive(Debug, Clone)]
pub struct ScreeningResult {
    drugs: Vec<String>,
    genes: Vec<String>,
    cells: Vec<CellOutcome>,
    stats: ScreeningStats,
}

impl ScreeningResult {
    pub(crate) fn new(
        drugs: Vec<String>,
        genes: Vec<String>,
        cells: Vec<CellOutcome>,
        stats: ScreeningStats,
    ) -> Self {
        debug_assert_eq!(cells.len(), drugs.len() * genes.len());
        Self {
            drugs,
            genes,
            cells,
            stats,
        }
    }

    pub fn drugs(&self) -> &[String] {
        &self.drugs
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellOutcome {
        &self.cells[row * self.genes.len() + col]
    }

    pub fn get(&self, drug: &str, gene: &str) -> Option<&CellOutcome> {
        let row = self.drugs.iter().position(|d| d == drug)?;
        let col = self.genes.iter().position(|g| g == gene)?;
        Some(self.cell(row, col))
    }

    /// Cells of one drug row, in panel order.
    pub fn row(&self, row: usize) -> &[CellOutcome] {
        let width = self.genes.len();
        &self.cells[row * width..(row + 1) * width]
    }

    pub fn stats(&self) -> &ScreeningStats {
        &self.stats
    }
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreeningStats {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub absent: usize,
}

impl ScreeningStats {
    pub fn merge(&mut self, other: &ScreeningStats) {
        self.high += other.high;
        self.moderate += other.moderate;
        self.low += other.low;
        self.absent += other.absent;
    }

    pub fn resolved(&self) -> usize {
        self.high + self.moderate + self.low
    }

    pub fn total(&self) -> usize {
        self.resolved() + self.absent
    }
}

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Caller input rejected before any computation starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no medications selected for screening")]
    EmptyDrugSelection,
    #[error("no genome file supplied")]
    MissingGenomeFile,
    #[error("gene panel is empty")]
    EmptyGenePanel,
    #[error("duplicate gene in panel: {0}")]
    DuplicateGene(String),
}

/// Snapshot loads fail as a whole; the previously loaded snapshot stays
/// authoritative.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),
    #[error("interaction key {key:?} does not match record pair {drug}-{gene}")]
    KeyMismatch {
        key: String,
        drug: String,
        gene: String,
    },
    #[error("confidence {value} for {key:?} is outside [0, 1]")]
    ConfidenceOutOfRange { key: String, value: f64 },
    #[error("empty {field} in interaction {key:?}")]
    EmptyField { key: String, field: &'static str },
    #[error("failed to persist snapshot to the session slot: {0}")]
    Persist(String),
}

/// Report construction either fully succeeds or fails; no partial document is
/// ever returned.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("empty patient id")]
    EmptyPatientId,
    #[error("record is missing {0}")]
    EmptyField(&'static str),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
