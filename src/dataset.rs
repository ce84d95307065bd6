//! Bundled CPIC interaction dataset.
//!
//! This module is the default knowledge-base snapshot the engine falls back
//! to when the session slot is empty or unreadable, plus the fixed gene panel
//! and the read-only drug catalog. All records are precomputed facts; none of
//! them are derived from patient data at runtime.

use crate::snapshot::KnowledgeSnapshot;
use crate::types::{DrugSelection, GenePanel, InteractionRecord, Phenotype, RiskTier};

/// Matrix columns, in display order.
pub const GENE_PANEL: &[&str] = &["CYP2D6", "CYP2C19", "CYP2C9", "SLCO1B1", "DPYD", "TPMT"];

/// Drugs selectable for screening.
pub const DRUG_CATALOG: &[&str] = &[
    "Warfarin",
    "Clopidogrel",
    "Simvastatin",
    "Tamoxifen",
    "Fluorouracil",
    "Capecitabine",
    "Codeine",
    "Sertraline",
    "Omeprazole",
    "Ondansetron",
];

/// Primary pharmacogene for each catalog drug, per the CPIC assignments.
pub const PRIMARY_GENE: &[(&str, &str)] = &[
    ("Warfarin", "CYP2C9"),
    ("Clopidogrel", "CYP2C19"),
    ("Omeprazole", "CYP2C19"),
    ("Sertraline", "CYP2C19"),
    ("Codeine", "CYP2D6"),
    ("Tamoxifen", "CYP2D6"),
    ("Ondansetron", "CYP2D6"),
    ("Simvastatin", "SLCO1B1"),
    ("Fluorouracil", "DPYD"),
    ("Capecitabine", "DPYD"),
];

pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";
pub const DEFAULT_CPIC_VERSION: &str = "CPIC v4.0";
pub const DEFAULT_PATIENT_ID: &str = "ANON-2026-PG";

pub fn gene_panel() -> GenePanel {
    GenePanel::new(GENE_PANEL.iter().copied()).expect("bundled gene panel is valid")
}

pub fn full_catalog_selection() -> DrugSelection {
    DrugSelection::new(DRUG_CATALOG.iter().copied())
}

/// The gene most relevant to a drug's metabolism, for catalog display.
pub fn primary_gene(drug: &str) -> Option<&'static str> {
    PRIMARY_GENE
        .iter()
        .find(|(name, _)| *name == drug)
        .map(|(_, gene)| *gene)
}

#[allow(clippy::too_many_arguments)]
fn record(
    drug: &str,
    gene: &str,
    diplotype: &str,
    phenotype: Phenotype,
    risk: RiskTier,
    badge: &str,
    summary: &str,
    suggestion: &str,
    ai_confidence: f64,
) -> (String, InteractionRecord) {
    let record = InteractionRecord {
        drug: drug.to_string(),
        gene: gene.to_string(),
        diplotype: diplotype.to_string(),
        phenotype,
        risk,
        badge: badge.to_string(),
        summary: summary.to_string(),
        suggestion: suggestion.to_string(),
        ai_confidence,
    };
    (record.key(), record)
}

/// The default snapshot. Infallible; validity is asserted by tests.
pub fn default_snapshot() -> KnowledgeSnapshot {
    let interactions = [
        record(
            "Warfarin",
            "CYP2C9",
            "*3/*3",
            Phenotype::PoorMetabolizer,
            RiskTier::High,
            "Contraindicated",
            "CYP2C9*3/*3 encodes a non-functional enzyme. S-warfarin clearance is reduced by ~90%, causing dangerous accumulation and severe bleeding risk. Maintenance dose must be reduced by 70–80% vs. wild-type.",
            "Initiate at ≤ 1 mg/day. Monitor INR every 48h for the first 2 weeks. Consider switching to Apixaban or Rivaroxaban (no CYP2C9 metabolism). CPIC Grade A recommendation.",
            0.98,
        ),
        record(
            "Clopidogrel",
            "CYP2C19",
            "*2/*2",
            Phenotype::PoorMetabolizer,
            RiskTier::High,
            "Ineffective",
            "CYP2C19*2 creates a splicing defect abolishing enzyme function. Clopidogrel requires two CYP2C19-mediated oxidation steps for activation. In *2/*2 carriers, active thiol metabolite formation is <5%, rendering the drug therapeutically useless.",
            "Switch to Prasugrel 10mg or Ticagrelor 90mg BID immediately. Do NOT use standard clopidogrel dosing. MACE risk elevated ~3.5× on clopidogrel.",
            0.97,
        ),
        record(
            "Simvastatin",
            "SLCO1B1",
            "*5/*5",
            Phenotype::DecreasedFunction,
            RiskTier::Moderate,
            "Dose Adjust",
            "SLCO1B1*5 (c.521T>C) reduces OATP1B1 hepatic uptake transporter activity by ~70%. Plasma simvastatin acid AUC increases ~3-fold, strongly correlating with myopathy risk (OR 4.5 per allele).",
            "Limit simvastatin to ≤ 20 mg/day. Preferred alternatives: Rosuvastatin or Pravastatin (OATP1B1-independent). Monitor CK levels at 4 and 12 weeks.",
            0.94,
        ),
        record(
            "Tamoxifen",
            "CYP2D6",
            "*4/*10",
            Phenotype::IntermediateMetabolizer,
            RiskTier::Low,
            "Monitor",
            "CYP2D6 converts tamoxifen to its active metabolite endoxifen. *4/*10 carriers have reduced but not absent conversion capacity (~40% of normal). Endoxifen levels may be subtherapeutic in some patients.",
            "Standard dose acceptable with therapeutic drug monitoring. Measure endoxifen plasma level at 3 months. If < 5.97 ng/mL, consider aromatase inhibitor switch.",
            0.89,
        ),
        record(
            "Fluorouracil",
            "DPYD",
            "*2A/*2A",
            Phenotype::DpdDeficient,
            RiskTier::High,
            "Contraindicated",
            "DPYD*2A (IVS14+1G>A) abolishes dihydropyrimidine dehydrogenase via exon 14 skipping. DPD catalyses >80% of 5-FU catabolism; complete absence causes fatal 5-FU accumulation with grade 4 mucositis, neutropenia, and neurotoxicity.",
            "CONTRAINDICATED. Do NOT administer fluorouracil or capecitabine. Explore irinotecan-based or platinum-based alternatives. Refer to oncology pharmacogenomics board.",
            0.99,
        ),
        record(
            "Capecitabine",
            "DPYD",
            "*2A/*2A",
            Phenotype::DpdDeficient,
            RiskTier::High,
            "Contraindicated",
            "Capecitabine is a 5-FU prodrug. DPYD*2A/*2A carriers have zero DPD activity, leading to identical lethal toxicity profile as direct 5-FU administration.",
            "CONTRAINDICATED alongside fluorouracil. Use alternative chemotherapy regimens. Discuss with multidisciplinary tumor board.",
            0.99,
        ),
        record(
            "Codeine",
            "CYP2D6",
            "*1/*1xN",
            Phenotype::UltrarapidMetabolizer,
            RiskTier::Moderate,
            "Toxicity Risk",
            "CYP2D6 *1/*1xN (gene duplication) causes ultra-rapid O-demethylation of codeine to morphine. Plasma morphine levels can be 50–75% higher than expected, increasing risk of respiratory depression, especially in pediatric patients.",
            "Avoid codeine. Use non-opioid analgesics (NSAIDs, acetaminophen) or morphine at reduced dose with close monitoring. FDA Black Box Warning applies.",
            0.96,
        ),
        record(
            "Sertraline",
            "CYP2D6",
            "*4/*4",
            Phenotype::PoorMetabolizer,
            RiskTier::Low,
            "Tolerable",
            "CYP2D6 plays a secondary role in sertraline metabolism (primary: CYP2C19). In *4/*4 carriers, sertraline exposure increases ~40%, but the wide therapeutic index makes clinical impact modest.",
            "Initiate at standard dose. Monitor for side effects at 4 weeks. Dose reduction only if adverse effects reported. Consider escitalopram as alternative.",
            0.87,
        ),
        record(
            "Sertraline",
            "CYP2C19",
            "*1/*1",
            Phenotype::NormalMetabolizer,
            RiskTier::Low,
            "Normal",
            "CYP2C19 *1/*1 indicates wild-type function. No pharmacokinetic alteration expected for sertraline via this pathway.",
            "No dosage adjustment required. Standard prescribing guidelines apply.",
            0.92,
        ),
        record(
            "Omeprazole",
            "CYP2C19",
            "*17/*17",
            Phenotype::UltrarapidMetabolizer,
            RiskTier::Moderate,
            "Dose Adjust",
            "CYP2C19*17 enhances promoter activity, increasing enzyme expression 2–3×. Omeprazole is cleared faster, reducing AUC by ~40% and potentially leading to therapeutic failure (incomplete acid suppression).",
            "Increase dose to 40 mg BID or switch to rabeprazole (less CYP2C19 dependent). Verify H. pylori eradication with urea breath test at 4 weeks.",
            0.91,
        ),
        record(
            "Ondansetron",
            "CYP2D6",
            "*10/*10",
            Phenotype::IntermediateMetabolizer,
            RiskTier::Low,
            "Normal",
            "CYP2D6*10 reduces enzyme activity by ~50%. Ondansetron exposure modestly increases but remains within the therapeutic window. Anti-emetic efficacy is preserved.",
            "No dose adjustment needed. Standard 4–8mg dosing is appropriate. Monitor only if concurrent CYP3A4 inhibitors are co-prescribed.",
            0.85,
        ),
    ];

    KnowledgeSnapshot {
        schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
        cpic_version: DEFAULT_CPIC_VERSION.to_string(),
        patient_id: DEFAULT_PATIENT_ID.to_string(),
        interactions: interactions.into_iter().collect(),
    }
}
