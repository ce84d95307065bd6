use crate::types::{InteractionRecord, RiskTier};

/// Display classification of a matrix cell. Mirrors the risk tiers plus a
/// distinct class for pairs the snapshot does not evaluate: missing data is
/// never presented as confirmed low risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellClass {
    High,
    Moderate,
    Low,
    Absent,
}

impl CellClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellClass::High => "HIGH",
            CellClass::Moderate => "MODERATE",
            CellClass::Low => "LOW",
            CellClass::Absent => "N/A",
        }
    }
}

impl From<RiskTier> for CellClass {
    fn from(tier: RiskTier) -> Self {
        match tier {
            RiskTier::High => CellClass::High,
            RiskTier::Moderate => CellClass::Moderate,
            RiskTier::Low => CellClass::Low,
        }
    }
}

/// Total classification: a looked-up record classifies by its tier, a missing
/// record classifies as `Absent`.
pub fn classify(record: Option<&InteractionRecord>) -> CellClass {
    match record {
        Some(record) => record.risk.into(),
        None => CellClass::Absent,
    }
}

/// Presentation metadata for one cell class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub label: &'static str,
    pub accent: &'static str,
    pub icon: &'static str,
    pub dashed: bool,
}

/// Pure total mapping from cell class to display styling. The colors are the
/// fixed palette the dashboard renders with.
pub fn cell_style(class: CellClass) -> CellStyle {
    match class {
        CellClass::High => CellStyle {
            label: "High",
            accent: "#FF4B4B",
            icon: "shield-alert",
            dashed: false,
        },
        CellClass::Moderate => CellStyle {
            label: "Moderate",
            accent: "#F59E0B",
            icon: "shield-question",
            dashed: false,
        },
        CellClass::Low => CellStyle {
            label: "Low",
            accent: "#00F2AD",
            icon: "shield-check",
            dashed: false,
        },
        CellClass::Absent => CellStyle {
            label: "N/A",
            accent: "#475569",
            icon: "ban",
            dashed: true,
        },
    }
}
