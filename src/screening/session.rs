use crate::screening::classify::{classify, CellClass};
use crate::store::InteractionStore;
use crate::types::*;
use rayon::prelude::*;

/// Resolve the full risk matrix for one screening request.
///
/// Every (drug, gene) pair in selection x panel resolves to exactly one cell,
/// so the result always holds `selection.len() * panel.len()` outcomes. The
/// call is pure computation over the store's already-loaded snapshot: no I/O,
/// and re-invocation with unchanged inputs yields the same matrix.
pub fn run_screening(
    selection: &DrugSelection,
    panel: &GenePanel,
    store: &InteractionStore,
) -> Result<ScreeningResult, ValidationError> {
    if selection.is_empty() {
        return Err(ValidationError::EmptyDrugSelection);
    }
    if panel.is_empty() {
        return Err(ValidationError::EmptyGenePanel);
    }

    log::debug!(
        "Screening {} drugs against {} genes (snapshot {})",
        selection.len(),
        panel.len(),
        store.cpic_version()
    );

    // Rows resolve in parallel; collect() keeps selection order.
    let rows: Vec<(Vec<CellOutcome>, ScreeningStats)> = selection
        .drugs()
        .par_iter()
        .map(|drug| resolve_row(drug, panel, store))
        .collect();

    let mut stats = ScreeningStats::default();
    let mut cells = Vec::with_capacity(selection.len() * panel.len());
    for (row, row_stats) in rows {
        stats.merge(&row_stats);
        cells.extend(row);
    }

    Ok(ScreeningResult::new(
        selection.drugs().to_vec(),
        panel.genes().to_vec(),
        cells,
        stats,
    ))
}

fn resolve_row(
    drug: &str,
    panel: &GenePanel,
    store: &InteractionStore,
) -> (Vec<CellOutcome>, ScreeningStats) {
    let mut stats = ScreeningStats::default();
    let mut row = Vec::with_capacity(panel.len());

    for gene in panel.genes() {
        let record = store.lookup(drug, gene);
        match classify(record) {
            CellClass::High => stats.high += 1,
            CellClass::Moderate => stats.moderate += 1,
            CellClass::Low => stats.low += 1,
            CellClass::Absent => stats.absent += 1,
        }
        row.push(match record {
            Some(record) => CellOutcome::Record(record.clone()),
            None => CellOutcome::Absent,
        });
    }

    (row, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use std::sync::Arc;

    fn store() -> InteractionStore {
        InteractionStore::new(Arc::new(dataset::default_snapshot()))
    }

    #[test]
    fn test_result_is_total_over_domain() {
        let selection = DrugSelection::new(["Warfarin", "Codeine", "Sertraline"]);
        let panel = dataset::gene_panel();
        let result = run_screening(&selection, &panel, &store()).unwrap();

        assert_eq!(result.len(), 3 * 6);
        assert_eq!(result.stats().total(), 3 * 6);
        for row in 0..3 {
            for col in 0..6 {
                // Every cell is either a record or an explicit absence.
                let _ = result.cell(row, col);
            }
        }
    }

    #[test]
    fn test_empty_selection_fails_before_lookup() {
        let selection = DrugSelection::default();
        let panel = dataset::gene_panel();
        let err = run_screening(&selection, &panel, &store()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyDrugSelection);
    }

    #[test]
    fn test_known_pair_resolves_and_unknown_is_absent() {
        let selection = DrugSelection::new(["Warfarin"]);
        let panel = GenePanel::new(["CYP2C9", "CYP2D6"]).unwrap();
        let result = run_screening(&selection, &panel, &store()).unwrap();

        let hit = result.get("Warfarin", "CYP2C9").unwrap();
        assert_eq!(hit.record().unwrap().risk, RiskTier::High);

        let miss = result.get("Warfarin", "CYP2D6").unwrap();
        assert!(miss.is_absent());

        assert_eq!(result.stats().high, 1);
        assert_eq!(result.stats().absent, 1);
    }

    #[test]
    fn test_row_order_follows_selection() {
        let selection = DrugSelection::new(["Ondansetron", "Warfarin"]);
        let panel = dataset::gene_panel();
        let result = run_screening(&selection, &panel, &store()).unwrap();
        assert_eq!(result.drugs(), ["Ondansetron", "Warfarin"]);
        assert_eq!(result.genes(), panel.genes());
    }

    #[test]
    fn test_reinvocation_is_idempotent() {
        let selection = DrugSelection::new(["Sertraline", "Fluorouracil"]);
        let panel = dataset::gene_panel();
        let store = store();

        let first = run_screening(&selection, &panel, &store).unwrap();
        let second = run_screening(&selection, &panel, &store).unwrap();

        assert_eq!(first.stats(), second.stats());
        for row in 0..selection.len() {
            assert_eq!(first.row(row), second.row(row));
        }
    }

    #[test]
    fn test_full_catalog_against_default_snapshot() {
        let selection = dataset::full_catalog_selection();
        let panel = dataset::gene_panel();
        let result = run_screening(&selection, &panel, &store()).unwrap();

        assert_eq!(result.len(), 10 * 6);
        // The bundled dataset carries 11 interaction records.
        assert_eq!(result.stats().resolved(), 11);
        assert_eq!(result.stats().absent, 60 - 11);
    }
}
