use crate::screening::classify::{classify, CellClass};
use crate::types::ScreeningResult;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;

/// Tab-separated risk-matrix writer: one header row of gene symbols, one row
/// per selected drug, cells carrying the tier label or `N/A`.
pub struct MatrixWriter {
    writer: Writer<File>,
    rows_written: usize,
}

impl MatrixWriter {
    pub fn new(output_path: &str) -> Result<Self> {
        let file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path))?;

        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(file);

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_result(&mut self, result: &ScreeningResult) -> Result<()> {
        let mut header = vec!["Drug".to_string()];
        header.extend(result.genes().iter().cloned());
        self.writer
            .write_record(&header)
            .context("Failed to write matrix header")?;

        for (row_idx, drug) in result.drugs().iter().enumerate() {
            let mut row = vec![drug.clone()];
            for outcome in result.row(row_idx) {
                let class: CellClass = classify(outcome.record());
                row.push(class.as_str().to_string());
            }
            self.writer
                .write_record(&row)
                .context("Failed to write matrix row")?;
            self.rows_written += 1;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")?;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use crate::screening::session::run_screening;
    use crate::store::InteractionStore;
    use crate::types::DrugSelection;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_write_matrix() -> Result<()> {
        let store = InteractionStore::new(Arc::new(dataset::default_snapshot()));
        let selection = DrugSelection::new(["Warfarin", "Codeine"]);
        let panel = dataset::gene_panel();
        let result = run_screening(&selection, &panel, &store).unwrap();

        let temp_dir = TempDir::new()?;
        let output_path = temp_dir.path().join("matrix.tsv");
        let output_str = output_path.to_str().unwrap();

        let mut writer = MatrixWriter::new(output_str)?;
        writer.write_result(&result)?;
        writer.flush()?;

        assert_eq!(writer.rows_written(), 2);

        let written = std::fs::read_to_string(&output_path)?;
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Drug\tCYP2D6\tCYP2C19\tCYP2C9\tSLCO1B1\tDPYD\tTPMT");
        assert!(lines[1].starts_with("Warfarin\tN/A\tN/A\tHIGH"));
        assert!(lines[2].starts_with("Codeine\tMODERATE\tN/A\tN/A"));

        Ok(())
    }
}
