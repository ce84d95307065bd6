use crate::report::REPORT_SCHEMA_VERSION;
use crate::types::{Phenotype, RiskTier};
use serde_json::Value;

/// Field names of the report document, in canonical order. Verification
/// treats any other key as a schema violation.
const REPORT_FIELDS: &[&str] = &[
    "schema_version",
    "generated_at",
    "patient_id",
    "drug",
    "gene",
    "diplotype",
    "phenotype",
    "risk_level",
    "cpic_guideline",
    "mechanism",
    "suggestion",
    "ai_confidence",
];

/// Outcome of one schema check on an exported report document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub field: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Field-by-field verification result for one report document.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    checks: Vec<FieldCheck>,
}

impl VerificationReport {
    fn check(
        &mut self,
        field: &str,
        passed: bool,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) {
        self.checks.push(FieldCheck {
            field: field.to_string(),
            passed,
            expected: expected.into(),
            actual: actual.into(),
        });
    }

    pub fn checks(&self) -> &[FieldCheck] {
        &self.checks
    }

    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn verdict(&self) -> String {
        if self.all_passed() {
            "ALL CHECKS PASSED".to_string()
        } else {
            format!("{} CHECK(S) FAILED", self.failed())
        }
    }
}

fn str_field<'a>(doc: &'a Value, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

fn check_non_empty(report: &mut VerificationReport, doc: &Value, field: &str) {
    match str_field(doc, field) {
        Some(value) => report.check(
            field,
            !value.is_empty(),
            "non-empty string",
            format!("{} chars", value.len()),
        ),
        None => report.check(field, false, "non-empty string", "missing"),
    }
}

/// Verify that a serialized report document matches the exported-report
/// schema. The result is total: unparseable input becomes a single failed
/// check rather than an error, so callers always get a report to display.
pub fn verify_report_json(json: &str) -> VerificationReport {
    let mut report = VerificationReport::default();

    let doc: Value = match serde_json::from_str(json) {
        Ok(doc) => doc,
        Err(err) => {
            report.check("document", false, "valid JSON object", err.to_string());
            return report;
        }
    };
    let object = match doc.as_object() {
        Some(object) => object,
        None => {
            report.check("document", false, "JSON object", type_name(&doc));
            return report;
        }
    };

    for field in REPORT_FIELDS {
        report.check(
            field,
            object.contains_key(*field),
            "present",
            if object.contains_key(*field) {
                "present"
            } else {
                "MISSING"
            },
        );
    }

    let extra: Vec<&str> = object
        .keys()
        .filter(|k| !REPORT_FIELDS.contains(&k.as_str()))
        .map(String::as_str)
        .collect();
    report.check(
        "no_extra_fields",
        extra.is_empty(),
        "declared fields only",
        if extra.is_empty() {
            "declared fields only".to_string()
        } else {
            format!("extra: {}", extra.join(", "))
        },
    );

    let schema = str_field(&doc, "schema_version").unwrap_or("");
    report.check(
        "schema_version.value",
        schema == REPORT_SCHEMA_VERSION,
        REPORT_SCHEMA_VERSION,
        schema,
    );

    let generated = str_field(&doc, "generated_at").unwrap_or("");
    report.check(
        "generated_at.format",
        chrono::DateTime::parse_from_rfc3339(generated).is_ok(),
        "ISO-8601 timestamp",
        generated,
    );

    check_non_empty(&mut report, &doc, "patient_id");
    check_non_empty(&mut report, &doc, "drug");
    check_non_empty(&mut report, &doc, "gene");
    check_non_empty(&mut report, &doc, "mechanism");
    check_non_empty(&mut report, &doc, "suggestion");

    let diplotype = str_field(&doc, "diplotype").unwrap_or("");
    report.check(
        "diplotype.format",
        diplotype.contains('/'),
        "*X/*Y",
        diplotype,
    );

    let phenotype = str_field(&doc, "phenotype").unwrap_or("");
    report.check(
        "phenotype.vocabulary",
        serde_json::from_value::<Phenotype>(Value::String(phenotype.to_string())).is_ok(),
        "known metabolizer phenotype",
        phenotype,
    );

    let risk = str_field(&doc, "risk_level").unwrap_or("");
    report.check(
        "risk_level.vocabulary",
        serde_json::from_value::<RiskTier>(Value::String(risk.to_string())).is_ok(),
        "HIGH|MODERATE|LOW",
        risk,
    );

    match doc.get("ai_confidence").and_then(Value::as_f64) {
        Some(confidence) => report.check(
            "ai_confidence.range",
            (0.0..=1.0).contains(&confidence),
            "number in [0, 1]",
            confidence.to_string(),
        ),
        None => report.check("ai_confidence.range", false, "number in [0, 1]", "missing"),
    }

    report
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{export_report, FixedClock};
    use crate::types::InteractionRecord;
    use chrono::{TimeZone, Utc};

    fn exported_json() -> String {
        let record = InteractionRecord {
            drug: "Warfarin".to_string(),
            gene: "CYP2C9".to_string(),
            diplotype: "*3/*3".to_string(),
            phenotype: Phenotype::PoorMetabolizer,
            risk: RiskTier::High,
            badge: "Contraindicated".to_string(),
            summary: "Non-functional enzyme.".to_string(),
            suggestion: "Reduce dose.".to_string(),
            ai_confidence: 0.98,
        };
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        export_report(&record, "P1", "CPIC v4.0", &clock)
            .unwrap()
            .to_json_pretty()
            .unwrap()
    }

    #[test]
    fn test_exported_report_passes_all_checks() {
        let report = verify_report_json(&exported_json());
        let failures: Vec<_> = report.checks().iter().filter(|c| !c.passed).collect();
        assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
        assert_eq!(report.verdict(), "ALL CHECKS PASSED");
    }

    #[test]
    fn test_unparseable_document_is_one_failed_check() {
        let report = verify_report_json("{not json");
        assert_eq!(report.total(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.checks()[0].field, "document");
    }

    #[test]
    fn test_missing_field_fails() {
        let json = exported_json().replace("\"risk_level\"", "\"risk\"");
        let report = verify_report_json(&json);
        assert!(!report.all_passed());
        assert!(report
            .checks()
            .iter()
            .any(|c| c.field == "risk_level" && !c.passed));
        assert!(report
            .checks()
            .iter()
            .any(|c| c.field == "no_extra_fields" && !c.passed));
    }

    #[test]
    fn test_unknown_risk_vocabulary_fails() {
        let json = exported_json().replace("\"HIGH\"", "\"SEVERE\"");
        let report = verify_report_json(&json);
        assert!(report
            .checks()
            .iter()
            .any(|c| c.field == "risk_level.vocabulary" && !c.passed));
    }

    #[test]
    fn test_confidence_out_of_range_fails() {
        let json = exported_json().replace("0.98", "1.7");
        let report = verify_report_json(&json);
        assert!(report
            .checks()
            .iter()
            .any(|c| c.field == "ai_confidence.range" && !c.passed));
        assert_eq!(report.verdict(), "1 CHECK(S) FAILED");
    }

    #[test]
    fn test_bad_timestamp_fails() {
        let json = exported_json().replace("2025-01-01T00:00:00Z", "yesterday");
        let report = verify_report_json(&json);
        assert!(report
            .checks()
            .iter()
            .any(|c| c.field == "generated_at.format" && !c.passed));
    }
}
