// File: src/report.rs
use crate::core::types::{Comparison, MedicineRecord, Recommendation};
use crate::curation::CurationSummary;
use crate::stats::StoreStatistics;
use crate::validation::QualityReport;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 70;
/// How many entries of a long issue list are shown before summarising.
const LIST_PREVIEW: usize = 5;

/// Runs a writer against a fresh buffer. Writing into a `String` never fails.
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    let _ = write(&mut out);
    out
}

fn rule(out: &mut String, c: char) -> fmt::Result {
    writeln!(out, "{}", c.to_string().repeat(RULE_WIDTH))
}

fn banner(out: &mut String, title: &str) -> fmt::Result {
    rule(out, '=')?;
    writeln!(out, "{title}")?;
    rule(out, '=')
}

/// The full record of the queried medicine.
pub fn render_record(med: &MedicineRecord) -> String {
    render(|out| write_record(out, med))
}

fn write_record(out: &mut String, med: &MedicineRecord) -> fmt::Result {
    banner(out, &format!("ORIGINAL MEDICINE: {}", med.name))?;
    writeln!(out, "Category: {}", med.category_or_placeholder())?;
    writeln!(out, "Uses: {}", med.uses.join(", "))?;
    writeln!(out, "Components: {}", med.components.join(", "))?;
    if let Some(description) = med.description() {
        writeln!(out, "Description: {description}")?;
    }
    Ok(())
}

pub fn render_recommendation(rec: &Recommendation<'_>) -> String {
    render(|out| {
        write_record(out, rec.query)?;
        writeln!(out)?;
        banner(out, &format!("RECOMMENDED SIMILAR MEDICINES (Top {})", rec.results.len()))?;

        for (rank, ranked) in rec.results.iter().enumerate() {
            let med = ranked.medicine;
            writeln!(out, "\n{}. {} (Similarity: {:.3})", rank + 1, med.name, ranked.score)?;
            writeln!(out, "   Category: {}", med.category_or_placeholder())?;
            writeln!(out, "   Uses: {}", med.uses.join(", "))?;
            writeln!(out, "   Components: {}", med.components.join(", "))?;
            write_shared(out, &ranked.comparison, "   ")?;
            if let Some(description) = med.description() {
                writeln!(out, "   Description: {description}")?;
            }
        }
        Ok(())
    })
}

fn write_shared(out: &mut String, cmp: &Comparison, indent: &str) -> fmt::Result {
    if !cmp.shared_uses.is_empty() {
        writeln!(out, "{indent}Shared Uses: {}", cmp.shared_uses.join(", "))?;
    }
    if !cmp.shared_components.is_empty() {
        writeln!(out, "{indent}Shared Components: {}", cmp.shared_components.join(", "))?;
    }
    Ok(())
}

pub fn render_comparison(left: &MedicineRecord, right: &MedicineRecord, score: f64, cmp: &Comparison) -> String {
    render(|out| {
        banner(out, &format!("{} vs {}", left.name, right.name))?;
        writeln!(out, "Similarity: {score:.3}")?;
        if cmp.shared_uses.is_empty() && cmp.shared_components.is_empty() {
            writeln!(out, "No shared uses or components.")?;
        }
        write_shared(out, cmp, "")
    })
}

pub fn render_quality_report(report: &QualityReport) -> String {
    render(|out| write_quality_report(out, report))
}

fn write_quality_report(out: &mut String, report: &QualityReport) -> fmt::Result {
    writeln!(out)?;
    banner(out, "DATA QUALITY REPORT")?;
    writeln!(out, "\nTotal Medicines: {}", report.total_medicines)?;
    writeln!(out, "Quality Score: {:.1}/100", report.quality_score)?;

    let mark = if report.structure_valid { "✓" } else { "✗" };
    writeln!(out, "\nStructure Valid: {mark}")?;
    if !report.structure_errors.is_empty() {
        writeln!(out, "  Errors:")?;
        preview(out, &report.structure_errors, "    ")?;
    }

    let req = &report.required_fields;
    writeln!(out, "\nRequired Fields:")?;
    writeln!(out, "  Complete: {}/{}", req.complete, req.total)?;
    if !req.missing_fields.is_empty() {
        writeln!(out, "  Missing fields:")?;
        for (field, indices) in &req.missing_fields {
            writeln!(out, "    - {field}: {} medicines", indices.len())?;
        }
    }

    if report.duplicates.is_empty() {
        writeln!(out, "\nDuplicates: None ✓")?;
    } else {
        writeln!(out, "\nDuplicates Found: {}", report.duplicates.len())?;
        for dup in report.duplicates.iter().take(LIST_PREVIEW) {
            writeln!(out, "  - '{}': {} entries", dup.name, dup.count)?;
        }
    }

    if report.type_errors.is_empty() {
        writeln!(out, "\nType Errors: None ✓")?;
    } else {
        writeln!(out, "\nType Errors: {}", report.type_errors.len())?;
        preview(out, &report.type_errors, "  ")?;
    }

    let c = &report.completeness;
    writeln!(out, "\nCompleteness:")?;
    writeln!(out, "  Has uses: {}", c.has_uses)?;
    writeln!(out, "  Has components: {}", c.has_components)?;
    writeln!(out, "  Has both: {}", c.has_both)?;
    writeln!(out, "  Has neither: {}", c.has_neither)?;
    if !c.empty_entries.is_empty() {
        writeln!(out, "  Empty entries:")?;
        for entry in c.empty_entries.iter().take(LIST_PREVIEW) {
            writeln!(out, "    - Index {}: {}", entry.index, entry.name)?;
        }
    }
    writeln!(out)?;
    rule(out, '=')
}

fn preview(out: &mut String, items: &[String], indent: &str) -> fmt::Result {
    for item in items.iter().take(LIST_PREVIEW) {
        writeln!(out, "{indent}- {item}")?;
    }
    if items.len() > LIST_PREVIEW {
        writeln!(out, "{indent}... and {} more", items.len() - LIST_PREVIEW)?;
    }
    Ok(())
}

pub fn render_curation_summary(summary: &CurationSummary) -> String {
    render(|out| {
        writeln!(out, "  - Trimmed {} names", summary.trimmed_names)?;
        writeln!(out, "  - Standardized {} use terms", summary.standardized_terms)?;
        writeln!(out, "  - Cleaned {} terms", summary.cleaned_terms)?;
        writeln!(out, "  - Added {} categories", summary.categories_added)?;
        writeln!(out, "  - Merged {} duplicates", summary.merged_duplicates)?;
        writeln!(out, "  - Medicines: {} -> {}", summary.medicines_before, summary.medicines_after)
    })
}

pub fn render_statistics(stats: &StoreStatistics) -> String {
    render(|out| {
        writeln!(out)?;
        banner(out, "DATABASE STATISTICS")?;
        writeln!(out, "\nTotal Medicines: {}", stats.total_medicines)?;
        writeln!(out, "Total Uses: {} ({} distinct)", stats.total_uses, stats.unique_uses)?;
        writeln!(out, "Total Components: {} ({} distinct)", stats.total_components, stats.unique_components)?;
        writeln!(out, "Average Uses per Medicine: {:.1}", stats.avg_uses_per_medicine)?;
        writeln!(out, "Average Components per Medicine: {:.1}", stats.avg_components_per_medicine)?;

        writeln!(out, "\nCategories:")?;
        for (category, count) in stats.categories_by_count() {
            writeln!(out, "  - {category}: {count}")?;
        }
        writeln!(out)?;
        rule(out, '=')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RankedMedicine;

    #[test]
    fn test_recommendation_layout() {
        let query = MedicineRecord::new("Paracetamol")
            .with_uses(["fever", "pain"])
            .with_components(["acetaminophen"])
            .with_description("Common analgesic");
        let other = MedicineRecord::new("Ibuprofen")
            .with_uses(["pain"])
            .with_components(["ibuprofen"])
            .with_category("NSAID");
        let rec = Recommendation {
            query: &query,
            results: vec![RankedMedicine {
                id: 1,
                medicine: &other,
                score: 0.31234,
                comparison: Comparison {
                    shared_uses: vec!["pain".into()],
                    shared_components: vec![],
                },
            }],
        };
        let text = render_recommendation(&rec);
        assert!(text.contains("ORIGINAL MEDICINE: Paracetamol"));
        assert!(text.contains("Category: N/A"));
        assert!(text.contains("Description: Common analgesic"));
        assert!(text.contains("RECOMMENDED SIMILAR MEDICINES (Top 1)"));
        assert!(text.contains("1. Ibuprofen (Similarity: 0.312)"));
        assert!(text.contains("   Category: NSAID"));
        assert!(text.contains("   Shared Uses: pain"));
        assert!(!text.contains("Shared Components"));
    }

    #[test]
    fn test_comparison_without_overlap() {
        let a = MedicineRecord::new("A").with_uses(["cough"]);
        let b = MedicineRecord::new("B").with_uses(["rash"]);
        let text = render_comparison(&a, &b, 0.0, &Comparison::default());
        assert!(text.contains("Similarity: 0.000"));
        assert!(text.contains("No shared uses or components."));
    }

    #[test]
    fn test_long_lists_are_truncated() {
        let items: Vec<String> = (0..8).map(|i| format!("e{i}")).collect();
        let out = render(|out| preview(out, &items, ""));
        assert!(out.contains("- e4"));
        assert!(!out.contains("- e5"));
        assert!(out.contains("... and 3 more"));
    }

    #[test]
    fn test_curation_summary_lists_cleanup() {
        let summary = CurationSummary {
            cleaned_terms: 4,
            trimmed_names: 1,
            medicines_before: 1,
            medicines_after: 1,
            ..CurationSummary::default()
        };
        let text = render_curation_summary(&summary);
        assert!(text.contains("Trimmed 1 names"));
        assert!(text.contains("Cleaned 4 terms"));
        assert!(text.ends_with("Medicines: 1 -> 1\n"));
    }

    #[test]
    fn test_statistics_layout() {
        let meds = vec![
            MedicineRecord::new("A").with_uses(["pain", "fever"]).with_category("Analgesic"),
            MedicineRecord::new("B").with_uses(["pain"]).with_components(["x"]),
        ];
        let text = render_statistics(&StoreStatistics::from_records(&meds));
        assert!(text.contains("DATABASE STATISTICS"));
        assert!(text.contains("Total Medicines: 2"));
        assert!(text.contains("Total Uses: 3 (2 distinct)"));
        assert!(text.contains("Average Uses per Medicine: 1.5"));
        assert!(text.contains("Average Components per Medicine: 0.5"));
        assert!(text.contains("  - Analgesic: 1"));
        assert!(text.contains("  - N/A: 1"));
    }
}
