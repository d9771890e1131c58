use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use nyher_model::{FindingKind, ValidationReport};

const KINDS: [FindingKind; 6] = [
    FindingKind::FileMissingError,
    FindingKind::ArgumentError,
    FindingKind::SchemaViolation,
    FindingKind::RuleViolation,
    FindingKind::DataProcessingErrors,
    FindingKind::UnexpectedError,
];

/// Finding counts per source file and kind. Findings without a file are
/// grouped under `-`.
pub fn finding_counts(report: &ValidationReport) -> BTreeMap<String, BTreeMap<FindingKind, usize>> {
    let mut counts: BTreeMap<String, BTreeMap<FindingKind, usize>> = BTreeMap::new();
    for finding in &report.errors_summary {
        let file = finding
            .file_name
            .clone()
            .unwrap_or_else(|| "-".to_string());
        *counts.entry(file).or_default().entry(finding.kind).or_default() += 1;
    }
    counts
}

pub fn summary_table(report: &ValidationReport) -> Table {
    let counts = finding_counts(report);
    let kinds: Vec<FindingKind> = KINDS
        .into_iter()
        .filter(|kind| counts.values().any(|per_kind| per_kind.contains_key(kind)))
        .collect();

    let mut table = Table::new();
    let mut header = vec![header_cell("File")];
    header.extend(kinds.iter().map(|kind| header_cell(kind.as_str())));
    header.push(header_cell("Total"));
    table.set_header(header);
    apply_summary_table_style(&mut table);
    for index in 1..=kinds.len() + 1 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = vec![0usize; kinds.len()];
    for (file, per_kind) in &counts {
        let mut row = vec![Cell::new(file).fg(Color::Blue).add_attribute(Attribute::Bold)];
        let mut file_total = 0;
        for (index, kind) in kinds.iter().enumerate() {
            let count = per_kind.get(kind).copied().unwrap_or(0);
            totals[index] += count;
            file_total += count;
            row.push(count_cell(count, kind_color(*kind)));
        }
        row.push(Cell::new(file_total).add_attribute(Attribute::Bold));
        table.add_row(row);
    }

    let mut total_row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    total_row.extend(
        totals
            .iter()
            .zip(&kinds)
            .map(|(count, kind)| count_cell(*count, kind_color(*kind)).add_attribute(Attribute::Bold)),
    );
    total_row.push(Cell::new(totals.iter().sum::<usize>()).add_attribute(Attribute::Bold));
    table.add_row(total_row);
    table
}

pub fn print_summary(report: &ValidationReport) {
    if report.errors_summary.is_empty() {
        eprintln!("No findings.");
        return;
    }
    eprintln!("{}", summary_table(report));
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_color(kind: FindingKind) -> Color {
    match kind {
        FindingKind::RuleViolation => Color::Yellow,
        FindingKind::SchemaViolation | FindingKind::DataProcessingErrors => Color::Red,
        FindingKind::FileMissingError | FindingKind::ArgumentError => Color::Magenta,
        FindingKind::UnexpectedError => Color::DarkRed,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

#[cfg(test)]
mod tests {
    use nyher_model::Finding;

    use super::*;

    #[test]
    fn counts_group_by_file_and_kind() {
        let report = ValidationReport::with_findings(vec![
            Finding::rule_violation("yes-no-flag", "a").with_file("P.csv"),
            Finding::rule_violation("yes-no-flag", "b").with_file("P.csv"),
            Finding::missing_field("GENDER", "demographic_data").with_file("D.csv"),
            Finding::unexpected("boom"),
        ]);
        let counts = finding_counts(&report);
        assert_eq!(counts["P.csv"][&FindingKind::RuleViolation], 2);
        assert_eq!(counts["D.csv"][&FindingKind::DataProcessingErrors], 1);
        assert_eq!(counts["-"][&FindingKind::UnexpectedError], 1);
    }

    #[test]
    fn table_has_a_column_per_reported_kind() {
        let report = ValidationReport::with_findings(vec![
            Finding::rule_violation("date-format", "x").with_file("O.csv"),
        ]);
        let mut table = summary_table(&report);
        assert_eq!(table.column_count(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("rule-violation"));
        assert!(rendered.contains("TOTAL"));
    }
}
