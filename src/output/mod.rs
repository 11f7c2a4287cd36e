use crate::billing::{AssembledBill, Bill, BillSummary};
use crate::dosage::format_amount;
use crate::error::BillingResult;
use std::path::Path;
use std::fs::File;
use log::info;

pub fn save_bill<P: AsRef<Path>>(assembled: &AssembledBill, output_dir: P) -> BillingResult<()> {
    let output_path = output_dir.as_ref();

    // Full bill including rejected entries
    let file = File::create(output_path.join("bill.json"))?;
    serde_json::to_writer_pretty(file, assembled)?;

    save_bill_lines(&assembled.bill, &output_path.join("bill_lines.csv"))?;

    let summary = BillSummary::from_bill(&assembled.bill);
    save_bill_summary(&summary, &output_path.join("bill_summary.json"))?;

    info!("Bill {} saved to {:?}", assembled.bill.id, output_path);
    Ok(())
}

fn save_bill_lines<P: AsRef<Path>>(bill: &Bill, path: P) -> BillingResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "BILL_ID", "CODE", "CATEGORY", "DESCRIPTION", "QUANTITY", "UNIT", "UNIT_PRICE", "TOTAL"
    ])?;

    for line in bill.lines() {
        writer.write_record([
            bill.id.clone(),
            line.code.clone(),
            line.category.clone(),
            line.description.clone(),
            format_amount(line.quantity),
            line.unit.clone(),
            format!("{:.2}", line.unit_price),
            format!("{:.2}", line.total),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_bill_summary<P: AsRef<Path>>(summary: &BillSummary, path: P) -> BillingResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

/// Renders a markdown statement of the bill.
pub fn render_report(assembled: &AssembledBill, currency: &str) -> String {
    let bill = &assembled.bill;
    let summary = BillSummary::from_bill(bill);

    let mut report = format!(
        "# Bill {}\n\n- **Encounter**: {:?}\n- **Created**: {}\n- **Lines**: {}\n\n",
        bill.id,
        bill.encounter,
        bill.created_at.format("%Y-%m-%d %H:%M UTC"),
        summary.line_count,
    );

    report.push_str("## Items\n\n| Description | Qty | Unit | Unit price | Total |\n|---|---|---|---|---|\n");
    for line in bill.lines() {
        report.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.2} |\n",
            line.description,
            format_amount(line.quantity),
            line.unit,
            line.unit_price,
            line.total,
        ));
    }

    report.push_str("\n## Totals by category\n\n");
    for category in &summary.categories {
        report.push_str(&format!(
            "- {} ({} lines): {} {:.2}\n",
            category.category, category.line_count, currency, category.total
        ));
    }
    report.push_str(&format!("\n**Grand total: {} {:.2}**\n", currency, summary.total));

    let traced: Vec<_> = bill
        .lines()
        .iter()
        .filter_map(|line| line.calculation_details.as_ref().map(|d| (&line.code, d)))
        .collect();
    if !traced.is_empty() {
        report.push_str("\n## Dosage calculations\n\n");
        for (code, details) in traced {
            report.push_str(&format!("- `{}`: {}\n", code, details));
        }
    }

    if !assembled.rejected.is_empty() {
        report.push_str("\n## Not billed\n\n");
        for entry in &assembled.rejected {
            report.push_str(&format!("- entry {} `{}`: {}\n", entry.index, entry.code, entry.reason));
        }
    }

    report
}

pub fn generate_report<P: AsRef<Path>>(assembled: &AssembledBill, currency: &str, output_dir: P) -> BillingResult<()> {
    let report_path = output_dir.as_ref().join("bill_report.md");
    std::fs::write(report_path, render_report(assembled, currency))?;
    Ok(())
}
