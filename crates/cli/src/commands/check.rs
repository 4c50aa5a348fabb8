use std::path::Path;

use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};

pub fn run(path: &Path) -> Result<()> {
    let invoice = super::load_invoice(path)?;

    println!("{} {}", invoice.title(), invoice.reference());
    println!("issuer:   {}", invoice.issuer().display_name());
    println!("customer: {}", invoice.customer().display_name());
    println!("emitted:  {}", invoice.emitted());
    match invoice.due_date() {
        Some(due) => println!("due:      {due}"),
        None => println!("due:      out of calendar range"),
    }
    println!("lines:    {}", invoice.line_items().len());

    let pages: Vec<String> = invoice
        .paginated_line_items()
        .iter()
        .map(|page| page.len().to_string())
        .collect();
    println!("pages:    {} ({})", pages.len(), pages.join(", "));

    println!("total without VAT: {}", money(invoice.total_without_charge()));
    for (rate, amount) in invoice.totals_by_vat_rate() {
        println!("VAT {rate}%: {}", money(*amount));
    }
    println!("total VAT: {}", money(invoice.total_vat()));
    println!("total: {}", money(invoice.total()));
    Ok(())
}

fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
