use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use texinvoice_core::Email;
use texinvoice_invoicing::{
    Address, BankDetails, Customer, Invoice, InvoiceDraft, Issuer, LineItem,
};

pub fn run(lines: usize, variable_vat: bool) -> Result<()> {
    let invoice = sample_invoice(lines, variable_vat)?;
    let json = serde_json::to_string_pretty(&invoice).context("failed to serialize sample")?;
    println!("{json}");
    Ok(())
}

/// A fixed invoice, handy as a starting point or to try out a template.
pub fn sample_invoice(lines: usize, variable_vat: bool) -> Result<Invoice> {
    let issuer = Issuer {
        company_name: Some("My Awesome Company".to_string()),
        first_name: Some("Pierre".to_string()),
        last_name: Some("Martin".to_string()),
        siret: Some("000 000 000 00000".to_string()),
        intracom_vat: Some("FR00000000000".to_string()),
        address: Some(Address::new("Champ de Mars", 75007, "Paris")),
        email: Some(Email::parse("contact@my-awesome-company.com")?),
        phone: Some("+33 1 00 00 00 00".to_string()),
        bank: Some(BankDetails {
            name: Some("My Awesome Company".to_string()),
            iban: "FR76 0000 0000 0000 0000 0000 000".to_string(),
            bic: "BNPAFRPPXXX".to_string(),
        }),
        ..Issuer::default()
    };
    let customer = Customer {
        name: Some("Dupond & Fils".to_string()),
        address: Some(Address::new("17 avenue des Champs-Élysées", 75008, "Paris")),
        email: Some(Email::parse("jean.dupond@example.com")?),
        ..Customer::person("Jean", "Dupond")
    };

    let line_items = (1..=lines)
        .map(|n| {
            let vat = if variable_vat && n % 2 == 0 {
                Decimal::from(10)
            } else {
                Decimal::from(20)
            };
            let unit_price = Decimal::new(12_50 * n as i64, 2);
            LineItem::new(format!("Prestation {n}"), unit_price, Decimal::from(n as u64), vat)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let invoice = Invoice::new(InvoiceDraft {
        reference: Some("2021-001".to_string()),
        emitted: NaiveDate::from_ymd_opt(2021, 10, 1),
        issuer: Some(issuer),
        customer: Some(customer),
        line_items,
        late_payment_message: Some(
            "En cas de retard de paiement, une indemnité forfaitaire de 40 € sera exigée."
                .to_string(),
        ),
        ..InvoiceDraft::default()
    })?;
    Ok(invoice)
}
