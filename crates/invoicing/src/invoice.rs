use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use texinvoice_core::{DomainError, DomainResult};

use crate::line_item::LineItem;
use crate::pagination::paginate;
use crate::party::{Customer, Issuer};

/// Title used when none (or a blank one) is supplied.
pub const DEFAULT_TITLE: &str = "Facture";

/// Payment interval used when none is supplied.
pub const DEFAULT_PAYMENT_WITHIN_DAYS: u32 = 30;

/// Raw invoice input.
///
/// Every field a caller may omit is optional here so that [`Invoice::new`]
/// can report all absent required fields at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceDraft {
    pub title: Option<String>,
    pub reference: Option<String>,
    #[serde(alias = "emited")]
    pub emitted: Option<NaiveDate>,
    pub issuer: Option<Issuer>,
    pub customer: Option<Customer>,
    #[serde(default, alias = "prestations")]
    pub line_items: Vec<LineItem>,
    pub payment_within: Option<u32>,
    pub late_payment_message: Option<String>,
}

/// A validated invoice.
///
/// `total_without_charge`, `total_vat` and `total` are derived from the line
/// items and recomputed by every method that changes them, so reading a total
/// never observes a stale value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InvoiceDraft")]
pub struct Invoice {
    title: String,
    reference: String,
    emitted: NaiveDate,
    issuer: Issuer,
    customer: Customer,
    line_items: Vec<LineItem>,
    /// Days after emission before payment is due.
    payment_within: u32,
    late_payment_message: Option<String>,
    total_without_charge: Decimal,
    total_vat: Decimal,
    total: Decimal,
    #[serde(skip_serializing)]
    vat_by_rate: BTreeMap<Decimal, Decimal>,
}

impl TryFrom<InvoiceDraft> for Invoice {
    type Error = DomainError;

    fn try_from(value: InvoiceDraft) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Invoice {
    pub fn new(draft: InvoiceDraft) -> DomainResult<Self> {
        let mut missing = Vec::new();
        let reference = draft.reference.filter(|r| !r.trim().is_empty());
        if reference.is_none() {
            missing.push("reference");
        }
        if draft.emitted.is_none() {
            missing.push("emitted");
        }
        if draft.issuer.is_none() {
            missing.push("issuer");
        }
        if draft.customer.is_none() {
            missing.push("customer");
        }

        let (Some(reference), Some(emitted), Some(issuer), Some(customer)) =
            (reference, draft.emitted, draft.issuer, draft.customer)
        else {
            return Err(DomainError::missing(missing));
        };

        issuer.validate().map_err(|e| e.nested("issuer"))?;
        customer.validate().map_err(|e| e.nested("customer"))?;

        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let mut invoice = Self {
            title,
            reference,
            emitted,
            issuer,
            customer,
            line_items: draft.line_items,
            payment_within: draft.payment_within.unwrap_or(DEFAULT_PAYMENT_WITHIN_DAYS),
            late_payment_message: draft.late_payment_message,
            total_without_charge: Decimal::ZERO,
            total_vat: Decimal::ZERO,
            total: Decimal::ZERO,
            vat_by_rate: BTreeMap::new(),
        };
        invoice.recompute_totals()?;
        Ok(invoice)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn emitted(&self) -> NaiveDate {
        self.emitted
    }

    pub fn issuer(&self) -> &Issuer {
        &self.issuer
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn payment_within(&self) -> u32 {
        self.payment_within
    }

    pub fn late_payment_message(&self) -> Option<&str> {
        self.late_payment_message.as_deref()
    }

    /// Sum of line totals, VAT excluded.
    pub fn total_without_charge(&self) -> Decimal {
        self.total_without_charge
    }

    pub fn total_vat(&self) -> Decimal {
        self.total_vat
    }

    /// `total_without_charge + total_vat`.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Emission date plus the payment interval (`None` past the calendar range).
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.emitted
            .checked_add_days(Days::new(u64::from(self.payment_within)))
    }

    /// VAT amount per distinct rate present in the line items.
    pub fn totals_by_vat_rate(&self) -> &BTreeMap<Decimal, Decimal> {
        &self.vat_by_rate
    }

    /// Line items split into printed pages (see [`paginate`]).
    pub fn paginated_line_items(&self) -> Vec<&[LineItem]> {
        paginate(&self.line_items)
    }

    pub fn set_line_items(&mut self, line_items: Vec<LineItem>) -> DomainResult<()> {
        self.update(|invoice| invoice.line_items = line_items)
    }

    pub fn push_line_item(&mut self, line: LineItem) -> DomainResult<()> {
        self.update(|invoice| invoice.line_items.push(line))
    }

    pub fn remove_line_item(&mut self, index: usize) -> DomainResult<LineItem> {
        if index >= self.line_items.len() {
            return Err(DomainError::invalid(
                "line_items",
                format!("no line item at index {index}"),
            ));
        }
        let mut removed = None;
        self.update(|invoice| removed = Some(invoice.line_items.remove(index)))?;
        removed.ok_or_else(|| DomainError::invariant("line item removal"))
    }

    /// Change one line item in place; invoice totals follow.
    pub fn update_line_item<F>(&mut self, index: usize, change: F) -> DomainResult<()>
    where
        F: FnOnce(&mut LineItem) -> DomainResult<()>,
    {
        let previous = self.clone();
        let line = self.line_items.get_mut(index).ok_or_else(|| {
            DomainError::invalid("line_items", format!("no line item at index {index}"))
        })?;
        let result = change(line).and_then(|()| self.recompute_totals());
        if result.is_err() {
            *self = previous;
        }
        result
    }

    fn update(&mut self, change: impl FnOnce(&mut Self)) -> DomainResult<()> {
        let previous = self.clone();
        change(self);
        if let Err(err) = self.recompute_totals() {
            *self = previous;
            return Err(err);
        }
        Ok(())
    }

    fn recompute_totals(&mut self) -> DomainResult<()> {
        let mut total_without_charge = Decimal::ZERO;
        let mut total_vat = Decimal::ZERO;
        let mut vat_by_rate = BTreeMap::new();
        for line in &self.line_items {
            total_without_charge = total_without_charge
                .checked_add(line.total())
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            total_vat = total_vat
                .checked_add(line.total_vat())
                .ok_or_else(|| DomainError::invariant("invoice vat overflow"))?;
            let rate_total = vat_by_rate.entry(line.vat()).or_insert(Decimal::ZERO);
            *rate_total = rate_total
                .checked_add(line.total_vat())
                .ok_or_else(|| DomainError::invariant("vat total overflow for one rate"))?;
        }
        let total = total_without_charge
            .checked_add(total_vat)
            .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;

        self.total_without_charge = total_without_charge;
        self.total_vat = total_vat;
        self.total = total;
        self.vat_by_rate = vat_by_rate;
        Ok(())
    }
}
