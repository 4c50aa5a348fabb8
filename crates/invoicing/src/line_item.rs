use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use texinvoice_core::{DomainError, DomainResult};

/// One billable row of an invoice.
///
/// `total` and `total_vat` are derived from `quantity`, `unit_price` and `vat`
/// and recomputed by every setter; they cannot be set directly. When
/// deserialized, incoming totals are ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemFields")]
pub struct LineItem {
    title: String,
    unit_price: Decimal,
    quantity: Decimal,
    /// VAT rate as a percentage.
    vat: Decimal,
    total: Decimal,
    total_vat: Decimal,
}

#[derive(Deserialize)]
struct LineItemFields {
    title: String,
    unit_price: Decimal,
    quantity: Decimal,
    #[serde(default)]
    vat: Decimal,
}

impl TryFrom<LineItemFields> for LineItem {
    type Error = DomainError;

    fn try_from(value: LineItemFields) -> Result<Self, Self::Error> {
        Self::new(value.title, value.unit_price, value.quantity, value.vat)
    }
}

impl LineItem {
    pub fn new(
        title: impl Into<String>,
        unit_price: Decimal,
        quantity: Decimal,
        vat: Decimal,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::missing(["title"]));
        }
        validate_quantity(quantity)?;
        validate_vat(vat)?;

        let mut line = Self {
            title,
            unit_price,
            quantity,
            vat,
            total: Decimal::ZERO,
            total_vat: Decimal::ZERO,
        };
        line.recompute()?;
        Ok(line)
    }

    /// Line without VAT.
    pub fn untaxed(
        title: impl Into<String>,
        unit_price: Decimal,
        quantity: Decimal,
    ) -> DomainResult<Self> {
        Self::new(title, unit_price, quantity, Decimal::ZERO)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn vat(&self) -> Decimal {
        self.vat
    }

    /// `quantity * unit_price`.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// `unit_price * quantity * vat / 100`.
    pub fn total_vat(&self) -> Decimal {
        self.total_vat
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) -> DomainResult<()> {
        self.update(|line| line.unit_price = unit_price)
    }

    pub fn set_quantity(&mut self, quantity: Decimal) -> DomainResult<()> {
        validate_quantity(quantity)?;
        self.update(|line| line.quantity = quantity)
    }

    pub fn set_vat(&mut self, vat: Decimal) -> DomainResult<()> {
        validate_vat(vat)?;
        self.update(|line| line.vat = vat)
    }

    // Applies a change, rolling it back if the derived totals overflow.
    fn update(&mut self, change: impl FnOnce(&mut Self)) -> DomainResult<()> {
        let previous = self.clone();
        change(self);
        if let Err(err) = self.recompute() {
            *self = previous;
            return Err(err);
        }
        Ok(())
    }

    fn recompute(&mut self) -> DomainResult<()> {
        let total = self
            .quantity
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::invariant("line total overflow"))?;
        let rate = self
            .vat
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(|| DomainError::invariant("vat rate overflow"))?;
        let total_vat = self
            .unit_price
            .checked_mul(self.quantity)
            .and_then(|amount| amount.checked_mul(rate))
            .ok_or_else(|| DomainError::invariant("line vat overflow"))?;

        self.total = total;
        self.total_vat = total_vat;
        Ok(())
    }
}

fn validate_quantity(quantity: Decimal) -> DomainResult<()> {
    if quantity < Decimal::ZERO {
        return Err(DomainError::invalid("quantity", "must not be negative"));
    }
    Ok(())
}

fn validate_vat(vat: Decimal) -> DomainResult<()> {
    if vat < Decimal::ZERO || vat > Decimal::ONE_HUNDRED {
        return Err(DomainError::invalid("vat", "must be a percentage between 0 and 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prestation() -> LineItem {
        LineItem::new("prestation", dec!(10.0), dec!(2), dec!(10)).unwrap()
    }

    #[test]
    fn derives_total_and_total_vat() {
        let line = prestation();
        assert_eq!(line.total(), dec!(20));
        assert_eq!(line.total_vat(), dec!(2));
    }

    #[test]
    fn vat_defaults_to_zero() {
        let json = r#"{"title": "audit", "unit_price": 150, "quantity": 1.5}"#;
        let line: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(line.vat(), Decimal::ZERO);
        assert_eq!(line.total(), dec!(225));
        assert_eq!(line.total_vat(), Decimal::ZERO);
    }

    #[test]
    fn deserialization_ignores_supplied_totals() {
        let json = r#"{
            "title": "x", "unit_price": "10", "quantity": "2", "vat": "20",
            "total": "999", "total_vat": "1"
        }"#;
        let line: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(line.total(), dec!(20));
        assert_eq!(line.total_vat(), dec!(4));
    }

    #[test]
    fn setters_recompute_derived_fields() {
        let mut line = prestation();
        line.set_quantity(dec!(3)).unwrap();
        assert_eq!(line.total(), dec!(30));
        assert_eq!(line.total_vat(), dec!(3));

        line.set_unit_price(dec!(5)).unwrap();
        assert_eq!(line.total(), dec!(15));

        line.set_vat(dec!(20)).unwrap();
        assert_eq!(line.total_vat(), dec!(3));
    }

    #[test]
    fn rejects_invalid_values() {
        let err = LineItem::new(" ", dec!(1), dec!(1), dec!(0)).unwrap_err();
        assert_eq!(err.fields(), vec!["title"]);

        let err = LineItem::new("x", dec!(1), dec!(-1), dec!(0)).unwrap_err();
        assert_eq!(err.fields(), vec!["quantity"]);

        let err = LineItem::new("x", dec!(1), dec!(1), dec!(120)).unwrap_err();
        assert_eq!(err.fields(), vec!["vat"]);

        let mut line = prestation();
        assert!(line.set_vat(dec!(-5)).is_err());
        assert_eq!(line.vat(), dec!(10));
    }

    #[test]
    fn non_numeric_price_is_rejected_on_input() {
        let res: Result<LineItem, _> =
            serde_json::from_str(r#"{"title": "x", "unit_price": "ten", "quantity": 1}"#);
        assert!(res.is_err());
    }

    #[test]
    fn overflow_leaves_line_unchanged() {
        let mut line = LineItem::untaxed("x", Decimal::MAX, dec!(1)).unwrap();
        assert!(matches!(
            line.set_quantity(dec!(2)),
            Err(DomainError::InvariantViolation(_))
        ));
        assert_eq!(line.quantity(), dec!(1));
        assert_eq!(line.total(), Decimal::MAX);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn decimal(max: i64, scale: u32) -> impl Strategy<Value = Decimal> {
            (0..max).prop_map(move |m| Decimal::new(m, scale))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: derived fields follow their formulas for non-negative inputs.
            #[test]
            fn derived_fields_match_formulas(
                unit_price in decimal(10_000_000, 2),
                quantity in decimal(100_000, 3),
                vat in decimal(10_000, 2),
            ) {
                let line = LineItem::new("p", unit_price, quantity, vat).unwrap();
                prop_assert_eq!(line.total(), quantity * unit_price);
                prop_assert_eq!(
                    line.total_vat(),
                    unit_price * quantity * (vat / Decimal::ONE_HUNDRED)
                );
            }
        }
    }
}
