//! LaTeX escaping of invoice text.
//!
//! Every string leaf of the invoice data is escaped before it reaches the
//! template, so names, addresses or notes cannot break or inject markup.

use serde_json::Value;

use texinvoice_invoicing::{Invoice, InvoiceDraft};

use crate::error::RenderResult;

/// Replacement for a character that LaTeX would interpret, if any.
fn replacement(c: char) -> Option<&'static str> {
    Some(match c {
        '&' => r"\&",
        '%' => r"\%",
        '$' => r"\$",
        '#' => r"\#",
        '_' => r"\_",
        '{' => r"\{",
        '}' => r"\}",
        '~' => r"\textasciitilde{}",
        '^' => r"\^{}",
        '\\' => r"\textbackslash{}",
        '<' => r"\textless{}",
        '>' => r"\textgreater{}",
        _ => return None,
    })
}

/// Escape `text` so that it typesets literally.
///
/// Each input character is replaced at most once, in a single left-to-right
/// pass, so the braces and backslashes introduced by a replacement are never
/// escaped again.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match replacement(c) {
            Some(r) => escaped.push_str(r),
            None => escaped.push(c),
        }
    }
    escaped
}

/// Escape every string in a data tree, through nested maps and sequences.
///
/// Object keys and non-string scalars are kept as they are.
pub fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_markup(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, escape_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// A new, validated invoice whose text fields are all escaped.
///
/// The issuer logo is a file path, not text, and is kept verbatim; templates
/// pass it through `\detokenize`. The caller's invoice is left untouched.
pub fn escaped_invoice(invoice: &Invoice) -> RenderResult<Invoice> {
    let value = escape_value(serde_json::to_value(invoice)?);
    let mut draft: InvoiceDraft = serde_json::from_value(value)?;
    if let Some(issuer) = draft.issuer.as_mut() {
        issuer.logo.clone_from(&invoice.issuer().logo);
    }
    Ok(Invoice::new(draft)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use texinvoice_invoicing::{Address, Customer, Issuer, LineItem};

    #[test]
    fn escapes_each_special_character() {
        let cases = [
            ("&", r"\&"),
            ("%", r"\%"),
            ("$", r"\$"),
            ("#", r"\#"),
            ("_", r"\_"),
            ("{", r"\{"),
            ("}", r"\}"),
            ("~", r"\textasciitilde{}"),
            ("^", r"\^{}"),
            ("\\", r"\textbackslash{}"),
            ("<", r"\textless{}"),
            (">", r"\textgreater{}"),
        ];
        for (input, expected) in cases {
            assert_eq!(escape_markup(input), expected, "escaping {input:?}");
        }
    }

    #[test]
    fn no_double_escaping() {
        assert_eq!(escape_markup("50% & $100"), r"50\% \& \$100");
        assert_eq!(escape_markup(r"a\b{c}"), r"a\textbackslash{}b\{c\}");
        assert_eq!(escape_markup("~^"), r"\textasciitilde{}\^{}");
    }

    #[test]
    fn escapes_nested_strings_only() {
        let value = json!({
            "name": "R&D",
            "count": 3,
            "paid": false,
            "tags": ["a_b", {"deep": "100%"}, null],
            "key_with_underscore": "x",
        });
        let escaped = escape_value(value);
        assert_eq!(
            escaped,
            json!({
                "name": r"R\&D",
                "count": 3,
                "paid": false,
                "tags": [r"a\_b", {"deep": r"100\%"}, null],
                "key_with_underscore": "x",
            })
        );
    }

    #[test]
    fn logo_path_is_not_escaped() {
        let invoice = Invoice::new(InvoiceDraft {
            reference: Some("2021-001".to_string()),
            emitted: NaiveDate::from_ymd_opt(2021, 10, 1),
            issuer: Some(Issuer {
                logo: Some("assets/my_logo.png".to_string()),
                ..Issuer::company("ACME_corp")
            }),
            customer: Some(Customer::person("Jean", "Dupond")),
            ..InvoiceDraft::default()
        })
        .unwrap();

        let escaped = escaped_invoice(&invoice).unwrap();
        assert_eq!(escaped.issuer().logo.as_deref(), Some("assets/my_logo.png"));
        assert_eq!(escaped.issuer().company_name.as_deref(), Some(r"ACME\_corp"));
    }

    #[test]
    fn escaped_invoice_is_a_new_escaped_copy() {
        let invoice = Invoice::new(InvoiceDraft {
            reference: Some("2021_001".to_string()),
            emitted: NaiveDate::from_ymd_opt(2021, 10, 1),
            issuer: Some(Issuer {
                address: Some(Address::new("1 rue #2", 75000, "Paris")),
                ..Issuer::company("My Awesome Company with characters_to_escape!")
            }),
            customer: Some(Customer::person("Jean", "Dupond & fils")),
            line_items: vec![LineItem::new("50% off", dec!(10), dec!(2), dec!(10)).unwrap()],
            ..InvoiceDraft::default()
        })
        .unwrap();
        let original = invoice.clone();

        let escaped = escaped_invoice(&invoice).unwrap();

        assert_eq!(invoice, original);
        assert_eq!(escaped.reference(), r"2021\_001");
        assert_eq!(
            escaped.issuer().company_name.as_deref(),
            Some(r"My Awesome Company with characters\_to\_escape!")
        );
        assert_eq!(
            escaped.issuer().address.as_ref().map(|a| a.street.as_str()),
            Some(r"1 rue \#2")
        );
        assert_eq!(escaped.customer().last_name.as_deref(), Some(r"Dupond \& fils"));
        assert_eq!(escaped.line_items()[0].title(), r"50\% off");
        assert_eq!(escaped.total(), invoice.total());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: text without special characters is left unchanged.
            #[test]
            fn plain_text_is_unchanged(text in "[A-Za-z0-9 .,;:!?'()@/-]{0,64}") {
                prop_assert_eq!(escape_markup(&text), text);
            }

            /// Property: each input character contributes exactly one
            /// replacement (or itself) to the output.
            #[test]
            fn output_length_matches_replacements(text in any::<String>()) {
                let expected: usize = text
                    .chars()
                    .map(|c| replacement(c).map_or(c.len_utf8(), str::len))
                    .sum();
                prop_assert_eq!(escape_markup(&text).len(), expected);
            }
        }
    }
}
