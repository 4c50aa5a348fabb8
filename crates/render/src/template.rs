//! Template environment for LaTeX sources.
//!
//! Jinja's default delimiters clash with LaTeX braces and `%` comments, so the
//! environment is remapped:
//!
//! | construct       | syntax            |
//! |-----------------|-------------------|
//! | block           | `\BLOCK{ ... }`   |
//! | variable        | `\VAR{ ... }`     |
//! | comment         | `\#{ ... }`       |
//! | line statement  | `%% for x in xs`  |
//! | line comment    | `%# note`         |
//!
//! Newlines after block tags are trimmed and nothing is auto-escaped (the
//! data was escaped beforehand, see [`crate::escape`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value, path_loader};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use texinvoice_invoicing::{Invoice, LineItem};

/// Template rendered when none is configured.
pub const DEFAULT_TEMPLATE_NAME: &str = "main.tex";

/// Directory holding the templates shipped with this crate.
pub fn bundled_template_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

pub fn latex_syntax() -> Result<SyntaxConfig, Error> {
    SyntaxConfig::builder()
        .block_delimiters(r"\BLOCK{", "}")
        .variable_delimiters(r"\VAR{", "}")
        .comment_delimiters(r"\#{", "}")
        .line_statement_prefix("%%")
        .line_comment_prefix("%#")
        .build()
}

/// Environment loading templates from `template_dir`.
pub fn environment(template_dir: &Path) -> Result<Environment<'static>, Error> {
    let mut env = Environment::new();
    env.set_syntax(latex_syntax()?);
    env.set_trim_blocks(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_loader(path_loader(template_dir));
    env.add_filter("money", money);
    Ok(env)
}

/// `money` filter: a decimal with exactly two fractional digits.
fn money(value: Value) -> Result<String, Error> {
    let text = value.to_string();
    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot format `{text}` as an amount: {e}"),
            )
        })?;
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!("{rounded:.2}"))
}

/// The single value templates receive, as `invoice`.
///
/// Every stored invoice field plus the derived views used for layout.
#[derive(Debug, Serialize)]
pub struct InvoiceContext<'a> {
    #[serde(flatten)]
    invoice: &'a Invoice,
    due_date: Option<NaiveDate>,
    totals_by_vat_rate: &'a BTreeMap<Decimal, Decimal>,
    paginated_line_items: Vec<&'a [LineItem]>,
}

impl<'a> InvoiceContext<'a> {
    pub fn new(invoice: &'a Invoice) -> Self {
        Self {
            invoice,
            due_date: invoice.due_date(),
            totals_by_vat_rate: invoice.totals_by_vat_rate(),
            paginated_line_items: invoice.paginated_line_items(),
        }
    }
}
