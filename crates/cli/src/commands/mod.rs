pub mod check;
pub mod render;
pub mod sample;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use texinvoice_invoicing::Invoice;

/// Read and validate an invoice JSON file.
pub fn load_invoice(path: &Path) -> Result<Invoice> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid invoice in {}", path.display()))
}
