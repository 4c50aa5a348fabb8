//! CLI command structure using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use texinvoice_observability::LogFormat;

#[derive(Parser)]
#[command(name = "texinvoice")]
#[command(version, about = "Render invoices to PDF through LaTeX", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log line layout (text or json)
    #[arg(long, global = true, env = "TEXINVOICE_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render an invoice JSON file to PDF
    Render {
        /// Invoice description (JSON)
        invoice: PathBuf,

        /// Directory holding the templates (default: bundled templates)
        #[arg(long)]
        template_dir: Option<PathBuf>,

        /// Template file name inside the template directory
        #[arg(long)]
        template: Option<String>,

        /// Where the PDF is written (default: the template directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Base name of the output files (default: a generated id)
        #[arg(short, long)]
        name: Option<String>,

        /// Keep the auxiliary files produced by the compiler
        #[arg(long)]
        no_clean: bool,

        /// LaTeX compiler to run
        #[arg(long, env = "TEXINVOICE_LATEX", default_value = "pdflatex")]
        latex: String,

        /// Extra argument passed to the compiler before the standard flags
        #[arg(long = "latex-arg", allow_hyphen_values = true)]
        latex_args: Vec<String>,
    },

    /// Validate an invoice JSON file and print its totals
    Check {
        /// Invoice description (JSON)
        invoice: PathBuf,
    },

    /// Print a sample invoice as JSON
    Sample {
        /// Number of line items
        #[arg(short, long, default_value_t = 3)]
        lines: usize,

        /// Alternate line items between 10% and 20% VAT
        #[arg(long)]
        variable_vat: bool,
    },
}
