use std::path::PathBuf;

use anyhow::{Context, Result};
use texinvoice_render::{CompilerConfig, Renderer, RendererConfig};

pub struct RenderArgs {
    pub invoice: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub template: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub clean: bool,
    pub latex: String,
    pub latex_args: Vec<String>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let invoice = super::load_invoice(&args.invoice)?;

    let mut config = RendererConfig::default().with_compiler(
        CompilerConfig::default()
            .with_program(args.latex)
            .with_args(args.latex_args),
    );
    config.template_dir = args.template_dir;
    config.template_name = args.template;
    config.output_directory = args.output_dir;
    config.invoice_name = args.name;

    let renderer = Renderer::new(&invoice, config).context("invalid renderer configuration")?;
    tracing::info!(
        reference = invoice.reference(),
        name = renderer.invoice_name(),
        "rendering invoice"
    );

    let document = renderer
        .run(args.clean)
        .with_context(|| format!("failed to render invoice {}", invoice.reference()))?;
    println!("{}", document.display());
    Ok(())
}
