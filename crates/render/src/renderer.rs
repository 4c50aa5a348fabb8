//! Renderer: ties escaping, template filling, compilation and cleanup
//! together.
//!
//! A [`Renderer`] owns file-path state (`<output>/<name>.tex`,
//! `<output>/<name>.pdf`); it is meant for one render at a time. Concurrent
//! renders must use distinct output directories or names.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{ErrorKind, context};
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use texinvoice_invoicing::Invoice;

use crate::compiler::{CompilerConfig, CompilerOutput};
use crate::error::{CompilationError, ConfigError, RenderError, RenderResult};
use crate::escape::escaped_invoice;
use crate::template::{self, DEFAULT_TEMPLATE_NAME, InvoiceContext};

/// Extension of the final document.
const DOCUMENT_EXTENSION: &str = "pdf";

/// Extension of the filled template.
const SOURCE_EXTENSION: &str = "tex";

/// Two passes settle forward references such as the page count.
const COMPILER_PASSES: usize = 2;

/// Renderer configuration. Unset fields take their defaults when the
/// renderer is built.
#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    /// Directory holding the templates (default: the bundled templates).
    pub template_dir: Option<PathBuf>,
    /// Template file name (default: `main.tex`).
    pub template_name: Option<String>,
    /// Where sources and documents are written (default: the template directory).
    pub output_directory: Option<PathBuf>,
    /// Base name of the output files (default: a fresh UUID).
    pub invoice_name: Option<String>,
    pub compiler: CompilerConfig,
}

impl RendererConfig {
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(dir.into());
        self
    }

    pub fn with_invoice_name(mut self, name: impl Into<String>) -> Self {
        self.invoice_name = Some(name.into());
        self
    }

    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }
}

/// Renders one invoice into a PDF.
#[derive(Debug, Clone)]
pub struct Renderer {
    template_dir: PathBuf,
    template_name: String,
    output_directory: PathBuf,
    invoice_name: String,
    compiler: CompilerConfig,
    data: Invoice,
}

impl Renderer {
    /// Resolve the configuration and store an escaped copy of `invoice`.
    ///
    /// Fails with [`ConfigError::TemplateDirNotFound`] before anything is
    /// rendered if a template directory was given and does not exist.
    pub fn new(invoice: &Invoice, config: RendererConfig) -> RenderResult<Self> {
        let template_dir = resolve_template_dir(config.template_dir)?;
        let output_directory = resolve_output_directory(config.output_directory, &template_dir)?;

        Ok(Self {
            template_dir,
            template_name: resolve_template_name(config.template_name),
            output_directory,
            invoice_name: resolve_invoice_name(config.invoice_name),
            compiler: config.compiler,
            data: escaped_invoice(invoice)?,
        })
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn invoice_name(&self) -> &str {
        &self.invoice_name
    }

    pub fn compiler(&self) -> &CompilerConfig {
        &self.compiler
    }

    /// The escaped copy of the invoice handed to the template.
    pub fn data(&self) -> &Invoice {
        &self.data
    }

    /// `None` restores the bundled template directory.
    pub fn set_template_dir(&mut self, dir: Option<PathBuf>) -> RenderResult<()> {
        self.template_dir = resolve_template_dir(dir)?;
        Ok(())
    }

    /// `None` restores the default template name.
    pub fn set_template_name(&mut self, name: Option<String>) {
        self.template_name = resolve_template_name(name);
    }

    /// `None` falls back to the template directory.
    pub fn set_output_directory(&mut self, dir: Option<PathBuf>) -> RenderResult<()> {
        self.output_directory = resolve_output_directory(dir, &self.template_dir)?;
        Ok(())
    }

    /// `None` generates a fresh name; a trailing `.pdf` is dropped.
    pub fn set_invoice_name(&mut self, name: Option<String>) {
        self.invoice_name = resolve_invoice_name(name);
    }

    /// Replace the data with an escaped copy of `invoice`.
    pub fn set_invoice(&mut self, invoice: &Invoice) -> RenderResult<()> {
        self.data = escaped_invoice(invoice)?;
        Ok(())
    }

    /// `<output_directory>/<invoice_name>.tex`
    pub fn source_path(&self) -> PathBuf {
        self.output_file(SOURCE_EXTENSION)
    }

    /// `<output_directory>/<invoice_name>.pdf`
    pub fn document_path(&self) -> PathBuf {
        self.output_file(DOCUMENT_EXTENSION)
    }

    fn output_file(&self, extension: &str) -> PathBuf {
        self.output_directory
            .join(format!("{}.{extension}", self.invoice_name))
    }

    /// Render the template with the escaped invoice and write the source file.
    pub fn fill_template(&self) -> RenderResult<PathBuf> {
        let env = template::environment(&self.template_dir)?;
        let tmpl = env.get_template(&self.template_name).map_err(|err| {
            if err.kind() == ErrorKind::TemplateNotFound {
                RenderError::from(ConfigError::TemplateNotFound {
                    name: self.template_name.clone(),
                    dir: self.template_dir.clone(),
                })
            } else {
                RenderError::from(err)
            }
        })?;
        debug!(template = %self.template_name, "template loaded");

        let filled = tmpl.render(context! { invoice => InvoiceContext::new(&self.data) })?;

        fs::create_dir_all(&self.output_directory)
            .map_err(|e| RenderError::io(&self.output_directory, e))?;
        let source = self.source_path();
        fs::write(&source, filled).map_err(|e| RenderError::io(&source, e))?;
        debug!(source = %source.display(), "source written");
        Ok(source)
    }

    /// Run a single compiler pass over the filled source.
    pub fn compile(&self) -> Result<CompilerOutput, CompilationError> {
        self.compiler
            .invoke(&self.source_path(), &self.output_directory, &self.template_dir)
    }

    /// Fail unless the compiler reported success for `pass`.
    pub fn verify_compilation(
        &self,
        pass: usize,
        output: &CompilerOutput,
    ) -> Result<(), CompilationError> {
        self.compiler.verify(pass, output)
    }

    /// Remove every file of the output tree named after this invoice, except
    /// the PDF itself. Returns the number of files removed.
    pub fn clean(&self) -> RenderResult<usize> {
        let document_name = format!("{}.{DOCUMENT_EXTENSION}", self.invoice_name);
        let template_path = self.template_dir.join(&self.template_name);
        let mut removed = 0;

        for entry in WalkDir::new(&self.output_directory) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| self.output_directory.clone(), Path::to_path_buf);
                RenderError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !name.starts_with(&self.invoice_name) || name == document_name {
                continue;
            }
            if entry.path() == template_path {
                continue;
            }
            fs::remove_file(entry.path()).map_err(|e| RenderError::io(entry.path(), e))?;
            debug!(file = %entry.path().display(), "removed intermediate file");
            removed += 1;
        }
        Ok(removed)
    }

    /// Fill, compile twice, verify, optionally clean.
    ///
    /// Returns the path of the PDF. On a compilation failure nothing is
    /// cleaned, so the log and source stay available.
    pub fn run(&self, clean: bool) -> RenderResult<PathBuf> {
        self.fill_template()?;

        let mut outputs = Vec::with_capacity(COMPILER_PASSES);
        for pass in 1..=COMPILER_PASSES {
            let output = self.compile()?;
            debug!(pass, status = ?output.status, "compiler pass finished");
            outputs.push(output);
        }
        for (index, output) in outputs.iter().enumerate() {
            if let Err(err) = self.verify_compilation(index + 1, output) {
                warn!(invoice = %self.invoice_name, error = %err, "compilation failed");
                return Err(err.into());
            }
        }

        if clean {
            let removed = self.clean()?;
            debug!(removed, "intermediate files cleaned");
        }

        let document = self.document_path();
        info!(document = %document.display(), "invoice rendered");
        Ok(document)
    }
}

fn resolve_template_dir(dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let dir = dir.unwrap_or_else(template::bundled_template_dir);
    if !dir.is_dir() {
        return Err(ConfigError::TemplateDirNotFound(dir));
    }
    // The compiler runs from this directory, so it must not stay relative.
    std::path::absolute(&dir).map_err(|_| ConfigError::TemplateDirNotFound(dir))
}

fn resolve_output_directory(dir: Option<PathBuf>, template_dir: &Path) -> RenderResult<PathBuf> {
    match dir {
        Some(dir) => std::path::absolute(&dir).map_err(|e| RenderError::io(dir, e)),
        None => Ok(template_dir.to_path_buf()),
    }
}

fn resolve_template_name(name: Option<String>) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string())
}

fn resolve_invoice_name(name: Option<String>) -> String {
    let name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| Uuid::now_v7().to_string());
    match name.strip_suffix(".pdf") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}
