//! Document renderer: turns a validated [`Invoice`] into a typeset PDF.
//!
//! The stages of [`Renderer::run`] are:
//!
//! 1. **Escape**: copy the invoice with every text leaf made markup-safe ([`escape`])
//! 2. **Fill**: render the LaTeX template with the escaped copy ([`template`])
//! 3. **Compile**: run the external compiler twice ([`compiler`])
//! 4. **Verify**: look for the compiler's success marker in each pass
//! 5. **Clean**: remove auxiliary files, keeping only the PDF
//!
//! [`Invoice`]: texinvoice_invoicing::Invoice

pub mod compiler;
pub mod error;
pub mod escape;
pub mod renderer;
pub mod template;

pub use compiler::{CompilerConfig, CompilerOutput};
pub use error::{CompilationError, ConfigError, RenderError, RenderResult};
pub use escape::{escape_markup, escape_value};
pub use renderer::{Renderer, RendererConfig};
