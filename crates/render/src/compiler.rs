//! External LaTeX compiler invocation.
//!
//! The compiler is an opaque collaborator: it is run as a blocking subprocess
//! (no timeout), its output streams are captured, and success is judged only
//! by a marker string in its standard output.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::CompilationError;

/// Compiler used when none is configured.
pub const DEFAULT_PROGRAM: &str = "pdflatex";

/// What pdfTeX prints once the PDF has been written.
pub const DEFAULT_SUCCESS_MARKER: &str = "Output written on";

/// Lines of compiler output kept in error reports.
const TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Executable to run.
    pub program: String,
    /// Arguments placed before the standard flags (e.g. a wrapper script).
    pub args: Vec<String>,
    /// Substring of stdout that signals success.
    pub success_marker: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: Vec::new(),
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_success_marker(mut self, marker: impl Into<String>) -> Self {
        self.success_marker = marker.into();
        self
    }

    /// Command compiling `source` into `output_directory`, run from `working_dir`.
    ///
    /// Batch mode keeps the compiler from waiting on stdin when it hits an
    /// error; synctex output is requested for editor integration.
    pub fn command(&self, source: &Path, output_directory: &Path, working_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-synctex=1")
            .arg("-interaction=nonstopmode")
            .arg("-output-directory")
            .arg(output_directory)
            .arg(source)
            .current_dir(working_dir);
        cmd
    }

    /// Run one compiler pass and capture its output.
    pub fn invoke(
        &self,
        source: &Path,
        output_directory: &Path,
        working_dir: &Path,
    ) -> Result<CompilerOutput, CompilationError> {
        debug!(program = %self.program, source = %source.display(), "running compiler");
        let output = self
            .command(source, output_directory, working_dir)
            .output()
            .map_err(|source| CompilationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        Ok(CompilerOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Fail unless `output` carries the success marker.
    pub fn verify(&self, pass: usize, output: &CompilerOutput) -> Result<(), CompilationError> {
        if output.stdout.contains(&self.success_marker) {
            return Ok(());
        }
        Err(CompilationError::MissingSuccessMarker {
            pass,
            status: output.status,
            stdout_tail: tail(&output.stdout),
            stderr_tail: tail(&output.stderr),
        })
    }
}

/// Captured output of one compiler pass, decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    /// Exit code (`None` when killed by a signal).
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

fn tail(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str) -> CompilerOutput {
        CompilerOutput {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn command_line_layout() {
        let config = CompilerConfig::default().with_args(["--wrapped"]);
        let cmd = config.command(Path::new("/out/inv.tex"), Path::new("/out"), Path::new("/tpl"));

        assert_eq!(cmd.get_program(), "pdflatex");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--wrapped",
                "-synctex=1",
                "-interaction=nonstopmode",
                "-output-directory",
                "/out",
                "/out/inv.tex",
            ]
        );
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/tpl")));
    }

    #[test]
    fn verify_looks_for_marker() {
        let config = CompilerConfig::default();
        assert!(config
            .verify(1, &output("...\nOutput written on /out/inv.pdf (1 page, 2048 bytes).\n"))
            .is_ok());

        let err = config.verify(2, &output("! Undefined control sequence.")).unwrap_err();
        match err {
            CompilationError::MissingSuccessMarker { pass, stdout_tail, .. } => {
                assert_eq!(pass, 2);
                assert!(stdout_tail.contains("Undefined control sequence"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_marker() {
        let config = CompilerConfig::default().with_success_marker("done");
        assert!(config.verify(1, &output("all done")).is_ok());
        assert!(config.verify(1, &output("Output written on x.pdf")).is_err());
    }

    #[test]
    fn tail_keeps_last_lines() {
        let text: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let kept = tail(&text);
        assert_eq!(kept.lines().count(), TAIL_LINES);
        assert!(kept.ends_with("line 49"));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let config = CompilerConfig::default().with_program("texinvoice-no-such-compiler");
        let dir = std::env::temp_dir();
        let err = config
            .invoke(&dir.join("x.tex"), &dir, &dir)
            .unwrap_err();
        assert!(matches!(err, CompilationError::Spawn { .. }));
    }
}
