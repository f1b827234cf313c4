//! AsciiDoc command-line renderer.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::{RenderError, RenderRequest, Renderer};

/// Program run when none is configured.
pub const DEFAULT_PROGRAM: &str = "asciidoc";

/// Runs an AsciiDoc-compatible program (`asciidoc`, `asciidoctor`).
///
/// The command line is
///
/// ```text
/// {program} {args...} --backend {backend} [--attribute {name=value}]... {options...} --out-file {destination} -
/// ```
///
/// with the assembled text written to the program's standard input. The
/// program runs in the current directory so relative paths in the document
/// resolve against the caller's location.
#[derive(Debug, Clone)]
pub struct AsciiDocCommand {
    program: String,
    args: Vec<String>,
}

impl AsciiDocCommand {
    /// Create a renderer running `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the generated ones (e.g. a script path for an
    /// interpreter).
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command(&self, destination: &Path, request: &RenderRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.arg("--backend").arg(request.backend);
        for attribute in request.attributes {
            cmd.arg("--attribute").arg(attribute.to_string());
        }
        cmd.args(request.options);
        cmd.arg("--out-file").arg(destination).arg("-");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Default for AsciiDocCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Renderer for AsciiDocCommand {
    fn render(
        &self,
        input: &str,
        destination: &Path,
        request: &RenderRequest<'_>,
    ) -> Result<(), RenderError> {
        let mut child = self
            .command(destination, request)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(program = %self.program, backend = request.backend, "renderer started");

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("renderer stdin not captured"))?;

        // Feed stdin from a separate thread so a renderer filling its stderr
        // pipe before reading all input cannot deadlock us.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("renderer stdin writer panicked")));
            (output, written)
        });
        let output = output?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        if let Err(e) = written
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }

        if !output.stderr.is_empty() {
            tracing::warn!(
                program = %self.program,
                "{}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::Attribute;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    /// Shell renderer that writes its arguments, then its input, to `--out-file`.
    const ECHO_SCRIPT: &str = r#"out=
args=
while [ $# -gt 0 ]; do
  case "$1" in
    --out-file) out=$2; shift 2 ;;
    *) args="$args[$1]"; shift ;;
  esac
done
{ printf '%s\n' "$args"; cat; } > "$out""#;

    fn shell(script: &str) -> AsciiDocCommand {
        AsciiDocCommand::new("sh").with_args(vec!["-c".to_owned(), script.to_owned(), "sh".to_owned()])
    }

    #[test]
    fn test_command_line_and_input() {
        let tmp = TempDir::new().unwrap();
        let destination = tmp.path().join("out.html");
        let attributes = vec![Attribute::parse("toc"), Attribute::parse("icons=font")];
        let options = vec!["--no-header-footer".to_owned()];
        let request = RenderRequest {
            backend: "html",
            attributes: &attributes,
            options: &options,
        };

        shell(ECHO_SCRIPT)
            .render("= Title\n", &destination, &request)
            .unwrap();

        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            "[--backend][html][--attribute][toc][--attribute][icons=font][--no-header-footer][-]\n= Title\n"
        );
    }

    #[test]
    fn test_large_input_does_not_deadlock() {
        let tmp = TempDir::new().unwrap();
        let destination = tmp.path().join("out");
        let input = "line of text\n".repeat(100_000);
        let request = RenderRequest {
            backend: "html",
            attributes: &[],
            options: &[],
        };

        shell(ECHO_SCRIPT)
            .render(&input, &destination, &request)
            .unwrap();

        let written = fs::read_to_string(&destination).unwrap();
        assert!(written.ends_with(&input));
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let tmp = TempDir::new().unwrap();
        let request = RenderRequest {
            backend: "html",
            attributes: &[],
            options: &[],
        };

        let err = shell("echo 'boom' >&2; exit 3")
            .render("text", &tmp.path().join("out"), &request)
            .unwrap_err();

        match err {
            RenderError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let request = RenderRequest {
            backend: "html",
            attributes: &[],
            options: &[],
        };

        let err = AsciiDocCommand::new("/nonexistent/srcdoc-test-renderer")
            .render("text", &tmp.path().join("out"), &request)
            .unwrap_err();

        assert!(matches!(err, RenderError::Spawn { .. }));
    }
}
