use crate::error::{CodegenError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Canonicalizes rendered source before it is written.
pub trait SourceFormatter {
    fn format(&self, source: &str) -> Result<String>;
}

/// Whitespace normalization: trailing spaces removed, blank-line runs
/// collapsed, exactly one trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl SourceFormatter for PlainFormatter {
    fn format(&self, source: &str) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut blank_run = 0;
        for line in source.lines().map(str::trim_end) {
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 || out.is_empty() {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            out.push_str(line);
            out.push('\n');
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        Ok(out)
    }
}

/// Pipes the source through an external formatter such as `gofmt`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String> {
        let failed = |e: String| CodegenError::FormatError(format!("{}: {e}", self.program));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
        }

        let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        String::from_utf8(output.stdout).map_err(|e| failed(e.to_string()))
    }
}
