use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Diagram source file.
    pub input: &'a Path,
    /// Image to produce. The renderer picks the format from its extension.
    pub output: &'a Path,
    /// Puppeteer config for the headless browser, if any.
    pub config: Option<&'a Path>,
    pub background: &'a str,
}

/// Turns one diagram source file into one image. Calls block until the image is written.
pub trait Renderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<()>;
}

/// Runs `@mermaid-js/mermaid-cli` (`mmdc`) as a child process.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    program: PathBuf,
    leading_args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::npx()
    }
}

impl MermaidCli {
    /// `npx -y @mermaid-js/mermaid-cli`, fetching the CLI on first use.
    pub fn npx() -> Self {
        Self {
            program: PathBuf::from("npx"),
            leading_args: vec!["-y".into(), "@mermaid-js/mermaid-cli".into()],
            current_dir: None,
        }
    }

    /// Any program that accepts `mmdc` arguments (e.g. `node_modules/.bin/mmdc`).
    pub fn program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    pub fn command(&self, request: &RenderRequest<'_>) -> Command {
        let mut cmd = self.base_command();
        cmd.args(&self.leading_args);
        if let Some(config) = request.config {
            cmd.arg("-p").arg(config);
        }
        cmd.arg("-i")
            .arg(request.input)
            .arg("-o")
            .arg(request.output)
            .arg("-b")
            .arg(request.background);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn base_command(&self) -> Command {
        if !cfg!(windows) {
            return Command::new(&self.program);
        }
        // npm installs `.cmd` shims on Windows; they only run through the command interpreter.
        let is_shim = self
            .program
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("cmd") || ext.eq_ignore_ascii_case("bat"));
        if is_shim || self.program.as_os_str() == "npx" {
            let mut cmd = Command::new("cmd.exe");
            cmd.arg("/c").arg(&self.program);
            cmd
        } else {
            Command::new(&self.program)
        }
    }
}

impl Renderer for MermaidCli {
    fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
        let mut cmd = self.command(request);
        tracing::debug!(?cmd, "spawning renderer");
        let status = cmd.status().map_err(|source| Error::SpawnRenderer {
            program: self.program_name(),
            source,
        })?;
        if !status.success() {
            return Err(Error::RendererFailed {
                program: self.program_name(),
                input: request.input.display().to_string(),
                status,
            });
        }
        Ok(())
    }
}
