use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::PdfConfig;

#[derive(Debug)]
pub enum RenderError {
    Io(std::io::Error),
    Timeout(Duration),
    /// Browser exited unsuccessfully; carries the tail of its stderr.
    Failed(String),
    Empty,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "Browser I/O error: {e}"),
            RenderError::Timeout(d) => write!(f, "Browser did not finish within {}s", d.as_secs()),
            RenderError::Failed(msg) => write!(f, "Browser failed: {msg}"),
            RenderError::Empty => write!(f, "Browser produced an empty PDF"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Io(e)
    }
}

/// HTML in, PDF bytes out.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// Runs one headless Chromium per export. Page size and margins come from
/// the document's `@page` rule.
pub struct ChromiumRenderer {
    config: PdfConfig,
}

impl ChromiumRenderer {
    pub fn new(config: PdfConfig) -> Self {
        ChromiumRenderer { config }
    }

    fn command(&self, input: &std::path::Path, output: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.config.chromium_path);
        cmd.arg("--headless")
            .args(&self.config.launch_args)
            .arg("--disable-gpu")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("notulensi.html");
        let output = dir.path().join("notulensi.pdf");
        tokio::fs::write(&input, html).await?;

        let child = self.command(&input, &output).spawn()?;
        let result = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| RenderError::Timeout(self.config.timeout))??;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let tail: String = stderr.lines().rev().take(5).collect::<Vec<_>>().join(" | ");
            return Err(RenderError::Failed(format!("{} ({tail})", result.status)));
        }

        let pdf = tokio::fs::read(&output).await?;
        if pdf.is_empty() {
            return Err(RenderError::Empty);
        }
        log::debug!("Rendered PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line() {
        let renderer = ChromiumRenderer::new(PdfConfig::default());
        let cmd = renderer.command("/tmp/in.html".as_ref(), "/tmp/out.pdf".as_ref());
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "chromium");
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--headless",
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-gpu",
                "--no-pdf-header-footer",
                "--print-to-pdf=/tmp/out.pdf",
                "file:///tmp/in.html",
            ]
        );
    }

    #[actix_rt::test]
    async fn missing_browser_is_an_io_error() {
        let renderer = ChromiumRenderer::new(PdfConfig {
            chromium_path: "/nonexistent/chromium-for-rapat".into(),
            ..PdfConfig::default()
        });
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
