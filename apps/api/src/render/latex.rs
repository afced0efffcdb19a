//! pdflatex runner. Each compile gets a throwaway directory; runs are serialized
//! because the engine is heavy and its aux files are not shared.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::render::{CompileOutput, TypesetCompiler};

pub struct LatexCompiler {
    command: String,
    timeout: Duration,
    in_flight: Mutex<()>,
}

impl LatexCompiler {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
            in_flight: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TypesetCompiler for LatexCompiler {
    async fn compile(&self, source: &str, main_file: &str) -> Result<CompileOutput, AppError> {
        let _guard = self.in_flight.lock().await;

        let workdir = tempfile::tempdir().context("failed to create compile directory")?;
        tokio::fs::write(workdir.path().join(main_file), source)
            .await
            .context("failed to write LaTeX source")?;

        let mut command = Command::new(&self.command);
        command
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(main_file)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("Running {} on {main_file}", self.command);
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Could not start {}: {e}", self.command);
                return Ok(CompileOutput::failed(format!(
                    "failed to start {}: {e}",
                    self.command
                )));
            }
            Err(_) => {
                warn!("{} timed out after {:?}", self.command, self.timeout);
                return Ok(CompileOutput::failed(format!(
                    "{} timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                )));
            }
        };

        let stem = Path::new(main_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("main");

        // The engine's .log is the useful one; console output is the fallback.
        let log = match tokio::fs::read(workdir.path().join(format!("{stem}.log"))).await {
            Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
            Err(_) => format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ),
        };
        let pdf = tokio::fs::read(workdir.path().join(format!("{stem}.pdf")))
            .await
            .ok()
            .map(Bytes::from);

        let status = output.status.code().unwrap_or(-1);
        info!(
            "Compilation status: {status} ({} bytes of PDF)",
            pdf.as_ref().map_or(0, |p| p.len())
        );

        Ok(CompileOutput { status, log, pdf })
    }
}
