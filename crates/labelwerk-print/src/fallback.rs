// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF print fallback chain.
//
// Tries each strategy in order and stops at the first success. Failures are
// logged and swallowed; only when every strategy has failed does the chain
// return an error, wrapping the last cause.
//
// Standard chain: graphics (rasterise + device context) → printto verb →
// PDF reader silent print → default print verb.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use labelwerk_bridge::{Bridge, ShellVerbs};
use labelwerk_core::config::{FallbackSettings, ServiceConfig};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_document::{PageRenderer, PdfRasterizer};
use tracing::{debug, info, warn};

use crate::graphics::GraphicsPrinter;

/// One way of getting a PDF file onto paper.
pub trait FallbackStrategy: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Try to print `pdf`. Each call is independent of any other attempt.
    fn attempt(&self, pdf: &Path) -> Result<()>;
}

/// Rasterise every page, then print each one through the graphics path.
pub struct RasterStrategy {
    rasterizer: PdfRasterizer,
    printer: GraphicsPrinter,
}

impl RasterStrategy {
    pub fn new(rasterizer: PdfRasterizer, printer: GraphicsPrinter) -> Self {
        Self {
            rasterizer,
            printer,
        }
    }
}

impl FallbackStrategy for RasterStrategy {
    fn name(&self) -> &'static str {
        "graphics"
    }

    fn attempt(&self, pdf: &Path) -> Result<()> {
        let pages = self.rasterizer.rasterize(pdf)?;
        if pages.is_empty() {
            return Err(LabelwerkError::Raster("document has no pages".into()));
        }
        for page in &pages {
            self.printer.print_page(page)?;
        }
        Ok(())
    }
}

/// The shell `printto` verb, then a fixed settle delay.
///
/// The verb only launches the associated application; the delay gives it
/// time to open the file before the caller deletes it.
pub struct PrintToStrategy {
    shell: Arc<dyn ShellVerbs>,
    device: String,
    settle: Duration,
}

impl PrintToStrategy {
    pub fn new(shell: Arc<dyn ShellVerbs>, device: impl Into<String>, settle: Duration) -> Self {
        Self {
            shell,
            device: device.into(),
            settle,
        }
    }
}

impl FallbackStrategy for PrintToStrategy {
    fn name(&self) -> &'static str {
        "print-to"
    }

    fn attempt(&self, pdf: &Path) -> Result<()> {
        self.shell.print_to(pdf, &self.device)?;
        if !self.settle.is_zero() {
            debug!(settle_ms = self.settle.as_millis() as u64, "waiting for printto handler");
            std::thread::sleep(self.settle);
        }
        Ok(())
    }
}

/// Silent print through an installed PDF reader, e.g. `AcroRd32.exe /t`.
pub struct ReaderStrategy {
    reader: PathBuf,
    args: Vec<String>,
    device: String,
}

impl ReaderStrategy {
    pub fn new(reader: impl Into<PathBuf>, args: Vec<String>, device: impl Into<String>) -> Self {
        Self {
            reader: reader.into(),
            args,
            device: device.into(),
        }
    }

    /// Substitute `{file}` and `{device}` in the argument template.
    fn expand_args(&self, pdf: &Path) -> Vec<String> {
        let file = pdf.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{file}", &file).replace("{device}", &self.device))
            .collect()
    }

    fn failure(&self, reason: String) -> LabelwerkError {
        LabelwerkError::Strategy {
            strategy: self.name().into(),
            reason,
        }
    }
}

impl FallbackStrategy for ReaderStrategy {
    fn name(&self) -> &'static str {
        "reader"
    }

    fn attempt(&self, pdf: &Path) -> Result<()> {
        if !self.reader.is_file() {
            return Err(self.failure(format!("not installed at {}", self.reader.display())));
        }

        let status = Command::new(&self.reader)
            .args(self.expand_args(pdf))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.failure(format!("failed to start {}: {e}", self.reader.display())))?;

        if !status.success() {
            return Err(self.failure(format!("{} exited with {status}", self.reader.display())));
        }
        Ok(())
    }
}

/// The shell `print` verb: whatever the desktop associates with PDFs, on
/// the default printer.
pub struct DefaultPrintStrategy {
    shell: Arc<dyn ShellVerbs>,
}

impl DefaultPrintStrategy {
    pub fn new(shell: Arc<dyn ShellVerbs>) -> Self {
        Self { shell }
    }
}

impl FallbackStrategy for DefaultPrintStrategy {
    fn name(&self) -> &'static str {
        "default-print"
    }

    fn attempt(&self, pdf: &Path) -> Result<()> {
        self.shell.print_default(pdf)
    }
}

/// Ordered list of strategies, tried until one succeeds.
pub struct FallbackChain {
    steps: Vec<Box<dyn FallbackStrategy>>,
}

impl FallbackChain {
    pub fn new(steps: Vec<Box<dyn FallbackStrategy>>) -> Self {
        Self { steps }
    }

    /// The four-step chain for `device`.
    pub fn standard(
        rasterizer: PdfRasterizer,
        graphics: GraphicsPrinter,
        shell: Arc<dyn ShellVerbs>,
        device: &str,
        settings: &FallbackSettings,
    ) -> Self {
        Self::new(vec![
            Box::new(RasterStrategy::new(rasterizer, graphics)),
            Box::new(PrintToStrategy::new(
                Arc::clone(&shell),
                device,
                Duration::from_millis(settings.settle_delay_ms),
            )),
            Box::new(ReaderStrategy::new(
                settings.reader_path.clone(),
                settings.reader_args.clone(),
                device,
            )),
            Box::new(DefaultPrintStrategy::new(shell)),
        ])
    }

    /// The standard chain wired from service config and the platform bridge.
    pub fn from_config(
        config: &ServiceConfig,
        bridge: &Bridge,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        let device = config.target.device_name.as_str();
        Self::standard(
            PdfRasterizer::new(renderer, config.raster),
            GraphicsPrinter::new(Arc::clone(&bridge.graphics), device),
            Arc::clone(&bridge.shell),
            device,
            &config.fallback,
        )
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Print `pdf` with the first strategy that works.
    ///
    /// A missing file is an `Io(NotFound)` error and no strategy runs.
    pub fn run(&self, pdf: &Path) -> Result<()> {
        std::fs::metadata(pdf)?;

        let mut last_error = None;
        for step in &self.steps {
            debug!(strategy = step.name(), "trying print strategy");
            match step.attempt(pdf) {
                Ok(()) => {
                    info!(strategy = step.name(), "PDF printed");
                    return Ok(());
                }
                Err(e) => {
                    warn!(strategy = step.name(), error = %e, "print strategy failed");
                    last_error = Some(e);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| LabelwerkError::Strategy {
            strategy: "chain".into(),
            reason: "no print strategies configured".into(),
        });
        Err(LabelwerkError::ExhaustedFallback {
            attempts: self.steps.len(),
            source: Box::new(source),
        })
    }
}
