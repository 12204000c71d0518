// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording fakes for the bridge traits and the page renderer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};
use labelwerk_bridge::{Bridge, DeviceContext, GraphicsPort, RawPort, RawSession, ShellVerbs};
use labelwerk_core::config::ServiceConfig;
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{DeviceMetrics, DrawRect, RasterPage};
use labelwerk_document::raster::PageSink;
use labelwerk_document::{PageRenderer, PdfInfo};

use crate::dispatch::Dispatcher;
use crate::fallback::FallbackChain;

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, event: impl Into<String>) {
    log.lock().unwrap().push(event.into());
}

// ---------------------------------------------------------------------------
// Raw channel
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingRawPort {
    /// Accept at most this many bytes per write.
    pub accept_limit: Option<usize>,
    pub fail_open: bool,
    /// Block each write this long, as a slow device would.
    pub write_delay: Option<Duration>,
    pub(crate) opened: Mutex<Vec<String>>,
    pub(crate) events: Log,
    pub(crate) written: Arc<Mutex<Vec<u8>>>,
    pub(crate) sessions: Arc<SessionCount>,
}

/// Open sessions now, and the most ever open at once.
#[derive(Default)]
pub struct SessionCount {
    open: AtomicUsize,
    max: AtomicUsize,
}

impl SessionCount {
    fn enter(&self) {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RecordingRawPort {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub fn max_open_sessions(&self) -> usize {
        self.sessions.max.load(Ordering::SeqCst)
    }
}

impl RawPort for RecordingRawPort {
    fn open(&self, device: &str) -> Result<Box<dyn RawSession>> {
        self.opened.lock().unwrap().push(device.to_owned());
        if self.fail_open {
            return Err(LabelwerkError::Device(format!("{device} is offline")));
        }
        self.sessions.enter();
        Ok(Box::new(RecordingRawSession {
            accept_limit: self.accept_limit,
            write_delay: self.write_delay,
            events: Arc::clone(&self.events),
            written: Arc::clone(&self.written),
            sessions: Arc::clone(&self.sessions),
        }))
    }
}

struct RecordingRawSession {
    accept_limit: Option<usize>,
    write_delay: Option<Duration>,
    events: Log,
    written: Arc<Mutex<Vec<u8>>>,
    sessions: Arc<SessionCount>,
}

impl RawSession for RecordingRawSession {
    fn start_job(&mut self, job_name: &str) -> Result<()> {
        push(&self.events, format!("start_job:{job_name}"));
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        push(&self.events, "start_page");
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        push(&self.events, "write");
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        let accepted = self.accept_limit.map_or(bytes.len(), |n| n.min(bytes.len()));
        self.written
            .lock()
            .unwrap()
            .extend_from_slice(&bytes[..accepted]);
        Ok(accepted)
    }

    fn end_page(&mut self) -> Result<()> {
        push(&self.events, "end_page");
        Ok(())
    }

    fn end_job(&mut self) -> Result<()> {
        push(&self.events, "end_job");
        Ok(())
    }

    fn close(&mut self) {
        push(&self.events, "close");
        self.sessions.leave();
    }
}

// ---------------------------------------------------------------------------
// Graphics path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub page_width: u32,
    pub page_height: u32,
    pub rect: DrawRect,
}

pub struct RecordingGraphicsPort {
    pub metrics: DeviceMetrics,
    pub fail_draw: bool,
    pub(crate) events: Log,
    pub(crate) draws: Arc<Mutex<Vec<Draw>>>,
}

impl RecordingGraphicsPort {
    pub fn new(printable_width: u32, printable_height: u32) -> Self {
        Self {
            metrics: DeviceMetrics {
                printable_width,
                printable_height,
                physical_width: printable_width + 16,
                physical_height: printable_height + 16,
            },
            fail_draw: false,
            events: Log::default(),
            draws: Arc::default(),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn draws(&self) -> Vec<Draw> {
        self.draws.lock().unwrap().clone()
    }
}

impl GraphicsPort for RecordingGraphicsPort {
    fn create_dc(&self, device: &str) -> Result<Box<dyn DeviceContext>> {
        push(&self.events, format!("create_dc:{device}"));
        Ok(Box::new(RecordingContext {
            metrics: self.metrics,
            fail_draw: self.fail_draw,
            events: Arc::clone(&self.events),
            draws: Arc::clone(&self.draws),
        }))
    }
}

struct RecordingContext {
    metrics: DeviceMetrics,
    fail_draw: bool,
    events: Log,
    draws: Arc<Mutex<Vec<Draw>>>,
}

impl DeviceContext for RecordingContext {
    fn metrics(&self) -> Result<DeviceMetrics> {
        Ok(self.metrics)
    }

    fn start_doc(&mut self, doc_name: &str) -> Result<()> {
        push(&self.events, format!("start_doc:{doc_name}"));
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        push(&self.events, "start_page");
        Ok(())
    }

    fn draw_page(&mut self, page: &RasterPage, rect: DrawRect) -> Result<()> {
        push(&self.events, "draw");
        if self.fail_draw {
            return Err(LabelwerkError::Device("StretchDIBits failed".into()));
        }
        self.draws.lock().unwrap().push(Draw {
            page_width: page.width_px(),
            page_height: page.height_px(),
            rect,
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        push(&self.events, "end_page");
        Ok(())
    }

    fn end_doc(&mut self) -> Result<()> {
        push(&self.events, "end_doc");
        Ok(())
    }

    fn release(&mut self) {
        push(&self.events, "release");
    }
}

// ---------------------------------------------------------------------------
// Shell verbs
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingShell {
    pub fail: bool,
    pub(crate) calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingShell {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    fn record(&self, call: String, file: &Path) -> Result<()> {
        self.calls.lock().unwrap().push((call.clone(), file.to_path_buf()));
        if self.fail {
            return Err(LabelwerkError::Device(format!("{call}: no application associated")));
        }
        Ok(())
    }
}

impl ShellVerbs for RecordingShell {
    fn print_to(&self, file: &Path, device: &str) -> Result<()> {
        self.record(format!("printto:{device}"), file)
    }

    fn print_default(&self, file: &Path) -> Result<()> {
        self.record("print".into(), file)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Emits one small white bitmap per page, counting pages with `lopdf`.
#[derive(Default)]
pub struct BlankRenderer {
    pub fail: bool,
    pub(crate) paths: Mutex<Vec<PathBuf>>,
    pub(crate) rendered: Mutex<usize>,
}

impl BlankRenderer {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }

    pub fn rendered_pages(&self) -> usize {
        *self.rendered.lock().unwrap()
    }
}

impl PageRenderer for BlankRenderer {
    fn render_pages(&self, pdf: &Path, dpi: u32, sink: &mut PageSink<'_>) -> Result<usize> {
        self.paths.lock().unwrap().push(pdf.to_path_buf());
        if self.fail {
            return Err(LabelwerkError::Raster("PDFium unavailable".into()));
        }
        let pages = PdfInfo::from_path(pdf)?.page_count;
        // A 4x6in label at 1/32 of the requested resolution.
        let (width, height) = ((dpi / 8).max(1), (dpi * 3 / 16).max(1));
        for index in 0..pages {
            sink(index, RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))?;
            *self.rendered.lock().unwrap() += 1;
        }
        Ok(pages)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Default service config wired to recording fakes, with no settle delay and
/// no PDF reader installed.
pub struct Harness {
    pub config: ServiceConfig,
    pub raw: Arc<RecordingRawPort>,
    pub graphics: Arc<RecordingGraphicsPort>,
    pub shell: Arc<RecordingShell>,
    pub renderer: Arc<BlankRenderer>,
}

impl Harness {
    pub fn new() -> Self {
        let mut config = ServiceConfig::default();
        config.fallback.settle_delay_ms = 0;
        config.fallback.reader_path = PathBuf::from("/nonexistent/labelwerk/reader");

        let media = &config.target.media;
        let graphics = RecordingGraphicsPort::new(media.printable_width_px, media.printable_height_px);

        Self {
            config,
            raw: Arc::default(),
            graphics: Arc::new(graphics),
            shell: Arc::default(),
            renderer: Arc::default(),
        }
    }

    /// Every PDF strategy fails: rendering errors and the shell verbs refuse.
    pub fn failing() -> Self {
        Self {
            shell: Arc::new(RecordingShell {
                fail: true,
                ..RecordingShell::default()
            }),
            renderer: Arc::new(BlankRenderer {
                fail: true,
                ..BlankRenderer::default()
            }),
            ..Self::new()
        }
    }

    pub fn bridge(&self) -> Bridge {
        Bridge {
            raw: self.raw.clone(),
            graphics: self.graphics.clone(),
            shell: self.shell.clone(),
        }
    }

    pub fn chain(&self) -> FallbackChain {
        FallbackChain::from_config(&self.config, &self.bridge(), self.renderer.clone())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::build(&self.config, &self.bridge(), self.renderer.clone())
    }
}
