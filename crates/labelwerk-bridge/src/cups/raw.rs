// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw channel over `lp -o raw`.

use labelwerk_core::error::{LabelwerkError, Result};
use tracing::debug;

use super::{Lp, job_args};
use crate::traits::{RawPort, RawSession};

/// Opens buffered raw sessions that submit through `lp`.
pub struct CupsRawPort {
    lp: Lp,
}

impl CupsRawPort {
    pub fn new(lp: Lp) -> Self {
        Self { lp }
    }
}

impl RawPort for CupsRawPort {
    fn open(&self, device: &str) -> Result<Box<dyn RawSession>> {
        Ok(Box::new(CupsRawSession {
            lp: self.lp.clone(),
            device: device.to_owned(),
            title: None,
            buffer: Vec::new(),
        }))
    }
}

struct CupsRawSession {
    lp: Lp,
    device: String,
    title: Option<String>,
    buffer: Vec<u8>,
}

impl RawSession for CupsRawSession {
    fn start_job(&mut self, job_name: &str) -> Result<()> {
        self.title = Some(job_name.to_owned());
        self.buffer.clear();
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.title.is_none() {
            return Err(LabelwerkError::Device("write outside of a raw job".into()));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn end_page(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_job(&mut self) -> Result<()> {
        let title = self
            .title
            .take()
            .ok_or_else(|| LabelwerkError::Device("no raw job in progress".into()))?;
        let args = job_args(&self.device, &title, &["-o", "raw"]);
        let result = self.lp.run(&args, Some(&self.buffer));
        self.buffer.clear();
        result
    }

    fn close(&mut self) {
        if !self.buffer.is_empty() {
            debug!(device = %self.device, bytes = self.buffer.len(), "discarding unsent raw job");
        }
        self.title = None;
        self.buffer.clear();
    }
}
