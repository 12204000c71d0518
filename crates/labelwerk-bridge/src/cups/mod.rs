// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS bridge — every capability is an invocation of the `lp` client.
//
// The raw channel buffers the job and pipes it to `lp -o raw` when the job
// ends. The graphics context composites each page onto a white canvas of the
// configured media size and pipes it as PNG. The shell verbs hand the file
// path to `lp` directly and let the CUPS filters render the PDF.

mod graphics;
mod raw;

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use labelwerk_core::error::{LabelwerkError, Result};
use tracing::debug;

pub use graphics::CupsGraphicsPort;
pub use raw::CupsRawPort;

use crate::traits::ShellVerbs;

/// Handle on the `lp` executable.
#[derive(Debug, Clone)]
pub struct Lp {
    program: PathBuf,
}

impl Default for Lp {
    fn default() -> Self {
        Self {
            program: PathBuf::from("lp"),
        }
    }
}

impl Lp {
    /// Use a different `lp`-compatible executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `lp` with `args`, piping `stdin` to it when given, and wait.
    ///
    /// A spawn failure, a non-zero exit or a broken stdin pipe is a
    /// `Device` error carrying whatever `lp` wrote to stderr.
    pub fn run(&self, args: &[OsString], stdin: Option<&[u8]>) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn().map_err(|e| {
            LabelwerkError::Device(format!("failed to start {}: {e}", self.program.display()))
        })?;

        let mut pipe_error = None;
        if let (Some(payload), Some(mut pipe)) = (stdin, child.stdin.take()) {
            if let Err(e) = pipe.write_all(payload).and_then(|()| pipe.flush()) {
                pipe_error = Some(e);
            }
        }

        let output = child.wait_with_output().map_err(|e| {
            LabelwerkError::Device(format!("{} did not finish: {e}", self.program.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LabelwerkError::Device(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        if let Some(e) = pipe_error {
            return Err(LabelwerkError::Device(format!(
                "failed to pipe job to {}: {e}",
                self.program.display()
            )));
        }

        debug!(program = %self.program.display(), ?args, "lp job submitted");
        Ok(())
    }
}

/// `-d <device> -t <title>` plus any extra options.
fn job_args(device: &str, title: &str, extra: &[&str]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-d".into(),
        device.into(),
        "-t".into(),
        title.into(),
    ];
    args.extend(extra.iter().map(OsString::from));
    args
}

/// Shell print verbs mapped onto `lp <file>`.
pub struct CupsVerbs {
    lp: Lp,
}

impl CupsVerbs {
    pub fn new(lp: Lp) -> Self {
        Self { lp }
    }
}

impl ShellVerbs for CupsVerbs {
    fn print_to(&self, file: &Path, device: &str) -> Result<()> {
        let args: Vec<OsString> = vec!["-d".into(), device.into(), file.as_os_str().to_owned()];
        self.lp.run(&args, None)
    }

    fn print_default(&self, file: &Path) -> Result<()> {
        self.lp.run(&[file.as_os_str().to_owned()], None)
    }
}
