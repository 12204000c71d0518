// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shell print verbs via `ShellExecuteW`.
//
// Both verbs are fire-and-forget: a return value above 32 only means the
// associated application was launched, not that anything printed.

use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::SW_HIDE;
use windows::core::{HSTRING, PCWSTR};

use crate::traits::ShellVerbs;

pub struct ShellExecuteVerbs;

fn shell_execute(verb: &str, file: &Path, parameters: Option<&str>) -> Result<()> {
    let verb_w = HSTRING::from(verb);
    let file_w = HSTRING::from(file.as_os_str());
    let params_w = parameters.map(HSTRING::from);
    let params = params_w
        .as_ref()
        .map_or(PCWSTR::null(), |p| PCWSTR(p.as_ptr()));

    // SAFETY: every string argument is a live NUL-terminated HSTRING or null.
    let instance = unsafe {
        ShellExecuteW(None, &verb_w, &file_w, params, PCWSTR::null(), SW_HIDE)
    };
    let code = instance.0 as isize;
    if code <= 32 {
        return Err(LabelwerkError::Device(format!(
            "ShellExecuteW({verb}) on {} failed with code {code}",
            file.display()
        )));
    }
    Ok(())
}

impl ShellVerbs for ShellExecuteVerbs {
    fn print_to(&self, file: &Path, device: &str) -> Result<()> {
        let quoted = format!("\"{device}\"");
        shell_execute("printto", file, Some(&quoted))
    }

    fn print_default(&self, file: &Path) -> Result<()> {
        shell_execute("print", file, None)
    }
}
