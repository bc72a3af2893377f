//! Clipboard access for the copy actions.
//!
//! Copies are best-effort: try the native clipboard first, then hand the text
//! to a platform clipboard command. Nothing here reports an error to the
//! caller; failures are logged and swallowed.

use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Which mechanism ended up holding the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Native,
    Command(&'static str),
}

pub type ClipboardCommand = (&'static str, &'static [&'static str]);

/// Platform clipboard commands, tried in order when the native path fails.
#[cfg(target_os = "macos")]
pub const FALLBACK_COMMANDS: &[ClipboardCommand] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
pub const FALLBACK_COMMANDS: &[ClipboardCommand] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const FALLBACK_COMMANDS: &[ClipboardCommand] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

fn copy_native(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_owned())
}

fn copy_with_command(program: &str, args: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    // Reap the child even when the write fails.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{} exited with {}", program, status)))
    }
}

/// Copy `text`, returning which path worked, or `None` if none did.
pub fn copy_text(text: &str) -> Option<CopyPath> {
    match copy_native(text) {
        Ok(()) => return Some(CopyPath::Native),
        Err(err) => debug!(error = %err, "native clipboard unavailable, trying commands"),
    }

    for &(program, args) in FALLBACK_COMMANDS {
        match copy_with_command(program, args, text) {
            Ok(()) => return Some(CopyPath::Command(program)),
            Err(err) => debug!(program, error = %err, "clipboard command failed"),
        }
    }
    None
}
