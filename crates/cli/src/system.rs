//! Platform adapters for opening chats and writing the clipboard.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::info;

use crib_storefront::checkout::{
    ChannelOutcome, ChannelRequest, Clipboard, ClipboardError, MessageChannel,
};

/// Environment variable that swaps the real channel for [`DryRunChannel`].
pub const DRY_RUN_ENV: &str = "CRIB_CHANNEL_DRY_RUN";

/// Whether chat links should be logged instead of opened.
pub fn dry_run_requested() -> bool {
    let Ok(value) = std::env::var(DRY_RUN_ENV) else {
        return false;
    };
    let value = value.trim().to_ascii_lowercase();
    matches!(value.as_str(), "1" | "true" | "yes")
}

// =============================================================================
// Channels
// =============================================================================

/// Opens chat links with the platform URL opener.
#[derive(Debug, Default)]
pub struct SystemChannel;

impl SystemChannel {
    fn opener(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut command = Command::new("open");
            command.arg(url);
            command
        }
        #[cfg(target_os = "windows")]
        {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", "", url]);
            command
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut command = Command::new("xdg-open");
            command.arg(url);
            command
        }
    }
}

impl MessageChannel for SystemChannel {
    fn open(&mut self, request: &ChannelRequest) -> ChannelOutcome {
        let status = Self::opener(request.url.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => ChannelOutcome::Opened,
            Ok(status) => ChannelOutcome::Unavailable {
                reason: format!("URL opener exited with {status}"),
            },
            Err(e) => ChannelOutcome::Unavailable {
                reason: format!("failed to launch URL opener: {e}"),
            },
        }
    }
}

/// Logs chat links instead of opening them.
#[derive(Debug, Default)]
pub struct DryRunChannel;

impl MessageChannel for DryRunChannel {
    fn open(&mut self, request: &ChannelRequest) -> ChannelOutcome {
        info!(address = %request.address, url = %request.url, "Dry run, not opening chat");
        ChannelOutcome::Opened
    }
}

// =============================================================================
// Clipboard
// =============================================================================

/// Writes the clipboard through the first available system tool.
#[derive(Debug, Default)]
pub struct SystemClipboard;

const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        for (program, args) in CLIPBOARD_TOOLS {
            if pipe_to(program, args, text) {
                return Ok(());
            }
        }
        Err(ClipboardError::Unavailable(
            "no clipboard tool found (tried wl-copy, xclip, pbcopy, clip)".to_string(),
        ))
    }
}

/// Run `program` with `text` on stdin. Returns whether it succeeded.
fn pipe_to(program: &str, args: &[&str], text: &str) -> bool {
    let Ok(mut child) = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        return false;
    };

    let written = child
        .stdin
        .take()
        .is_some_and(|mut stdin| stdin.write_all(text.as_bytes()).is_ok());

    child.wait().is_ok_and(|status| status.success()) && written
}
