//! Opening folders and URLs with the desktop's default handler.

use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;

#[cfg(target_os = "macos")]
const OPENER: &[&str] = &["open"];
#[cfg(target_os = "windows")]
const OPENER: &[&str] = &["cmd", "/C", "start", ""];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &[&str] = &["xdg-open"];

/// Opens `target` (a path or URL) and waits for the opener to hand it off.
pub async fn open(target: &str) -> anyhow::Result<()> {
    let (program, args) = OPENER.split_first().context("no opener configured")?;
    let status = Command::new(program)
        .args(args)
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .with_context(|| format!("failed to run {program}"))?;

    anyhow::ensure!(status.success(), "{program} {target} exited with {status}");
    tracing::debug!(location = target, "opened");
    Ok(())
}
