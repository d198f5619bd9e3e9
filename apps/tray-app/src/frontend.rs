//! Headless tray frontend.
//!
//! Stands in for a GUI tray: rendered menus and notifications are logged,
//! and menu actions are read from stdin as line commands
//! (`toggle`, `drives`, `setup-fuse`, `login`, `help`, `quit`).

use std::io::BufRead;
use std::sync::mpsc;

use hyperdaemon_tray::{MenuAction, MenuItem, TrayEvent, TrayUpdate};
use tracing::{debug, info, warn};

/// Starts the frontend threads.
pub fn spawn(updates: mpsc::Receiver<TrayUpdate>, events: mpsc::Sender<TrayEvent>) {
    std::thread::spawn(move || render_loop(updates));
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        command_loop(stdin.lock(), &events);
    });
}

fn render_loop(updates: mpsc::Receiver<TrayUpdate>) {
    let mut last: Option<String> = None;
    for update in updates {
        match update {
            TrayUpdate::Render { icon, items, .. } => {
                let menu = describe(&items);
                if last.as_deref() != Some(menu.as_str()) {
                    info!(icon = %icon.display(), menu = %menu, "tray updated");
                    last = Some(menu);
                }
            }
            TrayUpdate::Notify(n) => info!(title = %n.title, body = %n.body, "notification"),
            TrayUpdate::Shutdown => break,
        }
    }
    debug!("tray frontend stopped");
}

fn command_loop(input: impl BufRead, events: &mpsc::Sender<TrayEvent>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<MenuAction>() {
            Ok(action) => {
                if events.send(TrayEvent::Action(action)).is_err() {
                    break;
                }
            }
            Err(e) => warn!("{e}"),
        }
    }
}

/// One-line rendering of a menu: clickable items in brackets, separators as `|`.
fn describe(items: &[MenuItem]) -> String {
    items
        .iter()
        .map(|item| {
            if item.is_separator() {
                "|".to_string()
            } else if let Some(checked) = item.checked {
                format!("[{}{}]", if checked { "x " } else { "  " }, item.label)
            } else if item.enabled {
                format!("[{}]", item.label)
            } else {
                item.label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
