// src/report.rs

//! User-facing `[wyp]` status lines.
//!
//! These go to stdout next to the children's output; diagnostics belong in
//! `tracing` instead.

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use owo_colors::OwoColorize;

use crate::config::ConfigFile;
use crate::watch::ChangeKind;

const TAG: &str = "[wyp]";

/// Print one status line.
pub fn announce(message: impl Display) {
    println!("{TAG} {message}");
}

/// Clock time as `3:04PM`.
pub fn clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%-I:%M%p").to_string()
}

/// Elapsed time in the largest unit that fits.
pub fn ago(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 3600.0 {
        format!("{:.1}h", secs / 3600.0)
    } else if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else if secs >= 1.0 {
        format!("{secs:.1}s")
    } else if elapsed.as_micros() >= 1000 {
        format!("{:.1}ms", elapsed.as_micros() as f64 / 1000.0)
    } else {
        format!("{}µs", elapsed.as_micros())
    }
}

pub fn running_line<Tz: TimeZone>(label: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("Running {} at {}", label.magenta(), clock(at).bold())
}

pub fn watching_line(dir: &str) -> String {
    format!("Watching directory \"{dir}\"")
}

pub fn restarting_line(path: &str, kind: ChangeKind) -> String {
    format!("Restarting from change to {path} ({kind})")
}

pub fn completed_line<Tz: TimeZone>(label: &str, at: &DateTime<Tz>, elapsed: Duration) -> String
where
    Tz::Offset: Display,
{
    format!(
        "Completed {} at {} in {}",
        label,
        clock(at).bold(),
        ago(elapsed).bold()
    )
}

pub fn stopped_line(label: &str) -> String {
    format!("Stopped {label}")
}

/// Visible scripts with their help text, then the root commands.
pub fn listing(cfg: &ConfigFile) -> String {
    let visible: Vec<_> = cfg.visible_scripts().collect();
    if visible.is_empty() {
        return "No scripts configured".to_string();
    }

    let width = visible.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::from("Scripts:\n");
    for (name, script) in visible {
        let help = script.help_text();
        if help.is_empty() {
            out.push_str(&format!("  {name}\n"));
        } else {
            out.push_str(&format!("  {name:<width$}  {help}\n"));
        }
    }

    let roots: Vec<&str> = cfg.root_scripts().map(String::as_str).collect();
    if !roots.is_empty() {
        out.push_str(&format!("\nAlso available as `wyp <name>`: {}\n", roots.join(", ")));
    }

    out
}
