use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for a review run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        working_dir: PathBuf,
        ignore_patterns: Vec<String>,
    },
    ComparisonResolved {
        current: String,
        base: String,
        merge_base: String,
        base_is_fallback: bool,
        files_changed: usize,
    },
    FileIgnored {
        path: String,
    },
    FileFailed {
        path: Option<String>,
        error: String,
    },
    DocumentBuilt {
        files: usize,
        ignored: usize,
        errors: usize,
        chars: usize,
    },
    ReviewRequested {
        model: String,
        chars: usize,
    },
    ReviewCompleted {
        model: String,
        duration_secs: f64,
        review_chars: usize,
    },
    NothingToReview {
        reason: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Comparison line printed before the review, e.g.
/// `Comparing feature/x against origin/main from branch point 1a2b3c4`
pub fn comparison_summary(current: &str, base: &str, merge_base: &str) -> String {
    let short = merge_base.get(..7).unwrap_or(merge_base);
    format!(
        "Comparing {} against {} from branch point {}",
        current, base, short
    )
}

/// Logger for review events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted { .. } => {
                // Nothing to show until the comparison is known
            }
            LogEvent::ComparisonResolved {
                current,
                base,
                merge_base,
                base_is_fallback,
                files_changed,
            } => {
                if *base_is_fallback {
                    let _ = writeln!(
                        stderr,
                        "{} No upstream for {}, comparing against {}",
                        "⚠".bright_yellow(),
                        current,
                        base.bright_yellow()
                    );
                }
                let _ = writeln!(
                    std::io::stdout(),
                    "{}",
                    comparison_summary(current, base, merge_base)
                );
                let _ = writeln!(
                    stderr,
                    "  {} {} {} changed",
                    "📁".dimmed(),
                    files_changed,
                    if *files_changed == 1 { "file" } else { "files" }
                );
            }
            LogEvent::FileIgnored { path } => {
                let _ = writeln!(stderr, "  {} {}", "–".dimmed(), path.dimmed());
            }
            LogEvent::FileFailed { path, error } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}: {}",
                    "✗".bright_red(),
                    path.as_deref().unwrap_or("<unknown>"),
                    error.bright_red()
                );
            }
            LogEvent::DocumentBuilt {
                files,
                ignored,
                errors,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} in document, {} ignored, {} with errors",
                    "✓".bright_green(),
                    files,
                    if *files == 1 { "file" } else { "files" },
                    ignored,
                    errors
                );
            }
            LogEvent::ReviewRequested { model, chars } => {
                let _ = writeln!(
                    stderr,
                    "  {} Sending {} characters to {}",
                    "▶".bright_cyan(),
                    chars,
                    model.bright_cyan().bold()
                );
            }
            LogEvent::ReviewCompleted { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Done ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
                let _ = writeln!(stderr);
            }
            LogEvent::NothingToReview { .. } => {
                // The command prints its own message for these
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted { working_dir, .. } => {
                format!("[{}] run:start {}", timestamp, working_dir.display())
            }
            LogEvent::ComparisonResolved {
                current,
                base,
                merge_base,
                files_changed,
                ..
            } => format!(
                "[{}] {} ({}f)",
                timestamp,
                comparison_summary(current, base, merge_base),
                files_changed
            ),
            LogEvent::FileIgnored { path } => format!("[{}] file:ignored {}", timestamp, path),
            LogEvent::FileFailed { path, error } => format!(
                "[{}] file:error {}: {}",
                timestamp,
                path.as_deref().unwrap_or("<unknown>"),
                error
            ),
            LogEvent::DocumentBuilt {
                files,
                ignored,
                errors,
                chars,
            } => format!(
                "[{}] document {}f {}i {}e {}c",
                timestamp, files, ignored, errors, chars
            ),
            LogEvent::ReviewRequested { model, chars } => {
                format!("[{}] review:start {} {}c", timestamp, model, chars)
            }
            LogEvent::ReviewCompleted {
                model,
                duration_secs,
                ..
            } => format!(
                "[{}] review:done {} {:.1}s",
                timestamp, model, duration_secs
            ),
            LogEvent::NothingToReview { reason } => {
                format!("[{}] review:skip {}", timestamp, reason)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}
