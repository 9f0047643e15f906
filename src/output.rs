// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Renders push events, warnings and results in normal, quiet or JSON mode.

use serde::Serialize;
use std::time::Instant;

use crate::push::{Event, PushPlan, Step};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Render one push event for `app`.
    pub fn event(&self, app: &str, event: &Event) {
        match self.mode {
            OutputMode::Normal => match event {
                Event::InstanceDetails(details) => println!("    {details}"),
                other => println!("  → {app}: {other}"),
            },
            OutputMode::Quiet => {}
            OutputMode::Json => emit_json(&JsonPushEvent { app, event }),
        }
    }

    /// Print a warning. Shown in every mode, always on stderr.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => {
                let line = JsonMessage {
                    event: "warning",
                    message,
                    duration_secs: None,
                };
                if let Ok(json) = serde_json::to_string(&line) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a plan's step sequence.
    pub fn plan(&self, plan: &PushPlan, steps: &[Step]) {
        match self.mode {
            OutputMode::Normal => {
                println!("{}:", plan.app_name());
                for (index, step) in steps.iter().enumerate() {
                    println!("  {}. {}", index + 1, step);
                }
            }
            OutputMode::Quiet => {
                let names: Vec<_> = steps.iter().map(|s| s.as_str()).collect();
                println!("{}: {}", plan.app_name(), names.join(" "));
            }
            OutputMode::Json => emit_json(&JsonPlan {
                app: plan.app_name().as_str(),
                steps,
                plan,
            }),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => emit_json(&JsonMessage {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let line = JsonMessage {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&line) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

fn emit_json<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonPushEvent<'a> {
    app: &'a str,
    #[serde(flatten)]
    event: &'a Event,
}

#[derive(Serialize)]
struct JsonPlan<'a> {
    app: &'a str,
    steps: &'a [Step],
    plan: &'a PushPlan,
}
