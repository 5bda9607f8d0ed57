//! Report rendering for sve
//!
//! Produces the pytest-style terminal report and the JSON report.

use colored::{Color, Colorize};
use std::path::Path;

use crate::report::{Evidence, RuleStatus, RunReport, ServiceReport, ServiceResult};

/// Terminal width used when `COLUMNS` is unset
pub const DEFAULT_WIDTH: usize = 80;

/// The evidence line of a failure, without the `E` marker
pub fn evidence_text(evidence: &Evidence) -> String {
    if evidence.implicit {
        format!("implicit: {}", evidence.matched.join(", "))
    } else {
        evidence.matched.join(", ")
    }
}

/// `path:1,3: description`, or `path: description` when no line matched
pub fn reference_line(evidence: &Evidence, config_path: &Path) -> String {
    let lines = if evidence.lines.is_empty() {
        String::new()
    } else {
        let joined: Vec<String> = evidence.lines.iter().map(|n| n.to_string()).collect();
        format!("{}:", joined.join(","))
    };
    format!("{}:{} {}", config_path.display(), lines, evidence.description)
}

/// Text renderer for a `RunReport`
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    pub width: usize,
    pub color: bool,
}

impl TextRenderer {
    pub fn new(width: usize, color: bool) -> Self {
        Self { width, color }
    }

    /// Width from `COLUMNS`, falling back to `DEFAULT_WIDTH`
    pub fn from_env(color: bool) -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.trim().parse().ok())
            .filter(|w: &usize| *w > 0)
            .unwrap_or(DEFAULT_WIDTH);
        Self::new(width, color)
    }

    fn paint(&self, text: &str, color: Option<Color>) -> String {
        if !self.color {
            return text.to_string();
        }
        match color {
            Some(c) => text.color(c).bold().to_string(),
            None => text.bold().to_string(),
        }
    }

    /// Draw a centered title between borders spanning the full width
    pub fn header(&self, title: &str, color: Option<Color>, border: char) -> String {
        let title_len = title.chars().count();
        if self.width < title_len + 2 {
            return self.paint(title, color);
        }

        let border_len = (self.width - title_len - 2) / 2;
        let side: String = std::iter::repeat(border).take(border_len).collect();
        let mut line = format!("{} {} {}", side, title, side);
        if 2 * border_len + title_len + 2 < self.width {
            line.push(border);
        }
        self.paint(&line, color)
    }

    /// Render the full report
    ///
    /// `active` lists services whose unit is running; their names are
    /// shown green, the rest red.
    pub fn render(&self, report: &RunReport, active: &[String]) -> String {
        let mut out = String::new();

        out.push_str(&self.header("sve session starts", None, '='));
        out.push('\n');
        out.push_str(&collected_line(report.services.len()));
        out.push_str("\n\n");

        for result in &report.services {
            out.push_str(&self.status_line(result, active));
            out.push('\n');
        }

        if report.audited().any(|r| r.failed > 0) {
            out.push('\n');
            out.push_str(&self.header("FAILURES", None, '='));
            out.push('\n');
            for service in report.audited().filter(|r| r.failed > 0) {
                out.push_str(&self.failures(service));
            }
        }

        if report.errors().next().is_some() {
            out.push('\n');
            out.push_str(&self.header("ERRORS", None, '='));
            out.push('\n');
            for result in report.errors() {
                if let ServiceResult::Error { service, message, .. } = result {
                    let title = format!("test_{}", service);
                    out.push_str(&self.header(&title, Some(Color::Red), '_'));
                    out.push_str("\n\n");
                    out.push_str(&self.paint(&format!("E   {}", message), Some(Color::Red)));
                    out.push_str("\n\n");
                }
            }
        }

        out.push_str(&self.summary(report));
        out.push('\n');
        out
    }

    fn status_line(&self, result: &ServiceResult, active: &[String]) -> String {
        match result {
            ServiceResult::Audited(report) => {
                let name_color = if active.iter().any(|s| s == &report.service) {
                    Color::Green
                } else {
                    Color::Red
                };
                let name = self.paint(&report.service, Some(name_color));
                let version = report.version.as_deref().unwrap_or("unknown");

                let dots: String = report
                    .statuses
                    .iter()
                    .map(|s| match s {
                        RuleStatus::Passed => ".",
                        RuleStatus::Failed => "F",
                    })
                    .collect();

                let left_len = report.service.chars().count() + 1 + version.len() + 1 + dots.len();
                let percent = format!("[{:>3}%]", report.percentage());
                let pad = self.width.saturating_sub(left_len + percent.len()).max(1);

                let percent_color = if report.failed > 0 { Color::Red } else { Color::Green };
                format!(
                    "{} {} {}{}{}",
                    name,
                    version,
                    self.paint_dots(&dots),
                    " ".repeat(pad),
                    self.paint(&percent, Some(percent_color))
                )
            }
            ServiceResult::Skipped { service } => {
                format!("{} {}", service, self.paint("no tests available", Some(Color::Yellow)))
            }
            ServiceResult::Error { service, .. } => {
                format!("{} {}", service, self.paint("E", Some(Color::Red)))
            }
        }
    }

    fn paint_dots(&self, dots: &str) -> String {
        if !self.color {
            return dots.to_string();
        }
        dots.chars()
            .map(|c| match c {
                'F' => "F".red().bold().to_string(),
                _ => ".".green().to_string(),
            })
            .collect()
    }

    fn failures(&self, service: &ServiceReport) -> String {
        let mut out = String::new();
        let title = format!("test_{}", service.service);
        out.push_str(&self.header(&title, Some(Color::Red), '_'));
        out.push_str("\n\n");

        for evidence in &service.failures {
            let line = format!("E   {}", evidence_text(evidence));
            out.push_str(&self.paint(&line, Some(Color::Red)));
            out.push('\n');
            out.push_str(&reference_line(evidence, &service.config_path));
            out.push_str("\n\n");
        }
        out
    }

    fn summary(&self, report: &RunReport) -> String {
        let seconds = format!("{:.3}", report.elapsed.as_secs_f64());
        let audited = report.audited().count();
        let errors = report.errors().count();
        let error_note = match errors {
            0 => String::new(),
            1 => ", 1 error".to_string(),
            n => format!(", {} errors", n),
        };

        if audited == 0 {
            let title = format!("no tests ran{} in {} seconds", error_note, seconds);
            return self.header(&title, Some(Color::Yellow), '=');
        }

        let (passed, failed) = (report.passed(), report.failed());
        if failed > 0 || errors > 0 {
            let title = format!(
                "{} tests failed, {} passed{} in {} seconds",
                failed, passed, error_note, seconds
            );
            self.header(&title, Some(Color::Red), '=')
        } else {
            let title = format!("{} tests passed in {} seconds", passed, seconds);
            self.header(&title, Some(Color::Green), '=')
        }
    }
}

fn collected_line(count: usize) -> String {
    match count {
        1 => "collected 1 item".to_string(),
        n => format!("collected {} items", n),
    }
}

/// Serialize the report to JSON
pub fn render_json(report: &RunReport, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
