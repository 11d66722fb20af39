//! Status colors, labels and the terminal status panel.

use std::fmt;

use strum::Display;
use time::macros::format_description;

use super::poller::ClientHealthState;

/// Display color of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StatusColor {
    Green,
    Red,
    Amber,
}

impl StatusColor {
    /// CSS hex color.
    pub fn hex(self) -> &'static str {
        match self {
            StatusColor::Green => "#10b981",
            StatusColor::Red => "#ef4444",
            StatusColor::Amber => "#f59e0b",
        }
    }

    /// ANSI foreground escape sequence.
    pub fn ansi(self) -> &'static str {
        match self {
            StatusColor::Green => "\x1b[32m",
            StatusColor::Red => "\x1b[31m",
            StatusColor::Amber => "\x1b[33m",
        }
    }
}

/// Color for a status string; anything unrecognized or absent is amber.
pub fn color_for(status: Option<&str>) -> StatusColor {
    match status {
        Some("healthy" | "connected") => StatusColor::Green,
        Some("degraded" | "disconnected") => StatusColor::Red,
        _ => StatusColor::Amber,
    }
}

/// Human label for a status string; anything unrecognized or absent is "Unknown".
pub fn label_for(status: Option<&str>) -> &'static str {
    match status {
        Some("healthy") => "Healthy",
        Some("connected") => "Connected",
        Some("degraded") => "Degraded",
        Some("disconnected") => "Disconnected",
        _ => "Unknown",
    }
}

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD: &str = "\x1b[1m";
const RULE: &str = "----------------------------------------------------------------------";

/// Terminal rendering of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Application name shown in the title.
    pub app_name: String,
    /// API base URL being polled.
    pub api_url: String,
    /// Runtime environment name.
    pub environment: String,
    /// Emit ANSI colors.
    pub colored: bool,
}

impl DashboardView {
    /// Render the whole panel for `state`.
    pub fn render(&self, state: &ClientHealthState) -> String {
        Panel { view: self, state }.to_string()
    }

    fn paint(&self, color: StatusColor, text: &str) -> String {
        if self.colored {
            format!("{}{}{}", color.ansi(), text, ANSI_RESET)
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.colored {
            format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
        } else {
            text.to_string()
        }
    }
}

/// One frame of the dashboard.
struct Panel<'a> {
    view: &'a DashboardView,
    state: &'a ClientHealthState,
}

impl Panel<'_> {
    fn row(&self, f: &mut fmt::Formatter<'_>, name: &str, status: Option<&str>) -> fmt::Result {
        writeln!(
            f,
            "  {:<22}{} {}",
            name,
            self.view.paint(color_for(status), "●"),
            label_for(status)
        )
    }
}

impl fmt::Display for Panel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let state = self.state;

        writeln!(f, "{}", view.bold(&format!("Welcome to {}", view.app_name)))?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{}", view.bold("System Status"))?;

        if state.loading {
            writeln!(f, "  Checking system status...")?;
        } else if let Some(error) = &state.error {
            writeln!(f, "  {}", view.paint(StatusColor::Red, "Warning: Connection Error"))?;
            writeln!(f, "  {}", error)?;
            writeln!(f, "  API URL: {}", view.api_url)?;
        } else if let Some(report) = &state.report {
            self.row(f, "Overall Status", Some(report.status.as_ref()))?;

            self.row(f, "API Service", Some(report.api.status.as_ref()))?;
            let checked = report
                .api
                .timestamp
                .format(format_description!("[hour]:[minute]:[second]"))
                .map_err(|_| fmt::Error)?;
            writeln!(f, "    Last checked: {} UTC", checked)?;

            self.row(f, "Database Connection", Some(report.database.status.as_ref()))?;
            if let Some(error) = &report.database.error {
                writeln!(f, "    {}", view.paint(StatusColor::Red, error))?;
            }
        }

        writeln!(f, "{}", RULE)?;
        writeln!(f, "Environment Information")?;
        writeln!(f, "  API Endpoint: {}", view.api_url)?;
        writeln!(f, "  Environment: {}", view.environment)
    }
}
