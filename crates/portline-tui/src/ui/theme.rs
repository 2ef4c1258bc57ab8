//! Colors
//!
//! Styles for each kind of line in a frame.

use portline_app::LineKind;
use ratatui::style::{Color, Modifier, Style};

/// Device output.
pub const OUTPUT: Color = Color::Rgb(0x81, 0xFC, 0xBF);

/// Read and write failures.
pub const ERROR: Color = Color::Rgb(0xFA, 0x23, 0x33);

/// Status line.
pub const ACCENT: Color = Color::Rgb(0xE8, 0x8C, 0x5F);

/// Style for a line of the given kind.
pub fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Output => Style::default().fg(OUTPUT),
        LineKind::Error => Style::default().fg(ERROR),
        LineKind::Status => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        LineKind::Input => Style::default(),
        LineKind::Placeholder => Style::default().fg(Color::DarkGray),
    }
}
