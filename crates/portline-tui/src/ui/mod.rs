//! UI rendering
//!
//! Converts the frame laid out by [`App::view`] into ratatui widgets. Wrapping,
//! clipping and cursor placement are decided by the App; this module only
//! styles lines and positions them in the frame area.

mod theme;

use portline_app::{View, ViewLine};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Text},
    widgets::Paragraph,
};

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let view = app.view(area.width, area.height);

    frame.render_widget(Paragraph::new(styled_text(&view)), area);

    if let Some(position) = cursor_position(&view, area) {
        frame.set_cursor_position(position);
    }
}

fn styled_text(view: &View) -> Text<'_> {
    view.lines.iter().map(styled_line).collect::<Vec<_>>().into()
}

fn styled_line(line: &ViewLine) -> Line<'_> {
    Line::styled(line.text.as_str(), theme::line_style(line.kind))
}

/// Cursor position in frame coordinates, if it falls inside `area`.
fn cursor_position(view: &View, area: Rect) -> Option<(u16, u16)> {
    let (col, row) = view.cursor?;
    (col < area.width && row < area.height)
        .then(|| (area.x.saturating_add(col), area.y.saturating_add(row)))
}

#[cfg(test)]
mod tests {
    use portline_app::{AppConfig, AppEvent, Inbound, KeyInput};
    use ratatui::{Terminal, backend::TestBackend, layout::Position};

    use super::*;

    fn draw(app: &App, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
    }

    /// Buffer rows with trailing blanks removed.
    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let mut rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                let row: String = (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect();
                row.trim_end().to_string()
            })
            .collect();
        while rows.last().is_some_and(String::is_empty) {
            rows.pop();
        }
        rows
    }

    fn scenario_app() -> App {
        let mut app = App::new("/dev/ttyUSB0", 9600, AppConfig::default());
        app.drain_inbound([Inbound::Data("hello\n".into())]);
        app
    }

    #[test]
    fn renders_output_status_and_prompt() {
        let terminal = draw(&scenario_app(), 60, 8);

        insta::assert_snapshot!(rows(&terminal).join("\n"), @r"
        hello
        port: /dev/ttyUSB0, baut rate: 9600
        > type
        ");
    }

    #[test]
    fn lines_are_colored_by_kind() {
        let mut app = scenario_app();
        app.drain_inbound([Inbound::Error("write failed".into())]);
        let terminal = draw(&app, 60, 8);
        let buffer = terminal.backend().buffer();

        assert_eq!(buffer[(0, 0)].fg, theme::OUTPUT);
        assert_eq!(buffer[(0, 1)].fg, theme::ERROR);
        assert_eq!(buffer[(0, 2)].fg, theme::ACCENT);
    }

    #[test]
    fn cursor_sits_after_typed_text() {
        let mut app = scenario_app();
        for c in "ab".chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
        let mut terminal = draw(&app, 60, 8);

        assert_eq!(terminal.get_cursor_position().unwrap(), Position::new(4, 2));
    }

    #[test]
    fn long_output_is_clipped_to_the_frame() {
        let mut app = App::new("/dev/ttyUSB0", 9600, AppConfig::default());
        for i in 0..20 {
            app.drain_inbound([Inbound::Data(format!("line {i}\n"))]);
        }
        let terminal = draw(&app, 60, 4);

        assert_eq!(rows(&terminal), [
            "line 18",
            "line 19",
            "port: /dev/ttyUSB0, baut rate: 9600",
            "> type",
        ]);
    }

    #[test]
    fn cursor_outside_area_is_dropped() {
        let view = View { lines: vec![], cursor: Some((5, 9)) };
        assert_eq!(cursor_position(&view, Rect::new(0, 0, 10, 4)), None);
        assert_eq!(cursor_position(&view, Rect::new(2, 1, 10, 10)), Some((7, 10)));
    }
}
