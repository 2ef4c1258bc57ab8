//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use portline_app::{App, AppAction, AppConfig, AppEvent, Inbound, KeyInput, Mode, wrap_line};
use proptest::prelude::*;

/// Generate random key presses.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => proptest::char::range('a', 'z').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Char(' ')),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
        1 => Just(KeyInput::PageUp),
        1 => Just(KeyInput::PageDown),
        1 => Just(KeyInput::Tab),
        1 => Just(KeyInput::Enter),
    ]
}

/// Generate random app events, excluding the ones that always quit.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        1 => Just(AppEvent::Tick),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
        8 => key_strategy().prop_map(AppEvent::Key),
    ]
}

/// Generate inbound device messages.
fn inbound_strategy() -> impl Strategy<Value = Inbound> {
    prop_oneof![
        4 => "[a-z \\n\\r]{0,20}".prop_map(Inbound::Data),
        1 => "[a-z ]{1,20}".prop_map(Inbound::Error),
    ]
}

fn history_app() -> App {
    App::new("/dev/ttyUSB0", 9600, AppConfig { history_mode: true, ..AppConfig::default() })
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        let _ = app.handle(AppEvent::Key(KeyInput::Char(c)));
    }
}

proptest! {
    #[test]
    fn prop_display_is_concatenation_of_inbound(
        batches in prop::collection::vec(prop::collection::vec(inbound_strategy(), 0..5), 0..10)
    ) {
        let mut app = App::new("/dev/ttyUSB0", 9600, AppConfig::default());
        let mut expected = String::new();

        for batch in batches {
            for message in &batch {
                match message {
                    Inbound::Data(text) | Inbound::Error(text) => expected.push_str(text),
                }
            }
            let count = batch.len();
            prop_assert_eq!(app.drain_inbound(batch), count);
        }

        prop_assert_eq!(app.display_text(), expected);
    }

    #[test]
    fn prop_events_never_touch_display(
        seed in prop::collection::vec(inbound_strategy(), 0..5),
        events in prop::collection::vec(event_strategy(), 0..50),
    ) {
        let mut app = history_app();
        app.drain_inbound(seed);
        let before = app.display_text();

        for event in events {
            let _ = app.handle(event);
        }

        prop_assert_eq!(app.display_text(), before);
    }

    #[test]
    fn prop_send_is_never_empty(events in prop::collection::vec(event_strategy(), 0..80)) {
        let mut app = history_app();

        for event in events {
            for action in app.handle(event) {
                if let AppAction::Send { line } = action {
                    prop_assert!(!line.is_empty());
                    prop_assert!(line != "exit" && line != "quit");
                }
            }
        }
    }

    #[test]
    fn prop_quit_commands_quit_in_any_mode(
        command in prop::sample::select(vec!["exit", "quit"]),
        tabs in 0usize..5,
    ) {
        let mut app = history_app();
        type_text(&mut app, command);
        for _ in 0..tabs {
            let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        }

        prop_assert_eq!(app.handle(AppEvent::Key(KeyInput::Enter)), vec![AppAction::Quit]);
    }

    #[test]
    fn prop_mode_cycle_wraps(tabs in 0usize..20) {
        let mut app = history_app();
        for _ in 0..tabs {
            let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        }

        let expected = Mode::ALL[tabs % Mode::ALL.len()];
        prop_assert_eq!(app.mode(), expected);
    }

    #[test]
    fn prop_render_is_pure(
        seed in prop::collection::vec(inbound_strategy(), 0..10),
        width in 0u16..120,
        height in 0u16..60,
    ) {
        let mut app = history_app();
        app.drain_inbound(seed);

        let first = app.render(width, height);
        prop_assert_eq!(app.render(width, height), first);
    }

    #[test]
    fn prop_render_respects_wrap_width(
        seed in prop::collection::vec(inbound_strategy(), 0..10),
        width in 1u16..120,
    ) {
        let app = {
            let mut app = App::new("/dev/ttyUSB0", 9600, AppConfig::default());
            app.drain_inbound(seed);
            app
        };
        let limit = usize::from(width.min(AppConfig::default().wrap_width));

        for line in app.view(width, 0).lines {
            prop_assert!(line.text.chars().count() <= limit, "line too wide: {:?}", line.text);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_wrap_preserves_words(text in "[a-z]{1,12}( [a-z]{1,12}){0,10}", width in 1usize..30) {
        let lines = wrap_line(&text, width);

        for line in &lines {
            prop_assert!(line.chars().count() <= width);
        }
        let rejoined: String = lines.concat().chars().filter(|c| *c != ' ').collect();
        let original: String = text.chars().filter(|c| *c != ' ').collect();
        prop_assert_eq!(rejoined, original);
    }
}

#[test]
fn submitted_line_round_trips_through_field() {
    let mut app = App::new("/dev/ttyUSB0", 9600, AppConfig::default());
    type_text(&mut app, "AT+GMR");

    let actions = app.handle(AppEvent::Key(KeyInput::Enter));

    assert_eq!(actions, vec![AppAction::Send { line: "AT+GMR".into() }]);
    assert!(app.input().value().is_empty());
}
