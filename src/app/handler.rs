use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::channels::SERVER;
use crate::app::input::Edit;
use crate::app::state::AppState;
use crate::irc::commands::{parse_command, ParsedCommand};

pub fn handle_terminal(state: &mut AppState, event: CEvent) {
    match event {
        CEvent::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, key),
        CEvent::Resize(cols, rows) => state.pending_resize = Some((cols, rows)),
        _ => {}
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let edit = match key.code {
        KeyCode::Char('c') if ctrl => {
            state.should_quit = true;
            return;
        }
        KeyCode::Char('n') if ctrl => {
            state.select_next();
            return;
        }
        KeyCode::Char('p') if ctrl => {
            state.select_prev();
            return;
        }
        KeyCode::PageUp => {
            state.scroll_up();
            return;
        }
        KeyCode::PageDown => {
            state.scroll_down();
            return;
        }
        KeyCode::Enter => {
            let line = state.input.submit();
            state.dirty = true;
            run_command(state, &line);
            return;
        }
        KeyCode::Home => Edit::MoveStart,
        KeyCode::Char('a') if ctrl => Edit::MoveStart,
        KeyCode::End => Edit::MoveEnd,
        KeyCode::Char('e') if ctrl => Edit::MoveEnd,
        KeyCode::Left => Edit::MoveLeft,
        KeyCode::Char('b') if ctrl => Edit::MoveLeft,
        KeyCode::Right => Edit::MoveRight,
        KeyCode::Char('k') if ctrl => Edit::DeleteToEnd,
        KeyCode::Char('u') if ctrl => Edit::DeleteLine,
        KeyCode::Delete => Edit::DeleteForward,
        KeyCode::Char('d') if ctrl => Edit::DeleteForward,
        KeyCode::Backspace => Edit::DeleteBack,
        KeyCode::Char('h') if ctrl => Edit::DeleteBack,
        KeyCode::Char('w') if ctrl => Edit::DeleteWord,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => return,
        KeyCode::Char(c) => Edit::Insert(c),
        _ => return,
    };
    let (width, _) = state.screen.pane_size();
    if state.input.apply(edit, width) {
        state.dirty = true;
    }
}

/// Act on a submitted input line.
pub fn run_command(state: &mut AppState, line: &str) {
    let Some(command) = parse_command(line) else {
        return;
    };
    match command {
        ParsedCommand::Join { channels } => {
            for name in &channels {
                if let Err(e) = state.add_channel(name, true) {
                    state.push_line(SERVER, &format!("-!- Cannot join {}: {}", name, e));
                    break;
                }
                state.outbox.send_join(name);
            }
            state.full_redraw();
        }
        ParsedCommand::Leave { channels } => {
            let channels = if channels.is_empty() {
                // The server channel cannot be left.
                if state.channels.current_index() == SERVER {
                    return;
                }
                vec![state.channels.current().name.clone()]
            } else {
                channels
            };
            for name in &channels {
                if state.remove_channel(name) {
                    state.outbox.send_part(name);
                }
            }
            state.full_redraw();
        }
        ParsedCommand::Query { target, text } => {
            state.outbox.send_privmsg(&target, &text);
        }
        ParsedCommand::Raw { command } => {
            state.outbox.send_raw(&command);
        }
        ParsedCommand::Quit => state.should_quit = true,
        ParsedCommand::Me { text } => {
            let Some(target) = active_target(state) else {
                return;
            };
            let line = state.config.format.action(&state.nick, &text);
            state.push_line(state.channels.current_index(), &line);
            state.outbox.send_action(&target, &text);
        }
        ParsedCommand::Say { text } => {
            let Some(target) = active_target(state) else {
                return;
            };
            let line = state.config.format.normal(&state.nick, &text);
            state.push_line(state.channels.current_index(), &line);
            state.outbox.send_privmsg(&target, &text);
        }
    }
}

/// Name of the active channel, unless it is the server channel.
fn active_target(state: &AppState) -> Option<String> {
    let index = state.channels.current_index();
    (index != SERVER).then(|| state.channels.current().name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::channels::ChannelStore;
    use crate::app::state::tests::test_state;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CEvent {
        CEvent::Key(KeyEvent::new(code, modifiers))
    }

    fn type_line(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_terminal(state, key(KeyCode::Char(c), KeyModifiers::NONE));
        }
        handle_terminal(state, key(KeyCode::Enter, KeyModifiers::NONE));
    }

    fn sent(state: &AppState) -> String {
        String::from_utf8(state.outbox.pending().to_vec()).unwrap()
    }

    fn server_log(state: &AppState) -> String {
        String::from_utf8(state.channels.get(SERVER).unwrap().log.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_join_stops_at_capacity() {
        let mut state = test_state();
        state.channels = ChannelStore::with_limit("irc.example.net", 2);
        type_line(&mut state, "/j #a #b");
        assert!(state.channels.find("#a").is_some());
        assert!(state.channels.find("#b").is_none());
        assert_eq!(sent(&state), "JOIN #a\r\n");
        assert!(server_log(&state).contains("Cannot join #b"));
        assert!(state.input.is_empty());
    }

    #[test]
    fn test_say_renders_and_sends() {
        let mut state = test_state();
        type_line(&mut state, "/j #rust");
        state.outbox.clear();
        type_line(&mut state, "  hello all");
        assert_eq!(sent(&state), "PRIVMSG #rust :hello all\r\n");
        let log = String::from_utf8(state.channels.current().log.as_bytes().to_vec()).unwrap();
        assert_eq!(log, format!("{:<12}   hello all\n", "crab"));
    }

    #[test]
    fn test_say_on_server_channel_is_ignored() {
        let mut state = test_state();
        type_line(&mut state, "hello?");
        type_line(&mut state, "/me shrugs");
        assert!(state.outbox.is_empty());
        assert!(server_log(&state).is_empty());
    }

    #[test]
    fn test_me_sends_action() {
        let mut state = test_state();
        run_command(&mut state, "/j #rust");
        state.outbox.clear();
        run_command(&mut state, "/me waves");
        assert_eq!(sent(&state), "PRIVMSG #rust :\x01ACTION waves\x01\r\n");
        let log = String::from_utf8(state.channels.current().log.as_bytes().to_vec()).unwrap();
        assert_eq!(log, format!("* {:<12} waves\n", "crab"));
    }

    #[test]
    fn test_leave_defaults_to_current_but_not_server() {
        let mut state = test_state();
        run_command(&mut state, "/l");
        assert!(state.outbox.is_empty());
        run_command(&mut state, "/j #a #b");
        state.outbox.clear();
        run_command(&mut state, "/l");
        assert_eq!(sent(&state), "PART #b\r\n");
        assert!(state.channels.find("#b").is_none());
        run_command(&mut state, "/l #a #nope");
        assert!(sent(&state).ends_with("PART #a\r\n"));
        assert_eq!(state.channels.len(), 1);
    }

    #[test]
    fn test_query_raw_and_quit() {
        let mut state = test_state();
        run_command(&mut state, "/q bob hi there");
        run_command(&mut state, "/r WHOIS bob");
        assert_eq!(sent(&state), "PRIVMSG bob :hi there\r\nWHOIS bob\r\n");
        assert!(state.channels.find("bob").is_none());
        run_command(&mut state, "/x");
        assert!(state.should_quit);
    }

    #[test]
    fn test_editing_keys() {
        let mut state = test_state();
        for c in "hello world".chars() {
            handle_terminal(&mut state, key(KeyCode::Char(c), KeyModifiers::NONE));
        }
        handle_terminal(&mut state, key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(state.input.text(), "hello ");
        handle_terminal(&mut state, key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(state.input.text(), "");

        for c in "abc".chars() {
            handle_terminal(&mut state, key(KeyCode::Char(c), KeyModifiers::NONE));
        }
        handle_terminal(&mut state, key(KeyCode::Char('a'), KeyModifiers::CONTROL));
        handle_terminal(&mut state, key(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(state.input.text(), "bc");
        handle_terminal(&mut state, key(KeyCode::End, KeyModifiers::NONE));
        handle_terminal(&mut state, key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(state.input.text(), "b");
        handle_terminal(&mut state, key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(state.input.is_empty());
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut state = test_state();
        let mut release = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        handle_terminal(&mut state, CEvent::Key(release));
        assert!(state.input.is_empty());
    }

    #[test]
    fn test_channel_cycling_and_quit_keys() {
        let mut state = test_state();
        run_command(&mut state, "/j #a #b");
        assert_eq!(state.channels.current().name, "#b");
        handle_terminal(&mut state, key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(state.channels.current_index(), SERVER);
        handle_terminal(&mut state, key(KeyCode::Char('p'), KeyModifiers::CONTROL));
        assert_eq!(state.channels.current().name, "#b");
        handle_terminal(&mut state, key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }

    #[test]
    fn test_resize_is_deferred() {
        let mut state = test_state();
        handle_terminal(&mut state, CEvent::Resize(120, 40));
        assert_eq!(state.pending_resize, Some((120, 40)));
        assert_eq!(state.screen.cols, 60);
    }
}
