//! Routes parsed server messages to channel updates and queued replies.

use crate::app::channels::SERVER;
use crate::app::state::AppState;
use crate::irc::line::Message;

/// First characters that mark a channel target.
const CHANNEL_PREFIXES: &[char] = &['&', '#', '!', '+', '.', '~'];

/// Handle one inbound message. Command names match case-sensitively.
pub fn dispatch(state: &mut AppState, msg: &Message<'_>) {
    match msg.command {
        "PRIVMSG" => privmsg(state, msg),
        "PING" => {
            let payload = msg.trailing.or_else(|| msg.param(0)).unwrap_or_default();
            state.outbox.send_pong(payload);
        }
        "PART" => membership(state, msg, "left"),
        "JOIN" => membership(state, msg, "joined"),
        "470" => forwarded(state, msg),
        "471" | "473" | "474" | "475" => join_refused(state, msg),
        "QUIT" => {}
        "NOTICE" | "375" | "372" | "376" => {
            state.push_line(SERVER, msg.trailing.unwrap_or_default());
        }
        _ => {
            let line = format!(
                "{} - {} {}",
                msg.command,
                msg.params,
                msg.trailing.unwrap_or_default()
            );
            state.push_line(SERVER, &line);
        }
    }
}

fn privmsg(state: &mut AppState, msg: &Message<'_>) {
    let sender = msg.nick();
    let Some(text) = msg.trailing else {
        return;
    };

    // CTCP requests are answered, not shown.
    if text == "\x01VERSION\x01" {
        let reply = format!("VERSION {}", state.config.version);
        state.outbox.send_ctcp_reply(sender, &reply);
        return;
    }
    if text.starts_with("\x01PING") {
        state.outbox.send_notice(sender, text);
        return;
    }

    let Some(target) = msg.param(0) else {
        return;
    };
    let name = if target.starts_with(CHANNEL_PREFIXES) {
        target
    } else {
        sender
    };
    let index = match state.channels.find(name) {
        Some(index) => index,
        None => match state.add_channel(name, false) {
            Ok(index) => index,
            Err(e) => {
                tracing::debug!(channel = name, error = %e, "dropping message for unopened channel");
                return;
            }
        },
    };

    let active = state.channels.is_active(index);
    let mention = mentions(text, &state.nick);
    let format = &state.config.format;
    let line = match text.strip_prefix("\x01ACTION ") {
        Some(action) => format.action(sender, action.strip_suffix('\x01').unwrap_or(action)),
        None if mention => format.highlight(sender, text),
        None => format.normal(sender, text),
    };
    state.push_line(index, &line);

    if !active {
        if let Some(channel) = state.channels.get_mut(index) {
            channel.highlighted |= mention;
            channel.unread = true;
        }
        state.redraw_status();
    }
}

fn mentions(text: &str, nick: &str) -> bool {
    !nick.is_empty() && text.to_lowercase().contains(&nick.to_lowercase())
}

fn membership(state: &mut AppState, msg: &Message<'_>, verb: &str) {
    let Some(channel) = msg.param(0).or(msg.trailing) else {
        return;
    };
    let index = state.channels.find(channel).unwrap_or(SERVER);
    let line = format!(
        "! {:<width$} has {} {}",
        msg.nick(),
        verb,
        channel,
        width = state.config.format.nick_width
    );
    state.push_line(index, &line);
}

/// 470: the server moved us from one channel to another.
fn forwarded(state: &mut AppState, msg: &Message<'_>) {
    let (Some(from), Some(to)) = (msg.param(1), msg.param(2)) else {
        return;
    };
    if let Some(index) = state.channels.find(from) {
        state.channels.rename(index, to);
        state.full_redraw();
    }
}

fn join_refused(state: &mut AppState, msg: &Message<'_>) {
    let Some(channel) = msg.param(1) else {
        return;
    };
    state.remove_channel(channel);
    let line = format!("-!- Cannot join channel {} ({})", channel, msg.command);
    state.push_line(SERVER, &line);
    state.full_redraw();
}
