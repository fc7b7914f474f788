//! User slash-command parser.
//!
//! Turns a submitted input line into a typed [`ParsedCommand`] that the
//! handler can act on. Lines that are not a known command are chat text.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Join { channels: Vec<String> },
    /// An empty list means the active channel.
    Leave { channels: Vec<String> },
    Query { target: String, text: String },
    Raw { command: String },
    Quit,
    Me { text: String },
    /// Plain text for the active channel, leading spaces removed.
    Say { text: String },
}

/// Parse one submitted line.
///
/// Returns `None` for lines that do nothing: blank text, `/q` without a
/// message, `/r` without a command. Unknown `/words` are sent as chat.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    if let Some(rest) = input.strip_prefix('/') {
        let (cmd, args) = rest.split_once(' ').unwrap_or((rest, ""));
        match cmd {
            "j" | "join" => {
                return Some(ParsedCommand::Join {
                    channels: words(args),
                })
            }
            "l" | "leave" | "part" => {
                return Some(ParsedCommand::Leave {
                    channels: words(args),
                })
            }
            "q" | "query" | "msg" => {
                let (target, text) = args.trim_start().split_once(' ')?;
                if target.is_empty() {
                    return None;
                }
                return Some(ParsedCommand::Query {
                    target: target.to_string(),
                    text: text.to_string(),
                });
            }
            "r" | "raw" | "quote" => {
                if args.is_empty() {
                    return None;
                }
                return Some(ParsedCommand::Raw {
                    command: args.to_string(),
                });
            }
            "x" | "quit" | "exit" => return Some(ParsedCommand::Quit),
            "me" => {
                return Some(ParsedCommand::Me {
                    text: args.to_string(),
                })
            }
            _ => {}
        }
    }

    let text = input.trim_start_matches(' ');
    if text.is_empty() {
        return None;
    }
    Some(ParsedCommand::Say {
        text: text.to_string(),
    })
}

fn words(args: &str) -> Vec<String> {
    args.split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
