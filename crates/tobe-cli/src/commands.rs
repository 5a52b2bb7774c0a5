//! Slash commands for interactive mode

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the command list
    Help,
    /// Show token usage
    Usage,
    /// Compact the conversation now
    Compact,
    /// Show or switch the chat model
    Model(Option<String>),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse a slash command. Returns `None` for ordinary input.
pub fn parse(input: &str) -> Option<Command> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next().unwrap_or("").to_lowercase();
    let args = parts.next().map(str::trim).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => Command::Help,
        "usage" | "u" => Command::Usage,
        "compact" => Command::Compact,
        "model" | "m" => Command::Model((!args.is_empty()).then(|| args.to_string())),
        "quit" | "exit" | "q" => Command::Exit,
        _ => Command::Unknown(command),
    })
}

pub fn help_message() -> &'static str {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /usage, /u           Show consumed tokens and the compaction ceiling
  /compact             Summarize the conversation now
  /model, /m [name]    Show the current model or switch to another one
  /quit, /exit, /q     Exit tobe"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_is_not_a_command() {
        assert_eq!(parse("hola, busco un piso"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse("/exit"), Some(Command::Exit));
        assert_eq!(parse("/Q"), Some(Command::Exit));
        assert_eq!(parse("  /help  "), Some(Command::Help));
        assert_eq!(parse("/u"), Some(Command::Usage));
        assert_eq!(parse("/compact"), Some(Command::Compact));
    }

    #[test]
    fn test_parse_model() {
        assert_eq!(parse("/model"), Some(Command::Model(None)));
        assert_eq!(
            parse("/m gpt-4"),
            Some(Command::Model(Some("gpt-4".into())))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/branch 3"), Some(Command::Unknown("branch".into())));
    }
}
