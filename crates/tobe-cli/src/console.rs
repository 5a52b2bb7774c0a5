//! Console implementations of the session input and output ports

use std::io::{self, BufRead, Write};

use tobe_ai::{Message, Role};
use tobe_session::{CompactionReason, InputPort, OutputPort, SessionEvent};

const RULE_WIDTH: usize = 100;

/// Reads user turns line by line
pub struct ConsoleInput<R, W> {
    reader: R,
    writer: W,
}

impl ConsoleInput<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> InputPort for ConsoleInput<R, W> {
    fn read_user_input(&mut self, prompt_label: &str) -> tobe_session::Result<Option<String>> {
        write!(self.writer, "{}", prompt_label)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            // EOF
            return Ok(None);
        }

        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

/// Prints the conversation the way the chat screen shows it
pub struct ConsoleOutput<W> {
    writer: W,
}

impl ConsoleOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_conversation(&mut self, history: &[Message], used_tokens: u64) -> io::Result<()> {
        writeln!(self.writer, "Tobe ChatBot")?;
        writeln!(self.writer, "{}", "*".repeat(RULE_WIDTH))?;
        for msg in history {
            writeln!(self.writer, "{}: {}", msg.role().title(), msg.content())?;
            writeln!(self.writer, "{}", "-".repeat(RULE_WIDTH))?;
        }
        writeln!(self.writer, "{}", "*".repeat(RULE_WIDTH))?;
        writeln!(self.writer, "Tokens used: {}", used_tokens)?;
        self.writer.flush()
    }

    fn write_event(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::CompactionStart { reason } => {
                writeln!(self.writer, "[Compacting context ({})]", reason_str(*reason))
            }
            SessionEvent::CompactionEnd {
                messages_before,
                messages_after,
            } => writeln!(
                self.writer,
                "[Compacted: {} -> {} messages]",
                messages_before, messages_after
            ),
            SessionEvent::CompactionFailed { message } => {
                writeln!(self.writer, "[Compaction failed: {}]", message)
            }
            SessionEvent::TurnStart { .. } => writeln!(self.writer, "wait response..."),
            SessionEvent::TurnEnd { .. } => Ok(()),
        }
    }
}

impl<W: Write> OutputPort for ConsoleOutput<W> {
    fn render(&mut self, history: &[Message], used_tokens: u64) {
        if let Err(e) = self.write_conversation(history, used_tokens) {
            tracing::warn!(error = %e, "failed to render conversation");
        }
    }

    fn on_event(&mut self, event: &SessionEvent) {
        if let Err(e) = self.write_event(event) {
            tracing::warn!(error = %e, "failed to print session event");
        }
    }
}

/// Format a compaction reason for display.
pub fn reason_str(reason: CompactionReason) -> &'static str {
    match reason {
        CompactionReason::Threshold => "threshold",
        CompactionReason::Manual => "manual",
    }
}

/// Single-line rendering of a message, used by one-shot mode
pub fn format_reply(text: &str) -> String {
    format!("{}: {}", Role::Assistant.title(), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_lines_until_eof() {
        let mut input = ConsoleInput::new(Cursor::new("hola\r\n\nadios"), Vec::new());

        assert_eq!(input.read_user_input(">:").unwrap().as_deref(), Some("hola"));
        assert_eq!(input.read_user_input(">:").unwrap().as_deref(), Some(""));
        assert_eq!(input.read_user_input(">:").unwrap().as_deref(), Some("adios"));
        assert_eq!(input.read_user_input(">:").unwrap(), None);

        assert_eq!(String::from_utf8(input.writer).unwrap(), ">:>:>:>:");
    }

    #[test]
    fn test_render_layout() {
        let mut output = ConsoleOutput::new(Vec::new());
        output.render(
            &[Message::user("hola"), Message::assistant("¡Buenas!")],
            42,
        );

        let text = String::from_utf8(output.writer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Tobe ChatBot");
        assert_eq!(lines[1], "*".repeat(100));
        assert_eq!(lines[2], "User: hola");
        assert_eq!(lines[3], "-".repeat(100));
        assert_eq!(lines[4], "Assistant: ¡Buenas!");
        assert_eq!(lines[6], "*".repeat(100));
        assert_eq!(lines[7], "Tokens used: 42");
    }

    #[test]
    fn test_compaction_events() {
        let mut output = ConsoleOutput::new(Vec::new());
        output.on_event(&SessionEvent::CompactionStart {
            reason: CompactionReason::Threshold,
        });
        output.on_event(&SessionEvent::CompactionEnd {
            messages_before: 8,
            messages_after: 3,
        });

        let text = String::from_utf8(output.writer).unwrap();
        assert_eq!(
            text,
            "[Compacting context (threshold)]\n[Compacted: 8 -> 3 messages]\n"
        );
    }

    #[test]
    fn test_format_reply() {
        assert_eq!(format_reply("OK"), "Assistant: OK");
    }
}
