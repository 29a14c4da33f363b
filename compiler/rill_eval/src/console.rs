//! Console sink.
//!
//! The evaluator never writes to a real terminal directly: `console.log`
//! and friends go through an injected sink. Enum dispatch, not a trait
//! object: Stdout for the CLI, Buffer for tests and embedding, Silent to
//! drop output.

use parking_lot::Mutex;
use std::rc::Rc;

/// Console output level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Log,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Where console output goes.
pub enum ConsoleSink {
    /// stdout/stderr (warn and error go to stderr).
    Stdout,
    /// Capture into a buffer for assertions.
    Buffer(Mutex<Vec<(Level, String)>>),
    /// Discard everything.
    Silent,
}

impl ConsoleSink {
    /// A fresh capturing sink.
    pub fn buffer() -> Self {
        ConsoleSink::Buffer(Mutex::new(Vec::new()))
    }

    /// Write one already-rendered console line.
    pub fn write(&self, level: Level, line: String) {
        match self {
            ConsoleSink::Stdout => match level {
                Level::Log => println!("{line}"),
                Level::Warn | Level::Error => eprintln!("{line}"),
            },
            ConsoleSink::Buffer(buf) => buf.lock().push((level, line)),
            ConsoleSink::Silent => {}
        }
    }

    /// Captured lines (empty for non-buffer sinks).
    pub fn lines(&self) -> Vec<(Level, String)> {
        match self {
            ConsoleSink::Buffer(buf) => buf.lock().clone(),
            _ => Vec::new(),
        }
    }

    /// Captured text of all lines, joined with newlines.
    pub fn text(&self) -> String {
        self.lines()
            .into_iter()
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Shared handle so the interpreter and the embedder see the same buffer.
pub type SharedConsole = Rc<ConsoleSink>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_captures_in_order() {
        let sink = ConsoleSink::buffer();
        sink.write(Level::Log, "first".to_string());
        sink.write(Level::Error, "second".to_string());
        assert_eq!(
            sink.lines(),
            vec![
                (Level::Log, "first".to_string()),
                (Level::Error, "second".to_string())
            ]
        );
        assert_eq!(sink.text(), "first\nsecond");
    }

    #[test]
    fn silent_drops_everything() {
        let sink = ConsoleSink::Silent;
        sink.write(Level::Log, "gone".to_string());
        assert!(sink.lines().is_empty());
    }
}
