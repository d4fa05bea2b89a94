//! Terminal output.
//!
//! Status messages go to stderr so that command results written with
//! [`Output::data`] can be piped.

use console::{Style, Term};

#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Good,
    Caution,
    Failure,
    Heading,
    Muted,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Good => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Heading => Style::new().cyan().bold(),
            Self::Muted => Style::new().dim(),
        }
    }
}

/// Styled writer for CLI messages and results.
pub(crate) struct Output {
    messages: Term,
    results: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            messages: Term::stderr(),
            results: Term::stdout(),
        }
    }

    fn say(&self, tone: Tone, msg: &str) {
        let _ = self
            .messages
            .write_line(&tone.style().apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.say(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.say(Tone::Good, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.say(Tone::Caution, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.say(Tone::Failure, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.say(Tone::Heading, msg);
    }

    pub(crate) fn detail(&self, msg: &str) {
        self.say(Tone::Muted, msg);
    }

    /// Write one line of command output to stdout.
    pub(crate) fn data(&self, line: &str) {
        let _ = self.results.write_line(line);
    }
}
