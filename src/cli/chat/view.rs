use std::io::Write;
use std::sync::{Mutex, PoisonError};

use color_print::cformat;
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use genx_trade_desk::chat::{ChatView, Message, Role};

const BUSY_TEXT: &str = "Securely consulting Mandi feed...";

/// Prints the conversation as a transcript; the newest message is always the
/// last thing on screen.
pub struct TerminalView {
    output: Mutex<Box<dyn Write + Send>>,
}

impl TerminalView {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(output),
        }
    }

    pub fn print(&self, text: &str) -> std::io::Result<()> {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(output, "{}", text)?;
        output.flush()
    }

    fn render(message: &Message) -> String {
        let time = message.sent_at().format("%H:%M");
        match message.role() {
            Role::User => cformat!("\n<cyan,bold>You</> <dim>{}</>\n{}", time, message.text()),
            Role::Assistant => cformat!(
                "\n<green,bold>Trade Desk</> <dim>{}</>\n{}",
                time,
                message.text()
            ),
        }
    }
}

impl ChatView for TerminalView {
    fn message_appended(&self, message: &Message) {
        if let Err(e) = self.print(&Self::render(message)) {
            debug!("Failed to render message: {}", e);
        }
    }

    fn busy_changed(&self, busy: bool) {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        let result = if busy {
            write!(output, "{}", cformat!("<dim>{}</>", BUSY_TEXT))
        } else {
            queue!(output, MoveToColumn(0), Clear(ClearType::CurrentLine))
        };

        if let Err(e) = result.and_then(|_| output.flush()) {
            debug!("Failed to update busy indicator: {}", e);
        }
    }
}
