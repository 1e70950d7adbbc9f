pub mod prompt;
pub mod view;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use eyre::Result;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::debug;
use view::TerminalView;

use genx_trade_desk::advice::{AdviceService, WidgetCopy};
use genx_trade_desk::chat::{AssistantWidget, SendOutcome};

const HELP_TEXT: &str = "
GenX Trade Desk

/clear        Start a fresh conversation
/help         Show this help dialogue
/quit         Quit the application

Ask for Mandi prices, FOB/CIF terms or export quality parameters.
";

pub struct ChatContext {
    view: Arc<TerminalView>,
    input: Option<String>,
    interactive: bool,
    copy: WidgetCopy,
    advice: Arc<dyn AdviceService>,
    widget: AssistantWidget,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write + Send>,
        input: Option<String>,
        interactive: bool,
        copy: WidgetCopy,
        advice: Arc<dyn AdviceService>,
    ) -> Result<Self> {
        let view = Arc::new(TerminalView::new(output));
        let widget = AssistantWidget::new(copy.clone(), advice.clone(), view.clone())?;

        Ok(Self {
            view,
            input,
            interactive,
            copy,
            advice,
            widget,
        })
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            self.handle_input(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            self.view.print("\n/help for commands, /quit to leave")?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(None);
            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    self.handle_input(&line).await?;
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    self.view.print(&format!("Error: {}", e))?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                self.view.print(HELP_TEXT)?;
            }
            "/clear" => {
                self.widget =
                    AssistantWidget::new(self.copy.clone(), self.advice.clone(), self.view.clone())?;
            }
            _ => {
                let outcome = self.widget.send(input).await;
                debug!("Chat round trip finished: {:?}", outcome);
                if let SendOutcome::Rejected(reason) = outcome {
                    self.view.print(&format!("Message not sent ({:?})", reason))?;
                }
            }
        }

        Ok(())
    }
}
