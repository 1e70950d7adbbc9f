//! Terminal rendition of the quote intake wizard.

use std::process::ExitCode;
use std::sync::Arc;

use color_print::cprintln;
use eyre::Result;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use tracing::info;

use genx_trade_desk::catalog::{self, GENERAL_INQUIRY};
use genx_trade_desk::quote::{
    EmailDelivery, IntakeEvent, QuoteForm, QuoteIntake, QuoteStep, QuoteTimings, SubmitOutcome,
};

use crate::cli::chat::prompt;

/// What the user typed at a prompt.
enum Answer {
    Text(String),
    Back,
    Abort,
}

fn ask(rl: &mut Editor<()>, label: &str, initial: &str) -> Result<Answer> {
    let prompt_text = format!("{label}: ");
    match rl.readline_with_initial(&prompt_text, (initial, "")) {
        Ok(line) if line.trim() == "back" => Ok(Answer::Back),
        Ok(line) => Ok(Answer::Text(line)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(Answer::Abort),
        Err(e) => Err(e.into()),
    }
}

fn print_targets(selected: &str) {
    cprintln!("\n<bold>Inquiry Type</>");
    let marker = |id: &str| if id == selected { "*" } else { " " };
    println!(" {} 0) General Trade", marker(GENERAL_INQUIRY));
    for (i, product) in catalog::quick_picks().iter().enumerate() {
        println!(" {} {}) {}", marker(product.id), i + 1, product.name);
    }
}

fn parse_target(choice: &str, current: &str) -> String {
    match choice.trim() {
        "" => current.to_string(),
        "0" => GENERAL_INQUIRY.to_string(),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| catalog::quick_picks().get(i))
            .map_or_else(|| current.to_string(), |product| product.id.to_string()),
    }
}

pub struct QuoteSession {
    intake: QuoteIntake,
    events: tokio::sync::mpsc::UnboundedReceiver<IntakeEvent>,
}

impl QuoteSession {
    pub fn new(contact: &str, delivery: Arc<dyn EmailDelivery>, product: Option<&str>) -> Self {
        let mut form = QuoteForm::new(contact);
        form.open(product);
        let (intake, events) = QuoteIntake::new(form, delivery, QuoteTimings::default());
        Self { intake, events }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        let mut rl = prompt::rl()?;
        cprintln!("<bold>Export Consultation</> <dim>(type 'back' on step 2 to revise, Ctrl-D to cancel)</>");

        loop {
            let step = self.intake.form().step();
            let keep_going = match step {
                QuoteStep::Requirements => self.requirements_step(&mut rl)?,
                QuoteStep::Contact => self.contact_step(&mut rl).await?,
                QuoteStep::Submitting | QuoteStep::Submitted => break,
            };
            if !keep_going {
                cprintln!("<dim>Enquiry cancelled.</>");
                return Ok(ExitCode::FAILURE);
            }
        }

        // Show the confirmation until the form closes and clears itself.
        while let Some(event) = self.events.recv().await {
            match event {
                IntakeEvent::Submitted => {
                    cprintln!("<green,bold>Enquiry received.</> Our export team will reply within one business day.");
                }
                IntakeEvent::Closed => info!("Quote form closed"),
                IntakeEvent::Reset => break,
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    fn requirements_step(&mut self, rl: &mut Editor<()>) -> Result<bool> {
        let current = self.intake.form().request().clone();
        print_targets(&current.product_id);

        let Answer::Text(choice) = ask(rl, "Choice", "")? else {
            return Ok(false);
        };
        let Answer::Text(quantity) = ask(rl, "Quantity / Units", &current.quantity)? else {
            return Ok(false);
        };
        let Answer::Text(requirements) = ask(rl, "Message / Specifications", &current.requirements)?
        else {
            return Ok(false);
        };

        let mut form = self.intake.form();
        let fields = form.edit()?;
        fields.product_id = parse_target(&choice, &current.product_id);
        fields.quantity = quantity;
        fields.requirements = requirements;

        if let Err(e) = form.next() {
            cprintln!("<red>{}</>", e);
        }
        Ok(true)
    }

    async fn contact_step(&mut self, rl: &mut Editor<()>) -> Result<bool> {
        let current = self.intake.form().request().clone();
        cprintln!("\n<bold>Contact Details</>");

        let full_name = match ask(rl, "Full Name", &current.full_name)? {
            Answer::Text(text) => text,
            Answer::Back => return self.go_back(),
            Answer::Abort => return Ok(false),
        };
        let email = match ask(rl, "Email", &current.email)? {
            Answer::Text(text) => text,
            Answer::Back => return self.go_back(),
            Answer::Abort => return Ok(false),
        };

        {
            let mut form = self.intake.form();
            let fields = form.edit()?;
            fields.full_name = full_name;
            fields.email = email;
        }

        cprintln!("<dim>Sending enquiry...</>");
        match self.intake.submit().await {
            Ok((SubmitOutcome::Delivered, _)) => {}
            Ok((SubmitOutcome::Failed(message), _)) => {
                cprintln!("<red>{}</>", message);
                self.intake.form().dismiss_error();
            }
            Err(e) => cprintln!("<red>{}</>", e),
        }
        Ok(true)
    }

    fn go_back(&mut self) -> Result<bool> {
        self.intake.form().back()?;
        Ok(true)
    }
}
