use colored::Colorize;
use inquire::{Confirm, InquireError, Text};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use rust_decimal::Decimal;
use tiptime::prelude::*;
use tiptime::types::StepOperation;
use tracing::debug;

/// One row of the calculation breakdown table.
#[derive(Tabled)]
pub struct StepRow {
    #[tabled(rename = "Step")]
    pub description: String,
    #[tabled(rename = "Operation")]
    pub operation: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Renders the trace of `details`, money steps in the details' currency.
pub fn breakdown_table(details: &TipDetails) -> String {
    let rows: Vec<StepRow> = details
        .calculation_trace
        .iter()
        .map(|step| StepRow {
            description: step.description.clone(),
            operation: format!("{:?}", step.operation),
            value: match (step.operation, step.amount) {
                (StepOperation::Rate, Some(rate)) => format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize()),
                (_, Some(amount)) => details.locale.format_currency(amount),
                (_, None) => String::new(),
            },
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn print_screen(screen: &TipScreen) {
    println!("{}", screen.result.bright_green().bold());
}

/// Interactive loop mirroring the calculator screen. Ctrl+C or Esc ends it.
pub fn run_interactive(config: TipConfig, translator: &Translator, show_trace: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = TipForm::new(config);
    let screen = form.screen(translator);

    println!("\n{}", screen.title.bright_cyan().bold());
    println!("{}", "Press Esc or Ctrl+C at any prompt to exit.".dimmed());
    println!();

    loop {
        match prompt_once(&mut form, translator) {
            Ok(()) => {}
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                debug!("interactive session ended by user");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        print_screen(&form.screen(translator));
        if show_trace {
            let details = form.details()?;
            println!("{}", breakdown_table(&details));
        }
        println!();
    }
}

fn prompt_once(form: &mut TipForm, translator: &Translator) -> Result<(), InquireError> {
    let screen = form.screen(translator);
    let default_hint = form.config().default_tip_percent.normalize().to_string();

    let amount = Text::new(&format!("{}:", screen.amount_label))
        .with_initial_value(form.amount_input())
        .with_placeholder("0.00")
        .prompt()?;
    form.on_amount_change(amount);

    let tip = Text::new(&format!("{} (%):", screen.tip_label))
        .with_initial_value(form.tip_input())
        .with_placeholder(&default_hint)
        .prompt()?;
    form.on_tip_change(tip);

    let round_up = Confirm::new(&screen.round_up_label)
        .with_default(form.round_up())
        .prompt()?;
    form.on_round_up_changed(round_up);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_breakdown_table_lists_steps() {
        let details = TipCalculator::new(TipLocale::EnUS)
            .calculate(&TipRequest::new(dec!(10)).unwrap().percent(15).unwrap().round_up(true))
            .unwrap();
        let table = breakdown_table(&details);

        assert!(table.contains("Bill Amount"));
        assert!(table.contains("$10.00"));
        assert!(table.contains("15%"));
        assert!(table.contains("$1.50"));
        assert!(table.contains("Rounded Up"));
        assert!(table.contains("$2.00"));
    }
}
