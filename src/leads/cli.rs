use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use colored::Colorize;

use crate::api::LeadClient;
use crate::config::Config;
use crate::feedback::{self, NoticeQueue};
use crate::flow::{self, SubmitOutcome};
use crate::leads::form::FormState;
use crate::leads::schema::{FieldKind, FieldRule};
use crate::leads::{ContactDraft, ContactService, Gender, KundliDraft, KundliService, LeadDraft};
use crate::notify;

pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Sends a contact message. Prompts on stdin for missing or rejected fields when `interactive`.
pub fn run_contact_flow(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    seed: ContactDraft,
    interactive: bool,
) -> Result<()> {
    let mut stdin = io::stdin().lock();
    contact_loop(rt, config, seed, interactive.then_some(&mut stdin))
}

pub fn run_kundli_flow(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    seed: KundliDraft,
    interactive: bool,
) -> Result<()> {
    let mut stdin = io::stdin().lock();
    kundli_loop(rt, config, seed, interactive.then_some(&mut stdin))
}

fn contact_loop<R: BufRead>(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    seed: ContactDraft,
    mut input: Option<&mut R>,
) -> Result<()> {
    let client = LeadClient::from_config(config);
    let mut form = FormState::with_draft(seed);
    let mut notices = NoticeQueue::new();

    println!();
    println!("{}", "Send us a Message".bright_cyan().bold());
    if let Some(input) = input.as_deref_mut() {
        fill_missing(&mut form, input)?;
    }

    loop {
        println!("{}", "Sending...".bright_cyan());
        let outcome = rt.block_on(flow::submit_contact(&mut form, &client, &mut notices));
        feedback::cli::print_notices(&mut notices);

        if outcome.is_success() {
            return Ok(());
        }
        match (outcome, input.as_deref_mut()) {
            (SubmitOutcome::Invalid { .. }, Some(input)) => refill_invalid(&mut form, input)?,
            (outcome, _) => return Err(rejected(outcome)),
        }
    }
}

fn kundli_loop<R: BufRead>(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    seed: KundliDraft,
    mut input: Option<&mut R>,
) -> Result<()> {
    let client = LeadClient::from_config(config);
    let opener = notify::opener_for(config.messaging.open_links);
    let mut form = FormState::with_draft(seed);
    let mut notices = NoticeQueue::new();

    println!();
    println!("{}", "Kundli Request".bright_magenta().bold());
    if let Some(input) = input.as_deref_mut() {
        fill_missing(&mut form, input)?;
    }

    loop {
        println!("{}", "Submitting request...".bright_cyan());
        let outcome = rt.block_on(flow::submit_kundli(
            &mut form,
            &client,
            &config.messaging,
            opener.as_ref(),
            Local::now().naive_local(),
            &mut notices,
        ));
        feedback::cli::print_notices(&mut notices);

        match (outcome, input.as_deref_mut()) {
            (SubmitOutcome::Submitted { whatsapp_url, .. }, _) => {
                if !opener.launches() {
                    println!();
                    println!("{}", "Open this link to send the request on WhatsApp:".bright_white());
                }
                println!("  {}", whatsapp_url.bright_black());
                return Ok(());
            }
            (SubmitOutcome::Invalid { .. }, Some(input)) => refill_invalid(&mut form, input)?,
            (outcome, _) => return Err(rejected(outcome)),
        }
    }
}

fn rejected(outcome: SubmitOutcome) -> anyhow::Error {
    match outcome {
        SubmitOutcome::Invalid { errors } => anyhow!("Lead not sent, invalid fields: {errors}"),
        SubmitOutcome::Failed { message } => anyhow!(message),
        SubmitOutcome::Busy => anyhow!("Lead not sent, a submission is already in progress"),
        SubmitOutcome::Sent { .. } | SubmitOutcome::Submitted { .. } => {
            anyhow!("Lead was already delivered")
        }
    }
}

/// Prompts for every field the user has not supplied yet.
fn fill_missing<D: LeadDraft, R: BufRead>(form: &mut FormState<D>, input: &mut R) -> Result<()> {
    for rule in D::SCHEMA {
        let empty = form
            .draft()
            .field(rule.field)
            .map(|value| value.trim().is_empty())
            .unwrap_or(true);
        if empty {
            prompt_field(form, rule, input)?;
        }
    }
    Ok(())
}

fn refill_invalid<D: LeadDraft, R: BufRead>(form: &mut FormState<D>, input: &mut R) -> Result<()> {
    println!();
    println!("{}", "Please correct the highlighted fields:".bright_yellow());
    let errors = form.errors().clone();
    for rule in D::SCHEMA {
        if errors.get(rule.field).is_some() {
            prompt_field(form, rule, input)?;
        }
    }
    Ok(())
}

fn prompt_field<D: LeadDraft, R: BufRead>(
    form: &mut FormState<D>,
    rule: &FieldRule,
    input: &mut R,
) -> Result<()> {
    let value = match rule.kind {
        FieldKind::OneOf { choices, prompt } => {
            let options = choices
                .iter()
                .map(|code| choice_label(code))
                .collect::<Vec<_>>();
            let index = prompt_choice(prompt, &options, input)?;
            choices[index].to_string()
        }
        _ if !rule.is_required() => {
            prompt_text(&format!("{} (optional, Enter to skip):", rule.label), input)?
        }
        _ => prompt_text(&format!("{}:", rule.label), input)?,
    };
    form.update(rule.field, value)?;
    Ok(())
}

fn choice_label(code: &str) -> String {
    if let Ok(service) = code.parse::<ContactService>() {
        return service.label().to_string();
    }
    if let Ok(gender) = code.parse::<Gender>() {
        return gender.display();
    }
    if let Ok(service) = code.parse::<KundliService>() {
        return format!("{} ({})", service.label(), service.price());
    }
    code.to_string()
}

fn read_input_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        bail!("stdin closed before the form was complete");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_text<R: BufRead>(prompt: &str, input: &mut R) -> Result<String> {
    print!("{} ", prompt.bright_white());
    let _ = io::stdout().flush();

    Ok(read_input_line(input)?.trim().to_string())
}

fn prompt_choice<R: BufRead>(prompt: &str, options: &[String], input: &mut R) -> Result<usize> {
    loop {
        println!("{}", prompt.bright_white());
        for (i, opt) in options.iter().enumerate() {
            println!("  {} {}", format!("{:>2}.", i + 1).bright_black(), opt);
        }
        print!("{} ", "Enter a number:".bright_yellow());
        let _ = io::stdout().flush();

        let line = read_input_line(input)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            println!("{}", "Please enter a number.".bright_yellow());
            continue;
        }
        if let Some(n) = parse_choice_number(trimmed, options.len()) {
            return Ok(n);
        }
        println!("{}", "Invalid choice. Try again.".bright_red());
        println!();
    }
}

fn parse_choice_number(input: &str, option_count: usize) -> Option<usize> {
    let n = input.parse::<usize>().ok()?;
    (n >= 1 && n <= option_count).then(|| n - 1)
}
