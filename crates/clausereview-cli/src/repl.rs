//! Interactive review session.
//!
//! Each line is one event for the [`ReviewSession`] state machine.

use std::path::Path;

use anyhow::Context;
use clausereview_ai::Reader;
use clausereview_core::{find_category, load_categories_and_questions};
use clausereview_host::{AppContext, ReviewSession, RunOutcome};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::display;

const HELP: &str = "\
  upload <path>              save and index a contract
  select <cat>[; <cat>...]   add clause categories to the selection
  deselect <cat>             remove a category from the selection
  run                        review the selected clauses
  stop                       skip the next run until reset
  reset                      clear selection, stop flag, and upload
  show                       print the uploaded contract
  questions [--full]         list clause categories
  status                     show session state
  help                       this message
  quit                       leave the session";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Upload(String),
    Select(Vec<String>),
    Deselect(String),
    Run,
    Stop,
    Reset,
    Show,
    Questions { full: bool },
    Status,
    Help,
    Quit,
    Empty,
}

/// Parse one input line. Errors are user-facing messages.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "upload" if !rest.is_empty() => Command::Upload(rest.to_string()),
        "upload" => return Err("usage: upload <path>".into()),
        "select" => {
            let names: Vec<String> = rest
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err("usage: select <category>[; <category>...]".into());
            }
            Command::Select(names)
        }
        "deselect" if !rest.is_empty() => Command::Deselect(rest.to_string()),
        "deselect" => return Err("usage: deselect <category>".into()),
        "run" => Command::Run,
        "stop" => Command::Stop,
        "reset" => Command::Reset,
        "show" => Command::Show,
        "questions" => Command::Questions {
            full: rest == "--full",
        },
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(command)
}

/// Read commands until `quit` or end of input.
pub fn run_session<R: Reader>(ctx: &mut AppContext<R>) -> anyhow::Result<()> {
    let mut session = ReviewSession::new();
    let mut rl = DefaultEditor::new()?;

    println!("{}", "clausereview session".bold());
    println!("{HELP}");
    println!();

    loop {
        match rl.readline("review> ") {
            Ok(line) => {
                let input = line.trim();
                if !input.is_empty() {
                    let _ = rl.add_history_entry(input);
                }
                match parse_command(input) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = handle(ctx, &mut session, command) {
                            println!("{}", format!("{e:#}").red());
                        }
                    }
                    Err(message) => println!("{}", message.red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle<R: Reader>(
    ctx: &mut AppContext<R>,
    session: &mut ReviewSession,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Upload(path) => {
            let name = upload(ctx, Path::new(&path))?;
            session.on_upload(&name);
        }
        Command::Select(names) => {
            for name in names {
                match find_category(&name) {
                    Some(question) => {
                        if !session.select(question) {
                            println!("{} already selected", question.category);
                        }
                    }
                    None => println!("{}", format!("unknown category: {name}").red()),
                }
            }
            display::print_status(session);
        }
        Command::Deselect(name) => {
            let category = match find_category(&name) {
                Some(question) => question.category,
                None => name.as_str(),
            };
            if !session.deselect(category) {
                println!("{name} is not selected");
            }
        }
        Command::Run => {
            let params = ctx.params();
            match session.on_run(&mut ctx.pipeline(), params)? {
                RunOutcome::Completed(predictions) => display::print_predictions(&predictions),
                RunOutcome::Stopped => {
                    println!("{}", "Prediction stopped. Reset to run again.".yellow())
                }
                RunOutcome::NothingSelected => {}
                RunOutcome::NoDocument => println!("Upload a contract first."),
            }
        }
        Command::Stop => session.on_stop(),
        Command::Reset => {
            session.reset();
            println!("Session reset.");
        }
        Command::Show => match session.uploaded() {
            Some(name) => display::print_view(&ctx.contract_view(name)),
            None => println!("Upload a contract first."),
        },
        Command::Questions { full } => {
            display::print_questions(load_categories_and_questions(), full)
        }
        Command::Status => display::print_status(session),
        Command::Help => println!("{HELP}"),
        Command::Quit | Command::Empty => {}
    }
    Ok(())
}

/// Ingest a file from disk under its own file name.
pub fn upload<R: Reader>(ctx: &mut AppContext<R>, path: &Path) -> anyhow::Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let report = ctx.ingest(&name, &bytes)?;
    display::print_ingest(&report);
    Ok(name)
}
