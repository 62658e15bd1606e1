//! Terminal rendering for predictions, the clause catalogue, and contract text.

use clausereview_core::{ClauseQuestion, Prediction};
use clausereview_host::{DocumentView, IngestReport, ReviewSession};
use colored::Colorize;

const MAX_CONTEXT_CHARS: usize = 240;

// ── Predictions ──

/// Print each prediction as a card: category header, then ranked answers.
pub fn print_predictions(predictions: &[Prediction]) {
    for prediction in predictions {
        print_prediction(prediction);
    }
}

fn print_prediction(prediction: &Prediction) {
    let header = prediction.category.as_deref().unwrap_or(&prediction.query);
    println!("{}", format!("=== {header} ===").bold());

    if prediction.answers.is_empty() {
        println!("  {}", "(no answer found)".dimmed());
        println!();
        return;
    }

    for (i, answer) in prediction.answers.iter().enumerate() {
        println!(
            "  {:>2}. {}  {}",
            i + 1,
            format!("{:.3}", answer.score).cyan(),
            answer.answer
        );
        println!(
            "      {:<10} {}",
            "source".dimmed(),
            answer.meta_name.dimmed()
        );
        println!(
            "      {:<10} {}",
            "context".dimmed(),
            truncate(&answer.context.replace('\n', " "), MAX_CONTEXT_CHARS).dimmed()
        );
    }
    println!();
}

pub fn print_predictions_json(predictions: &[Prediction]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(predictions)?);
    Ok(())
}

// ── Catalogue ──

pub fn print_questions(questions: &[ClauseQuestion], full: bool) {
    for (i, q) in questions.iter().enumerate() {
        println!("  {:>2}  {}", i + 1, q.category);
        if full {
            println!("      {}", q.question.dimmed());
        }
    }
    println!("  ({} categories)", questions.len());
}

// ── Ingest / session ──

pub fn print_ingest(report: &IngestReport) {
    println!(
        "{} {} ({} passages, {} indexed in total)",
        "Ingested".green(),
        report.name,
        report.passages,
        report.total_passages
    );
    println!(
        "  saved to {} at {}",
        report.path.display(),
        report.ingested_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

pub fn print_view(view: &DocumentView) {
    match view {
        DocumentView::Rendered(text) => println!("{text}"),
        DocumentView::Degraded(message) => println!("{}", message.yellow()),
    }
}

pub fn print_status(session: &ReviewSession) {
    println!("{:<12} {:?}", "state", session.state());
    println!(
        "{:<12} {}",
        "contract",
        session.uploaded().unwrap_or("(none)")
    );
    println!(
        "{:<12} {}",
        "stopped",
        if session.is_stopped() { "yes" } else { "no" }
    );
    let selected: Vec<&str> = session.selection().iter().map(|q| q.category).collect();
    if selected.is_empty() {
        println!("{:<12} (none)", "selected");
    } else {
        println!("{:<12} {}", "selected", selected.join("; "));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate("governed by Delaware law", 100), "governed by Delaware law");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("€€€€", 2), "€€...");
        assert_eq!(truncate("€€", 2), "€€");
    }
}
