//! Terminal rendering of answers and history

use chrono::{Local, TimeZone};
use colored::*;

use historystore::{HistoryLog, StructuredAnswer};

/// Print the four answer sections
pub fn print_answer(answer: &StructuredAnswer) {
    println!();
    println!("{}", "Short Answer".bright_cyan().bold());
    println!("  {}", answer.one_line);
    println!();
    println!("{}", "Explanation".bright_cyan().bold());
    println!("  {}", answer.two_lines);
    println!();
    println!("{}", "Detailed Concept".bright_cyan().bold());
    println!("  {}", answer.five_lines);
    println!();
    println!("{}", "Diagram".bright_cyan().bold());
    println!("  {}", answer.diagram_description.italic());
    println!();
}

/// Print a history log, newest first, numbered for selection
pub fn print_history(log: &HistoryLog) {
    if log.is_empty() {
        println!("{}", "No history yet.".dimmed());
        return;
    }

    println!();
    for (i, item) in log.iter().enumerate() {
        let when = Local
            .timestamp_millis_opt(item.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("  {:3}. {} {}", i + 1, when.dimmed(), item.question.bold());
        println!("       {}", item.answer.one_line);
    }
    println!();
}
