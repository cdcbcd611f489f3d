//! REPL session management

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::genai::AnswerService;
use crate::render;
use crate::session::{DiagramState, SessionController, SessionState};
use historystore::HistoryStore;

/// Interactive tutoring session
pub struct ReplSession {
    controller: SessionController,
}

enum SlashResult {
    Continue,
    Quit,
}

/// Parse a /show argument. Indices are 1-based; 0 is not a valid index.
fn parse_show_index(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|&n| n >= 1)
}

impl ReplSession {
    pub fn new(service: Arc<dyn AnswerService>, store: HistoryStore) -> Self {
        Self {
            controller: SessionController::new(service, store),
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_file: Option<PathBuf>) -> Result<()> {
        self.print_welcome();

        if let Some(path) = initial_file {
            self.open_document(&path);
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.ask(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Tutor Interactive Session".bright_cyan().bold());
        println!(
            "Open a chapter with {}, then type a question. {} for help, {} to quit",
            "/open <file>".yellow(),
            "/help".yellow(),
            "/quit".yellow()
        );
        println!();
    }

    /// Handle slash commands
    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/open" | "/o" => {
                match parts.get(1) {
                    Some(path) => self.open_document(Path::new(path)),
                    None => println!("Usage: {}", "/open <file>".yellow()),
                }
                SlashResult::Continue
            }
            "/history" => {
                render::print_history(self.controller.history());
                SlashResult::Continue
            }
            "/show" => {
                match parts.get(1).and_then(|n| parse_show_index(n)) {
                    Some(n) => self.show_history_item(n),
                    None => println!("Usage: {} (index from /history)", "/show <n>".yellow()),
                }
                SlashResult::Continue
            }
            "/diagram" | "/d" => {
                let out = parts.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("diagram.png"));
                self.fetch_diagram(&out).await;
                SlashResult::Continue
            }
            "/clear" | "/c" => {
                self.controller.clear_answer();
                println!("{}", "Answer cleared.".dimmed());
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:18} Open a document (PDF chapter)", "/open <file>".yellow());
        println!("  {:18} Show this document's Q&A history", "/history".yellow());
        println!("  {:18} Restore a past answer by index", "/show <n>".yellow());
        println!("  {:18} Render the answer's diagram to a file", "/diagram [path]".yellow());
        println!("  {:18} Clear the current answer", "/clear".yellow());
        println!("  {:18} Show this help", "/help".yellow());
        println!("  {:18} Exit the session", "/quit".yellow());
        println!();
        println!("Anything else is asked as a question about the open document.");
        println!();
    }

    fn open_document(&mut self, path: &Path) {
        self.controller.select_document(path);

        match self.controller.state() {
            SessionState::Failed => {
                if let Some(e) = self.controller.error() {
                    println!("{} {}", "✗".red(), e);
                }
            }
            _ => {
                println!(
                    "{} Opened {} ({} past questions)",
                    "✓".green(),
                    self.controller.document_name().unwrap_or("?").cyan(),
                    self.controller.history().len()
                );
            }
        }
    }

    async fn ask(&mut self, question: &str) {
        if !self.controller.has_document() {
            println!("{} No document open. Use {} first.", "✗".red(), "/open <file>".yellow());
            return;
        }

        println!("{}", "Thinking...".dimmed());
        self.controller.submit_question(question).await;

        match self.controller.state() {
            SessionState::AnswerReady => {
                if let Some(answer) = self.controller.answer() {
                    render::print_answer(answer);
                    println!(
                        "{}",
                        format!("Use {} to render the diagram.", "/diagram").dimmed()
                    );
                }
            }
            SessionState::Failed => {
                if let Some(e) = self.controller.error() {
                    println!("{} {}", "✗".red(), e);
                }
            }
            _ => {}
        }
    }

    fn show_history_item(&mut self, index: usize) {
        let Some(item) = self.controller.history().get(index - 1) else {
            println!("{} No history item {}", "?".yellow(), index);
            return;
        };
        let id = item.id.clone();

        if self.controller.select_history_item(&id)
            && let Some(answer) = self.controller.answer()
        {
            println!(
                "{} {}",
                "Q:".bright_green(),
                self.controller.question().unwrap_or_default().bold()
            );
            render::print_answer(answer);
        }
    }

    async fn fetch_diagram(&mut self, out: &Path) {
        if self.controller.answer().is_none() {
            println!("{} No answer to illustrate yet.", "?".yellow());
            return;
        }

        println!("{}", "Generating diagram...".dimmed());
        self.controller.retry_diagram().await;

        match self.controller.diagram() {
            DiagramState::Ready(bytes) => match fs::write(out, bytes) {
                Ok(()) => println!("{} Diagram written to {}", "✓".green(), out.display().to_string().cyan()),
                Err(e) => println!("{} Could not write {}: {}", "✗".red(), out.display(), e),
            },
            DiagramState::Failed(message) => {
                println!("{} {} (try {} again)", "✗".red(), message, "/diagram".yellow());
            }
            _ => {}
        }
    }
}
