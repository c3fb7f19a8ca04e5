//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::cli::commands::OutputFormat;
use crate::output::formatter::formatter_for;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use switchboard_application::{HandlePromptInput, HandlePromptUseCase};
use switchboard_domain::PromptResponse;
use tracing::debug;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Status,
    User(String),
    Format(OutputFormat),
    Unknown,
}

fn parse_command(line: &str) -> Command {
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name {
        "/quit" | "/exit" | "/q" => Command::Quit,
        "/help" | "/h" | "/?" => Command::Help,
        "/status" => Command::Status,
        "/user" if !arg.is_empty() => Command::User(arg.to_string()),
        "/json" => Command::Format(OutputFormat::Json),
        "/text" => Command::Format(OutputFormat::Text),
        _ => Command::Unknown,
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<HandlePromptUseCase>,
    user_id: String,
    format: OutputFormat,
}

impl ChatRepl {
    pub fn new(use_case: Arc<HandlePromptUseCase>, user_id: impl Into<String>) -> Self {
        Self {
            use_case,
            user_id: user_id.into(),
            format: OutputFormat::Text,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("switchboard").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_prompt(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("Switchboard - Chat Mode");
        println!("Signed in as: {}", self.user_id);
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /status           - Show connected integrations");
        println!("  /user <id>        - Switch the app user");
        println!("  /json, /text      - Switch output format");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, line: &str) -> bool {
        match parse_command(line) {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => {
                println!();
                Self::print_help();
            }
            Command::Status => self.show_status().await,
            Command::User(user_id) => {
                println!("Now acting as {}", user_id);
                self.user_id = user_id;
            }
            Command::Format(format) => self.format = format,
            Command::Unknown => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn show_status(&self) {
        let result = self.use_case.status(&self.user_id).await;
        self.print_result(result.map_err(|e| e.to_string()));
    }

    async fn process_prompt(&self, prompt: &str) {
        println!();
        debug!("Chat prompt from {}", self.user_id);
        let result = self
            .use_case
            .execute(HandlePromptInput::new(prompt, self.user_id.clone()))
            .await;
        self.print_result(result.map_err(|e| e.to_string()));
    }

    fn print_result(&self, result: Result<PromptResponse, String>) {
        match result {
            Ok(response) => println!("{}", formatter_for(self.format).format(&response)),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
