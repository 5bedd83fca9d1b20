use clap::{Arg, Command};
use colored::Colorize;

mod config;
mod executor;
mod generator;
mod http_client;
mod menu;
mod session;
mod suggestion;
mod system_info;

use config::Config;
use executor::SystemProcessRunner;
use generator::{LlmGenerator, MockGenerator, SuggestionGenerator};
use session::Session;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let matches = Command::new("askg")
        .about("AI-powered shell command suggester")
        .long_about(
            "askg turns a natural-language query into shell command suggestions, \
             lets you pick or refine one, runs it, and offers to fix it when it fails",
        )
        .arg(
            Arg::new("query")
                .help("Natural-language description of the command you need")
                .num_args(1..),
        )
        .get_matches();

    let query_words: Vec<String> = matches
        .get_many::<String>("query")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    if query_words.is_empty() {
        eprintln!("{}", "Usage: askg <query>".red());
        std::process::exit(1);
    }
    let query = query_words.join(" ");

    let config = Config::load()?;
    let generator: Box<dyn SuggestionGenerator> = if config.is_mock_mode() {
        Box::new(MockGenerator::new())
    } else {
        Box::new(LlmGenerator::new(config.api_key()?))
    };

    let session = Session::new(generator, Box::new(SystemProcessRunner));

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    session.run(&query, &mut input, &mut output).await
}
