//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Kilde Setup");
    println!();
    println!("Welcome to Kilde! Let's make sure everything is configured correctly.\n");

    // Step 1: API keys
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Kilde requires an OpenAI API key for embeddings.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!();
    } else {
        Output::success("OpenAI API key is configured!");
    }

    let completion_key_env = &settings.completion.api_key_env;
    if std::env::var(completion_key_env).is_err() {
        Output::warning(&format!(
            "{} environment variable is not set (needed for chat completions).",
            completion_key_env
        ));
        println!();
    } else {
        Output::success("Completion API key is configured!");
    }

    // Step 2: Qdrant
    println!();
    println!("{}", style("Step 2: Vector store").bold().cyan());
    println!();
    Output::kv("Provider", &settings.vector_store.provider);
    Output::kv("Qdrant URL", &settings.vector_store.qdrant_url);
    println!();
    println!("  Make sure a Qdrant instance is reachable at that address, e.g.:");
    println!(
        "  {}",
        style("docker run -p 6333:6333 qdrant/qdrant").green()
    );

    // Step 3: Directories
    println!();
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    let uploads_dir = settings.uploads_dir();

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    if !uploads_dir.exists() {
        std::fs::create_dir_all(&uploads_dir)?;
        Output::success(&format!(
            "Created uploads directory: {}",
            uploads_dir.display()
        ));
    } else {
        Output::info(&format!(
            "Uploads directory exists: {}",
            uploads_dir.display()
        ));
    }

    // Step 4: Config file
    println!();
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Start the API server", style("kilde serve").cyan());
    println!(
        "  {} Index some text",
        style("curl -X POST localhost:3000/indexing -d '{\"textContent\":\"...\"}'").cyan()
    );
    println!();
    println!("For more help: {}", style("kilde --help").cyan());

    Ok(())
}

/// Prompt the user to continue with a yes/no question.
fn prompt_continue(question: &str) -> anyhow::Result<bool> {
    print!("{} [Y/n] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();

    Ok(input.is_empty() || input == "y" || input == "yes")
}
