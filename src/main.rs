use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use agent_router::agent::presets::{self, DEMO_REQUEST};
use agent_router::agent::{Agent, AgentRequest};
use agent_router::config::{Config, Credentials};
use agent_router::llm::{LlmClient, build_client};
use agent_router::output;
use cli::Cli;
use cli::commands::Commands;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agent-router")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("agent-router.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Apply command-line overrides on top of the loaded config
fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(provider) = cli.provider {
        config.llm = config.llm.with_provider(provider);
    }
    if let Some(path) = &cli.csv {
        config.csv.path = path.clone();
    }
    if cli.is_verbose() {
        config.agent.verbose = true;
    }
    config
}

async fn run_application(cli: &Cli, config: &Config, credentials: &Credentials) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    if let Some(Commands::Tools) = &cli.command {
        return handle_tools_command(config);
    }

    let llm = build_client(&config.llm, credentials).context("Failed to create LLM client")?;

    let result = match &cli.command {
        None => handle_ask_command(DEMO_REQUEST, llm.clone(), config).await,
        Some(Commands::Ask { question }) => handle_ask_command(question, llm.clone(), config).await,
        Some(Commands::Python { task }) => {
            let agent = presets::python_agent(llm.clone(), config).context("Failed to build python agent")?;
            run_agent(&agent, task).await
        }
        Some(Commands::Csv { question }) => {
            let agent =
                presets::csv_agent(llm.clone(), config, &config.csv.path).context("Failed to build csv agent")?;
            run_agent(&agent, question).await
        }
        Some(Commands::Search { question }) => {
            let agent = presets::search_agent(llm.clone(), config, credentials)
                .context("Failed to build search agent")?;
            run_agent(&agent, question).await
        }
        Some(Commands::Tools) => handle_tools_command(config),
    };

    report_usage(llm.as_ref(), config.agent.verbose);
    result
}

fn report_usage(llm: &dyn LlmClient, verbose: bool) {
    let usage = llm.total_usage();
    let cost = usage.cost_usd(llm.model());
    info!(
        "Session usage on {}: {} input + {} output tokens (~${:.4})",
        llm.model(),
        usage.input_tokens,
        usage.output_tokens,
        cost
    );
    if verbose {
        println!("{}", format!("Tokens: {} (~${:.4})", usage.total(), cost).dimmed());
    }
}

async fn handle_ask_command(question: &str, llm: Arc<dyn LlmClient>, config: &Config) -> Result<()> {
    let router = presets::router_agent(llm, config, &config.csv.path).context("Failed to build router agent")?;
    run_agent(&router, question).await
}

fn handle_tools_command(config: &Config) -> Result<()> {
    info!("Listing router tools");
    for (name, description) in presets::router_tool_descriptions(&config.csv.path) {
        println!("{}", name.green().bold());
        println!("  {}", description);
    }
    Ok(())
}

async fn run_agent(agent: &dyn Agent, input: &str) -> Result<()> {
    info!("Running agent {} on: {}", agent.name(), input);

    let response = agent
        .invoke(AgentRequest::new(input))
        .await
        .with_context(|| format!("Agent {} failed", agent.name()))?;

    let value = response.to_value().context("Failed to serialize response")?;
    let rendered = output::format_response(&value).context("Failed to format response")?;

    println!();
    println!("{}", rendered);
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let config = apply_overrides(config, &cli);
    let credentials = Credentials::from_env();

    info!("Starting with config from: {:?}", cli.config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime
        .block_on(run_application(&cli, &config, &credentials))
        .context("Application failed")?;

    Ok(())
}
