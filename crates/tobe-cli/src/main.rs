//! tobe - chat session CLI with summary compaction

mod commands;
mod config;
mod console;

use clap::Parser;
use std::sync::Arc;
use tobe_ai::{
    ImageProvider, ImageRequest, ImageSize,
    providers::openai::{DEFAULT_SUMMARY_MODEL, OpenAIProvider},
};
use tobe_session::{
    CompactionConfig, InputPort, OutputPort, SessionConfig, SessionController,
    UsageAfterCompaction,
};

use crate::commands::Command;
use crate::console::{ConsoleInput, ConsoleOutput};

/// tobe - chat session with automatic summary compaction
#[derive(Parser, Debug)]
#[command(name = "tobe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: gpt-3.5-turbo)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature for conversation summaries
    #[arg(long)]
    temperature: Option<f32>,

    /// Tokens consumed before the conversation is compacted
    #[arg(long)]
    ceiling: Option<u64>,

    /// Run a single turn with this prompt and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Generate an image from a prompt instead of chatting
    #[arg(long)]
    image: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::new("tobe=debug,tobe_ai=debug,tobe_session=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {:#}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    let Some(api_key) = cfg.api_key() else {
        eprintln!("Error: No OpenAI API key found");
        eprintln!();
        eprintln!("Set your API key with: export OPENAI_API_KEY=your-key");
        eprintln!("Or add it to config file: tobe --init-config");
        std::process::exit(1);
    };

    let mut provider = OpenAIProvider::new(api_key).with_summary_model(
        cfg.summary_model
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string()),
    );
    if let Some(ref base_url) = cfg.base_url {
        provider = provider.with_base_url(base_url);
    }
    let provider = Arc::new(provider);

    if args.image {
        let size = cfg
            .image_size
            .as_deref()
            .and_then(ImageSize::parse)
            .unwrap_or_default();
        return run_image(provider.as_ref(), size).await;
    }

    let session_config = build_session_config(&args, &cfg);
    let mut session = SessionController::new(session_config, provider.clone(), provider)?;

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&mut session, &command).await;
    }

    run_interactive(&mut session).await
}

/// Merge config with CLI args (CLI takes precedence)
fn build_session_config(args: &Args, cfg: &config::Config) -> SessionConfig {
    let defaults = SessionConfig::default();
    let settings = cfg.compaction.clone().unwrap_or_default();
    let compaction_defaults = CompactionConfig::default();

    let compaction = CompactionConfig {
        enabled: settings.enabled.unwrap_or(compaction_defaults.enabled),
        keep_recent: settings.keep_recent.unwrap_or(compaction_defaults.keep_recent),
        temperature: args
            .temperature
            .or(cfg.temperature)
            .unwrap_or(compaction_defaults.temperature),
        prompt_template: settings
            .prompt_template
            .unwrap_or(compaction_defaults.prompt_template),
        usage_policy: match settings.reset_usage {
            Some(false) => UsageAfterCompaction::Keep,
            _ => UsageAfterCompaction::Reset,
        },
    };

    SessionConfig {
        model: args
            .model
            .clone()
            .or(cfg.model.clone())
            .unwrap_or(defaults.model),
        system_prompt: cfg.system_prompt.clone().unwrap_or(defaults.system_prompt),
        token_ceiling: args
            .ceiling
            .or(cfg.token_ceiling)
            .unwrap_or(defaults.token_ceiling),
        compaction,
        ..defaults
    }
}

async fn run_command(session: &mut SessionController, command: &str) -> anyhow::Result<()> {
    println!("tobe> {}", command);
    println!();

    let mut sink = Silent;
    let outcome = session.turn(command, &mut sink).await?;
    println!("{}", console::format_reply(&outcome.reply));
    println!();
    println!("[Tokens: {}]", outcome.usage.total_tokens);
    Ok(())
}

/// Output port for one-shot mode, which prints the reply itself
struct Silent;

impl OutputPort for Silent {
    fn render(&mut self, _history: &[tobe_ai::Message], _used_tokens: u64) {}
}

/// Compact on request, then redraw the conversation with the new token count
async fn compact_and_render(
    session: &mut SessionController,
    output: &mut dyn OutputPort,
) -> tobe_session::Result<()> {
    session.compact_now(output).await?;
    output.render(session.conversation().history(), session.budget().used());
    Ok(())
}

async fn run_interactive(session: &mut SessionController) -> anyhow::Result<()> {
    let mut input = ConsoleInput::stdin();
    let mut output = ConsoleOutput::stdout();

    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        let id = session.id().to_string();
        eprintln!("tobe ({}) session: {}", session.config().model, &id[..8]);
        eprintln!("Type /help for available commands.");
        eprintln!();
    }

    let label = session.config().prompt_label.clone();
    while let Some(line) = input.read_user_input(&label)? {
        // Handle slash commands
        if let Some(command) = commands::parse(&line) {
            match command {
                Command::Exit => break,
                Command::Help => println!("{}", commands::help_message()),
                Command::Usage => {
                    let budget = session.budget();
                    println!(
                        "Tokens used: {} / {} ({} turns, {:?})",
                        budget.used(),
                        budget.ceiling(),
                        session.turns(),
                        session.compaction_state()
                    );
                }
                Command::Compact => {
                    if let Err(e) = compact_and_render(session, &mut output).await {
                        eprintln!("Error: {}", e);
                    }
                }
                Command::Model(None) => println!("Current model: {}", session.config().model),
                Command::Model(Some(model)) => {
                    println!("Switched to: {}", model);
                    session.set_model(model);
                }
                Command::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        match session.turn(line, &mut output).await {
            Ok(_) => {}
            Err(e) if e.is_turn_failure() => {
                eprintln!("Error: {}", e);
                if e.provider_error().is_some_and(|p| p.is_auth()) {
                    eprintln!("Check your API key (OPENAI_API_KEY or tobe --init-config).");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

async fn run_image(provider: &dyn ImageProvider, size: ImageSize) -> anyhow::Result<()> {
    let mut input = ConsoleInput::stdin();

    println!("Image Creator:");
    println!("{}", "-".repeat(100));
    let Some(prompt) = input.read_user_input(">:")? else {
        return Ok(());
    };

    println!("wait response...");
    let response = provider
        .create_image(&ImageRequest::new(prompt, size))
        .await?;

    match response.url() {
        Some(url) => println!("{}", url),
        None => println!("No image returned"),
    }
    println!("Created: {}", response.created_at_display());
    Ok(())
}
