use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use briefing_chat::app::App;
use briefing_chat::tui::{self, EventHandler};
use briefing_chat::{briefing, handler, logging, session, ui};
use briefing_chat::{Backend, Config, NewsClient};

#[derive(Parser)]
#[command(name = "briefing-chat")]
#[command(about = "Read the daily news briefing and ask follow-up questions")]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "BRIEFING_CHAT_URL")]
    base_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Tui,
    /// Print today's briefing as Markdown
    Briefing,
    /// Ask one question and print the answer
    Ask {
        /// Your question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &cli.base_url {
        config.base_url = Some(url.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client = NewsClient::with_timeout(config.base_url(), config.request_timeout())?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            logging::init_file(&config.log_file()?)?;
            run_tui(Arc::new(client)).await?
        }
        Commands::Briefing => {
            logging::init_stderr()?;
            print_briefing(&client).await
        }
        Commands::Ask { question } => {
            logging::init_stderr()?;
            let reply = session::ask(&client, &question.join(" ")).await?;
            println!("{}", reply);
        }
    }

    Ok(())
}

async fn run_tui(backend: Arc<dyn Backend>) -> Result<()> {
    tracing::info!("starting interactive session");
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(backend, events.sender());
    app.start_briefing();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    tracing::info!("session closed");
    result
}

async fn print_briefing(client: &NewsClient) {
    let result = client.fetch_briefing().await;
    if let Err(e) = &result {
        let detail = format!("{e:#}");
        tracing::error!(error = %detail, "briefing request failed");
    }
    println!("{}", briefing::message_for(&result));
}
