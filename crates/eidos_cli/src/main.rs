use clap::Parser;
use eidos_core::EidosConfig;
use eidos_engine::{Engine, MockCompletion};
use eidos_memory::{InMemoryRepository, MemoryRepository, SqliteRepository};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the memory database
    #[arg(short, long, default_value = "eidos.db")]
    db: String,

    /// Path to a TOML config file
    #[arg(short, long, default_value = "eidos.toml")]
    config: String,

    /// User id for this session
    #[arg(short, long, default_value = "local")]
    user: String,

    /// Keep everything in memory (no database file)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut config = EidosConfig::load_or_default(&args.config);
    config.memory.db_path = args.db.clone();

    info!("Initializing eidos...");
    let repo: Arc<dyn MemoryRepository> = if args.ephemeral {
        Arc::new(InMemoryRepository::new())
    } else {
        info!("Connecting to memory at {}...", config.memory.db_path);
        Arc::new(SqliteRepository::new(&config.memory.db_path).await?)
    };

    // The completion provider is an external collaborator; the bundled
    // mock keeps the binary usable without one.
    let engine = Engine::new(repo, Arc::new(MockCompletion::default()), &config);

    println!("eidos online. Type 'help' for commands, 'quit' to exit.");
    let mut interview = false;
    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        prompt(interview)?;
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "quit" | "exit" => break,
            "help" => {
                println!("commands: interview, insights, questions, reminders, stats, export, clear, quit");
                println!("anything else is sent to eidos as a chat turn");
                continue;
            }
            "interview" => {
                interview = !interview;
                if interview {
                    let state = engine.dialogue().state().await;
                    println!("\n[interview started]\neidos: {}\n", state.current_question);
                } else {
                    println!("\n[interview paused]\n");
                }
                continue;
            }
            "insights" => {
                let snapshot = engine.insights(&args.user).await?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                continue;
            }
            "questions" => {
                for question in engine.predictive_questions(&args.user).await? {
                    println!("- {question}");
                }
                continue;
            }
            "reminders" => {
                for reminder in engine.reminders(&args.user).await? {
                    println!("- {reminder}");
                }
                continue;
            }
            "stats" => {
                let stats = engine.memory_stats(&args.user).await?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
                continue;
            }
            "export" => {
                match engine.export_profile(&args.user).await {
                    Ok(blob) => println!("{blob}"),
                    Err(e) => println!("[no profile to export: {e}]"),
                }
                continue;
            }
            "clear" => {
                engine.clear_user_memories(&args.user).await?;
                println!("[all memories cleared for {}]", args.user);
                continue;
            }
            _ => {}
        }

        if interview {
            let state = engine.dialogue().process_response(line).await;
            println!(
                "\n[stage: {} | accuracy: {}%]\neidos: {}\n",
                state.stage, state.prediction_accuracy, state.current_question
            );
            continue;
        }

        match engine.respond(&args.user, line).await {
            Ok(reply) => {
                let outcome = engine.insights(&args.user).await?;
                let trend = outcome
                    .emotional_trends
                    .first()
                    .map(|t| t.emotion.to_string())
                    .unwrap_or_else(|| "content".to_string());
                println!("\neidos: {reply}\n[dominant emotion lately: {trend}]\n");
            }
            Err(e) => {
                tracing::error!("Turn failed: {}", e);
                println!("\n[error]: {e}\n");
            }
        }
    }

    Ok(())
}

fn prompt(interview: bool) -> io::Result<()> {
    if interview {
        print!("interview> ");
    } else {
        print!("> ");
    }
    io::stdout().flush()
}
