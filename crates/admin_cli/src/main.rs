use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod catalog;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "boutique_admin")]
#[command(about = "Admin utilities for the boutique (password hash, catalog import, stats)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./boutique.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prompts for the admin password and prints its argon2 hash for
    /// `server.admin_password_hash`.
    HashPassword,
    /// Creates the categories, farms and products of a JSON catalog.
    Import(ImportArgs),
    /// Prints the shop counters.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct ImportArgs {
    file: PathBuf,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Telegram id left out of the broadcast audience count.
    #[arg(long)]
    admin_id: Option<i64>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, BoxError> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, BoxError> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn notice(message: &str) -> Result<(), BoxError> {
    execute!(
        std::io::stderr(),
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

fn prompt_password_twice() -> Result<String, BoxError> {
    for _ in 0..3 {
        let first = prompt_password("Admin password: ")?;
        if first.is_empty() {
            notice("Password must not be empty.")?;
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(first);
        }
        notice("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_engine(database_url: &str) -> Result<Engine, BoxError> {
    let db: DatabaseConnection = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    match cli.command {
        Command::HashPassword => {
            let password = prompt_password_twice()?;
            println!("{}", server::hash_password(&password)?);
        }
        Command::Import(args) => {
            let raw = std::fs::read_to_string(&args.file)?;
            let catalog: catalog::Catalog = serde_json::from_str(&raw)?;
            let engine = connect_engine(&cli.database_url).await?;
            let summary = catalog.import(&engine).await?;
            println!(
                "imported {} categories, {} farms, {} products",
                summary.categories, summary.farms, summary.products
            );
        }
        Command::Stats(args) => {
            let engine = connect_engine(&cli.database_url).await?;
            let stats = engine.stats(args.admin_id).await?;
            println!("products:           {} ({} available)", stats.products, stats.available_products);
            println!("categories:         {}", stats.categories);
            println!("farms:              {}", stats.farms);
            println!("orders:             {} ({} pending)", stats.orders, stats.pending_orders);
            println!("bot users:          {}", stats.bot_users);
            println!("broadcast eligible: {}", stats.broadcast_eligible);
        }
    }

    Ok(())
}
