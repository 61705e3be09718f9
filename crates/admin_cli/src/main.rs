use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, Money, NewTransaction, NewUser, TransactionKind, UserRole};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "bell24h_admin")]
#[command(about = "Operator utilities for Bell24H (users, supplier verification, wallets)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./bell24h.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    User(UserArgs),
    Supplier(SupplierArgs),
    Wallet(WalletArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, admins included. The password is prompted for.
    Create(UserCreateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Buyer,
    Supplier,
    Both,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Buyer => UserRole::Buyer,
            RoleArg::Supplier => UserRole::Supplier,
            RoleArg::Both => UserRole::Both,
            RoleArg::Admin => UserRole::Admin,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Buyer)]
    role: RoleArg,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    company_name: Option<String>,
}

#[derive(Args, Debug)]
struct SupplierArgs {
    #[command(subcommand)]
    command: SupplierCommand,
}

#[derive(Subcommand, Debug)]
enum SupplierCommand {
    /// Mark a supplier profile verified (or revoke with `--revoke`).
    Verify(SupplierVerifyArgs),
}

#[derive(Args, Debug)]
struct SupplierVerifyArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    revoke: bool,
    /// 0..=100, lower is safer.
    #[arg(long)]
    risk_score: Option<i32>,
}

#[derive(Args, Debug)]
struct WalletArgs {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Credit a wallet, e.g. `--amount 1250.50`.
    Deposit(WalletDepositArgs),
}

#[derive(Args, Debug)]
struct WalletDepositArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    amount: Money,
    #[arg(long)]
    note: Option<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(message: &str) -> CliResult<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    out.flush()?;
    Ok(())
}

/// Read a line without echoing it; each key prints `*`.
fn prompt_password(prompt: &str) -> CliResult<String> {
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
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_new_password() -> CliResult<String> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            print_line("Password must not be empty.")?;
            continue;
        }
        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }
        print_line("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate => println!("migrations applied"),
        Command::User(UserArgs {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            let user = engine
                .create_user(NewUser {
                    username: args.username,
                    password,
                    email: args.email,
                    full_name: args.full_name,
                    company_name: args.company_name,
                    role: args.role.into(),
                })
                .await?;
            println!("created user: {} ({})", user.username, user.role.as_str());
        }
        Command::Supplier(SupplierArgs {
            command: SupplierCommand::Verify(args),
        }) => {
            let supplier = engine
                .mark_supplier_verified(&args.username, !args.revoke, args.risk_score)
                .await?;
            println!(
                "supplier {}: verified={} risk_score={}",
                supplier.user_id, supplier.verified, supplier.risk_score
            );
        }
        Command::Wallet(WalletArgs {
            command: WalletCommand::Deposit(args),
        }) => {
            let entry = engine
                .record_transaction(
                    &args.username,
                    NewTransaction {
                        kind: TransactionKind::Deposit,
                        amount_minor: args.amount.minor(),
                        counterparty_id: None,
                        contract_id: None,
                        note: args.note,
                    },
                )
                .await?;
            println!(
                "deposited {} to {}; balance {}",
                args.amount,
                entry.user_id,
                Money::new(entry.balance_after_minor)
            );
        }
    }

    Ok(())
}
