//! `student-roster` CLI entry-point.
//!
//! Available sub-commands:
//! - `migrate`                 — run pending database migrations.
//! - `students list`           — print every student as JSON.
//! - `students add`            — register a student (check-then-insert).
//! - `students email-taken`    — report whether an email is in use.
//! - `students courses <ID>`   — print a student's enrollments as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use db::Gender;
use roster::{NewStudent, StudentRoster};

#[derive(Parser)]
#[command(
    name = "student-roster",
    about = "Students, courses and enrollments over Postgres",
    version
)]
struct Cli {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DatabaseArgs {
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    max_connections: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations.
    Migrate,
    /// Query and register students.
    #[command(subcommand)]
    Students(StudentCommand),
}

#[derive(Subcommand)]
enum StudentCommand {
    /// List all students.
    List,
    /// Register a new student.
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// MALE, FEMALE or OTHER (any case).
        #[arg(long)]
        gender: Gender,
        /// Use this ID instead of generating one.
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Check whether an email is already used by a student.
    EmailTaken { email: String },
    /// List the courses a student is enrolled in.
    Courses { student_id: Uuid },
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let database_url = cli
        .database
        .database_url
        .context("DATABASE_URL is not set (pass --database-url or export it)")?;
    let pool = db::pool::create_pool(&database_url, cli.database.max_connections)
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Command::Migrate => {
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Students(command) => run_students(StudentRoster::new(pool), command).await?,
    }

    Ok(())
}

async fn run_students(roster: StudentRoster<db::DbPool>, command: StudentCommand) -> Result<()> {
    match command {
        StudentCommand::List => print_json(&roster.list_students().await?),
        StudentCommand::Add {
            first_name,
            last_name,
            email,
            gender,
            id,
        } => {
            let new = NewStudent {
                first_name,
                last_name,
                email,
                gender,
            };
            let student = match id {
                Some(id) => roster.register_student_with_id(id, new).await?,
                None => roster.register_student(new).await?,
            };
            print_json(&student)
        }
        StudentCommand::EmailTaken { email } => print_json(&roster.is_email_taken(&email).await?),
        StudentCommand::Courses { student_id } => {
            print_json(&roster.courses_for_student(student_id).await?)
        }
    }
}
