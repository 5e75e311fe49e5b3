use std::fmt;

use chrono::{DateTime, Utc};
use literacy_core::model::UserId;
use literacy_core::roster::{ADMIN_USERNAME, admin_account, class_roster, mock_leaderboard};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    skip_roster: bool,
    skip_leaderboard: bool,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LITERACY_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut skip_roster = false;
        let mut skip_leaderboard = false;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--no-roster" => skip_roster = true,
                "--no-leaderboard" => skip_leaderboard = true,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            skip_roster,
            skip_leaderboard,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --no-roster               Do not create the teacher and class accounts");
    eprintln!("  --no-leaderboard          Do not insert sample leaderboard rows");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LITERACY_DB_URL");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut accounts = 0usize;
    if !args.skip_roster && storage.users.find_by_username(ADMIN_USERNAME).await?.is_none() {
        let mut users = vec![admin_account().validate(UserId::random())?];
        for student in class_roster() {
            users.push(student.validate(UserId::random())?);
        }
        storage.users.insert_users(&users).await?;
        accounts = users.len();
    }

    let mut rows = 0usize;
    if !args.skip_leaderboard && storage.leaderboard.count().await? == 0 {
        for entry in mock_leaderboard() {
            storage.leaderboard.upsert_max(&entry, now).await?;
            rows += 1;
        }
    }

    println!(
        "Seeded {accounts} accounts and {rows} leaderboard rows into {}",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
