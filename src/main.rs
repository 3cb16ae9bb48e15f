mod config;
mod credentials;
mod error;
mod models;
mod profile;
mod query;
mod session;
mod store;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{Backend, StoreConfig};
use models::{
    parse_date, split_links, Application, ApplicationStatus, ConnectionStatus, NewApplication,
};
use profile::UserProfile;
use session::Session;
use store::SchemaPolicy;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Track job applications, links, and referral status")]
struct Cli {
    /// Backing medium for the applications
    #[arg(long, value_enum, env = "JOBTRACK_BACKEND", default_value = "csv", global = true)]
    backend: Backend,

    /// CSV file (csv backend)
    #[arg(long, env = "JOBTRACK_FILE", global = true)]
    file: Option<PathBuf>,

    /// Spreadsheet name (sheets backend)
    #[arg(
        long,
        env = "JOBTRACK_SPREADSHEET",
        default_value = store::DEFAULT_SPREADSHEET,
        global = true
    )]
    spreadsheet: String,

    /// Authorized-user credentials JSON (sheets backend)
    #[arg(long, env = "JOBTRACK_CREDENTIALS", global = true)]
    credentials: Option<PathBuf>,

    /// Fail instead of resetting a medium whose header is not recognised
    #[arg(long, global = true)]
    keep_foreign: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new application
    Add {
        /// Company name
        company: String,

        /// Job links, comma-separated if several
        #[arg(short, long, default_value = "")]
        links: String,

        /// Date applied (YYYY-MM-DD, default today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Connection/referral status
        #[arg(short, long, value_enum, default_value = "pending")]
        connection: ConnectionStatus,

        /// Application status
        #[arg(short, long, value_enum, default_value = "applied")]
        status: ApplicationStatus,
    },

    /// Suggest company names containing the query
    Search {
        /// Part of a company name (empty lists every company)
        #[arg(default_value = "")]
        query: String,
    },

    /// Show applications for a company
    Company {
        /// Company name (case-insensitive)
        name: String,
    },

    /// Show applications made on a date
    Date {
        /// YYYY-MM-DD
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// List every application
    List,

    /// Add links to an application and change its statuses
    Update {
        /// Application number as shown by list/company/date
        number: usize,

        /// New job links to append, comma-separated
        #[arg(short, long, default_value = "")]
        links: String,

        /// New connection/referral status (default: unchanged)
        #[arg(short, long, value_enum)]
        connection: Option<ConnectionStatus>,

        /// New application status (default: unchanged)
        #[arg(short, long, value_enum)]
        status: Option<ApplicationStatus>,
    },

    /// Show the accepted status values
    Statuses,

    /// Manage the profile used for outreach messages
    Profile {
        /// Profile JSON file
        #[arg(long, env = "JOBTRACK_PROFILE")]
        path: Option<PathBuf>,

        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Print the saved profile
    Show,

    /// Change profile fields
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        linkedin_url: Option<String>,

        #[arg(long)]
        portfolio_url: Option<String>,

        /// Target position
        #[arg(long)]
        position: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jobtrack={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store_config = StoreConfig {
        backend: cli.backend,
        csv_path: cli.file,
        spreadsheet: cli.spreadsheet,
        credentials_path: cli.credentials,
        policy: if cli.keep_foreign {
            SchemaPolicy::Refuse
        } else {
            SchemaPolicy::Reset
        },
    };

    match cli.command {
        Commands::Statuses => {
            println!("Connection status (--connection):");
            for status in ConnectionStatus::ALL {
                println!("  {:<10} {}", value_name(status), status);
            }
            println!("Application status (--status):");
            for status in ApplicationStatus::ALL {
                println!("  {:<10} {}", value_name(status), status);
            }
        }

        Commands::Profile { path, command } => {
            let path = match path {
                Some(path) => path,
                None => config::default_profile_path()?,
            };
            run_profile(&path, command)?;
        }

        command => {
            let store = store_config.open_store()?;
            let mut session = Session::open(store).context("Failed to load applications")?;
            tracing::info!(
                store = %session.describe_store(),
                count = session.records().len(),
                "loaded applications"
            );
            run_records(&mut session, command)?;
        }
    }

    Ok(())
}

fn run_records(session: &mut Session, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            company,
            links,
            date,
            connection,
            status,
        } => {
            let new = NewApplication {
                company,
                job_links: split_links(&links, ','),
                date_applied: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                connection_status: connection,
                application_status: status,
            };
            let position = session.add(new)?;
            let added = &session.records()[position];
            println!("Added application #{} for '{}'.", position + 1, added.company);
        }

        Commands::Search { query } => {
            let names = session.find_by_company(&query);
            if names.is_empty() {
                println!("No companies match '{}'.", query);
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }

        Commands::Company { name } => {
            let found = session.for_company(&name);
            print_matches(&found, &format!("'{}'", name));
        }

        Commands::Date { date } => {
            let found = session.for_date(date);
            print_matches(&found, &date.format(models::DATE_FORMAT).to_string());
        }

        Commands::List => {
            let records = session.records();
            println!("Total applications: {}", records.len());
            if records.is_empty() {
                println!("No applications have been added yet.");
            } else {
                print_table(records.iter().enumerate());
            }
        }

        Commands::Update {
            number,
            links,
            connection,
            status,
        } => {
            anyhow::ensure!(number >= 1, "Application numbers start at 1");
            let position = number - 1;
            let current = session.records().get(position).cloned();
            let (connection, status) = match &current {
                Some(record) => (
                    connection.unwrap_or(record.connection_status),
                    status.unwrap_or(record.application_status),
                ),
                // Let the update itself report the bad position.
                None => (
                    connection.unwrap_or(ConnectionStatus::RequestPending),
                    status.unwrap_or(ApplicationStatus::Applied),
                ),
            };
            session
                .update(position, &split_links(&links, ','), connection, status)
                .with_context(|| format!("Failed to update application #{}", number))?;
            let updated = &session.records()[position];
            println!("Updated application #{} for '{}'.", number, updated.company);
            print_detail(number, updated);
        }

        // Handled in main without opening a store.
        Commands::Statuses | Commands::Profile { .. } => {}
    }

    Ok(())
}

fn run_profile(path: &std::path::Path, command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::Show => {
            let profile = UserProfile::load(path)?;
            println!("Profile ({})", path.display());
            println!("Name:      {}", profile.name);
            println!("Email:     {}", profile.email);
            println!("LinkedIn:  {}", profile.linkedin_url);
            println!("Portfolio: {}", profile.portfolio_url);
            println!("Position:  {}", profile.position);
        }

        ProfileCommands::Set {
            name,
            email,
            linkedin_url,
            portfolio_url,
            position,
        } => {
            let mut profile = UserProfile::load(path)?;
            let updates = [
                (&mut profile.name, name),
                (&mut profile.email, email),
                (&mut profile.linkedin_url, linkedin_url),
                (&mut profile.portfolio_url, portfolio_url),
                (&mut profile.position, position),
            ];
            for (field, value) in updates {
                if let Some(value) = value {
                    *field = value;
                }
            }
            profile.save(path)?;
            println!("Profile saved to {}", path.display());
        }
    }
    Ok(())
}

fn value_name<T: clap::ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn print_matches(found: &[(usize, &Application)], what: &str) {
    if found.is_empty() {
        println!("No applications found for {}.", what);
        return;
    }
    println!("Found {} application(s) for {}:", found.len(), what);
    for (position, record) in found {
        println!("{}", "-".repeat(60));
        print_detail(position + 1, record);
    }
}

fn print_detail(number: usize, record: &Application) {
    println!("#{} {}", number, record.company);
    println!("Date applied: {}", record.date_string());
    println!("Connection:   {}", record.connection_status);
    println!("Application:  {}", record.application_status);
    println!("Job links:");
    for link in &record.job_links {
        println!("  - {}", link);
    }
}

fn print_table<'a>(rows: impl Iterator<Item = (usize, &'a Application)>) {
    println!(
        "{:<5} {:<24} {:<11} {:<27} {:<20} {:>5}",
        "#", "COMPANY", "DATE", "CONNECTION", "STATUS", "LINKS"
    );
    println!("{}", "-".repeat(97));
    for (position, record) in rows {
        println!(
            "{:<5} {:<24} {:<11} {:<27} {:<20} {:>5}",
            position + 1,
            truncate(&record.company, 24),
            record.date_string(),
            record.connection_status.label(),
            truncate(record.application_status.label(), 20),
            record.job_links.len()
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
