use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shifttrack::auth::SessionTokenGenerator;
use shifttrack::cli::{
    AuthCommands, RecordCommands, ReportArgs, SectionCommands, ShiftCommands, UserCommands,
};
use shifttrack::config::ServerConfig;
use shifttrack::server::{AppState, create_router};
use shifttrack::store::{SqliteStore, Store};
use shifttrack::types::{Role, RoleName, Section, Shift, User};

const DEFAULT_SUPERADMIN_PASSWORD: &str = "password123";

const SEED_SECTIONS: &[&str] = &["CCS", "BAF", "Slitter"];
const SEED_SHIFTS: &[(&str, &str, &str)] = &[
    ("1st Shift", "07:00:00", "15:00:00"),
    ("2nd Shift", "15:00:00", "23:00:00"),
    ("3rd Shift", "23:00:00", "07:00:00"),
];

#[derive(Parser)]
#[command(name = "shifttrack")]
#[command(about = "A shift record tracking server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Browser origin allowed to call the API (repeatable)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Log in or out of a server
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Submit and browse shift records
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Daily throughput report over your visible records
    Report(ReportArgs),

    /// Manage sections
    Section {
        #[command(subcommand)]
        command: SectionCommands,
    },

    /// Manage shifts
    Shift {
        #[command(subcommand)]
        command: ShiftCommands,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and seed reference data)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Password for the seeded superadmin account
        #[arg(long)]
        superadmin_password: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(
    data_dir: String,
    superadmin_password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("shifttrack.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    if store.get_user_by_username("superadmin")?.is_some() {
        bail!(
            "Server already initialized. Database exists at: {}",
            db_path.display()
        );
    }

    let password = if let Some(p) = superadmin_password {
        if p.is_empty() {
            bail!("Superadmin password cannot be empty");
        }
        p
    } else if non_interactive {
        DEFAULT_SUPERADMIN_PASSWORD.to_string()
    } else {
        inquire::Password::new("Superadmin password:").prompt()?
    };

    let now = Utc::now();

    for role_name in RoleName::ALL {
        store.create_role(&Role {
            id: Uuid::new_v4().to_string(),
            name: role_name.as_str().to_string(),
            created_at: now,
        })?;
    }
    let superadmin_role = store
        .get_role_by_name(RoleName::SuperAdmin.as_str())?
        .ok_or_else(|| anyhow::anyhow!("SuperAdmin role was not seeded"))?;

    for name in SEED_SECTIONS {
        store.create_section(&Section {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            created_at: now,
            updated_at: now,
        })?;
    }

    for (name, start_time, end_time) in SEED_SHIFTS {
        store.create_shift(&Shift {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            start_time: (*start_time).to_string(),
            end_time: (*end_time).to_string(),
            created_at: now,
            updated_at: now,
        })?;
    }

    let generator = SessionTokenGenerator::new();
    let password_hash = generator
        .hash(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    store.create_user(&User {
        id: Uuid::new_v4().to_string(),
        username: "superadmin".to_string(),
        password_hash,
        role_id: superadmin_role.id,
        section_id: None,
        created_at: now,
        updated_at: now,
    })?;

    println!();
    println!("Initialized database at {}", db_path.display());
    println!("Seeded sections: {}", SEED_SECTIONS.join(", "));
    println!(
        "Seeded shifts: {}",
        SEED_SHIFTS
            .iter()
            .map(|(name, _, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    println!("Log in as 'superadmin' with the password you chose.");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shifttrack=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                superadmin_password,
                non_interactive,
            } => {
                run_init(data_dir, superadmin_password, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            cors_origins,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                cors_origins,
            };

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Server not initialized. Run 'shifttrack admin init' first to create the database."
                );
            }

            let store = SqliteStore::new(&db_path)?;

            let state = Arc::new(AppState {
                store: Arc::new(store),
            });

            let app = create_router(state, &config.cors_origins);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Auth { command } => match command {
            AuthCommands::Login {
                server,
                username,
                password,
                non_interactive,
            } => {
                shifttrack::cli::run_auth_login(server, username, password, non_interactive)?;
            }
            AuthCommands::Logout => {
                shifttrack::cli::run_auth_logout()?;
            }
        },
        Commands::Record { command } => match command {
            RecordCommands::Submit {
                section,
                shift,
                non_interactive,
            } => {
                shifttrack::cli::run_record_submit(section, shift, non_interactive)?;
            }
            RecordCommands::List { json } => {
                shifttrack::cli::run_record_list(json)?;
            }
            RecordCommands::Show { id } => {
                shifttrack::cli::run_record_show(id)?;
            }
        },
        Commands::Report(args) => {
            shifttrack::cli::run_report(args)?;
        }
        Commands::Section { command } => match command {
            SectionCommands::Create {
                name,
                non_interactive,
            } => {
                shifttrack::cli::run_section_create(name, non_interactive)?;
            }
            SectionCommands::List { json } => {
                shifttrack::cli::run_section_list(json)?;
            }
            SectionCommands::Rename { id, name } => {
                shifttrack::cli::run_section_rename(id, name)?;
            }
            SectionCommands::Delete { id, yes } => {
                shifttrack::cli::run_section_delete(id, yes)?;
            }
        },
        Commands::Shift { command } => match command {
            ShiftCommands::Create {
                name,
                start_time,
                end_time,
                non_interactive,
            } => {
                shifttrack::cli::run_shift_create(name, start_time, end_time, non_interactive)?;
            }
            ShiftCommands::List { json } => {
                shifttrack::cli::run_shift_list(json)?;
            }
            ShiftCommands::Update {
                id,
                name,
                start_time,
                end_time,
            } => {
                shifttrack::cli::run_shift_update(id, name, start_time, end_time)?;
            }
            ShiftCommands::Delete { id, yes } => {
                shifttrack::cli::run_shift_delete(id, yes)?;
            }
        },
        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                password,
                role,
                section,
                non_interactive,
            } => {
                shifttrack::cli::run_user_create(
                    username,
                    password,
                    role,
                    section,
                    non_interactive,
                )?;
            }
            UserCommands::List { json } => {
                shifttrack::cli::run_user_list(json)?;
            }
            UserCommands::Update {
                id,
                username,
                password,
                role,
                section,
            } => {
                shifttrack::cli::run_user_update(id, username, password, role, section)?;
            }
            UserCommands::Delete { id, yes } => {
                shifttrack::cli::run_user_delete(id, yes)?;
            }
        },
    }

    Ok(())
}
