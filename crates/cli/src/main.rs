//! Member signup CLI - Offline form tools and manual API calls.
//!
//! # Usage
//!
//! ```bash
//! # Apply a display mask
//! signup-cli mask cpf 12345678901
//!
//! # Show which representative a URL path credits
//! signup-cli resolve /110956
//!
//! # List the plans of one operator (or all of them)
//! signup-cli plans tim
//!
//! # Run the CEP or CPF lookup against the configured APIs
//! signup-cli lookup address 01310-100
//! signup-cli lookup document 123.456.789-01
//!
//! # Submit a registration from a YAML draft
//! signup-cli submit draft.yaml --path /110956
//! ```
//!
//! # Commands
//!
//! - `mask` - Apply the CPF, phone, mobile or CEP mask
//! - `resolve` - Resolve a URL path to a representative
//! - `plans` - List the plan catalog
//! - `lookup address|document` - Call the CEP or CPF lookup
//! - `submit` - Post a registration built from a draft file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "signup-cli")]
#[command(author, version, about = "Member signup CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a display mask to a value
    Mask {
        /// Mask to apply (`cpf`, `phone`, `cell`, `cep`)
        kind: String,

        /// Raw or already masked value
        value: String,
    },
    /// Resolve a URL path to a representative
    Resolve {
        /// Request path, e.g. `/110956`
        path: String,

        /// YAML representative list (defaults to `SIGNUP_REFERRERS_FILE`)
        #[arg(short, long)]
        referrers: Option<PathBuf>,
    },
    /// List the plans offered by each operator
    Plans {
        /// Only list this operator (`VIVO`, `TIM`, `CLARO`)
        operator: Option<String>,
    },
    /// Call one of the lookup APIs
    Lookup {
        #[command(subcommand)]
        target: LookupTarget,
    },
    /// Submit a registration from a YAML draft file
    Submit {
        /// Draft file using the form's field names
        file: PathBuf,

        /// Request path selecting the representative
        #[arg(short, long, default_value = "/")]
        path: String,

        /// YAML representative list (defaults to `SIGNUP_REFERRERS_FILE`)
        #[arg(short, long)]
        referrers: Option<PathBuf>,

        /// Validate and print the payload without posting it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum LookupTarget {
    /// Look up the address of a CEP
    Address {
        /// CEP, masked or digits only
        cep: String,
    },
    /// Look up the name and birth date of a CPF
    Document {
        /// CPF, masked or digits only
        cpf: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Mask { kind, value } => commands::inspect::mask(&kind, &value)?,
        Commands::Resolve { path, referrers } => {
            commands::inspect::resolve(&path, referrers.as_deref())?;
        }
        Commands::Plans { operator } => commands::inspect::plans(operator.as_deref())?,
        Commands::Lookup { target } => match target {
            LookupTarget::Address { cep } => commands::lookup::address(&cep).await?,
            LookupTarget::Document { cpf } => commands::lookup::document(&cpf).await?,
        },
        Commands::Submit {
            file,
            path,
            referrers,
            dry_run,
        } => {
            commands::submit::from_file(&file, &path, referrers.as_deref(), dry_run).await?;
        }
    }
    Ok(())
}
