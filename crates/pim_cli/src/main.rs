//! Catalog command-line entry point.
//!
//! # Responsibility
//! - Wire `pim_core` to a catalog database file for operator use.
//! - Keep output deterministic: JSON on stdout, errors on stderr.
//!
//! Exit codes: 0 on success, 1 on failure, 2 on invalid usage,
//! 3 when a removal was rejected by validation.

use clap::{Parser, Subcommand};
use pim_core::db::{open_db, open_existing_db};
use pim_core::{
    normalize_family, AttributeService, AttributeType, FamilyService, NormalizeOptions,
    SqliteAttributeRepository, SqliteFamilyRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_REJECTED: u8 = 3;

#[derive(Parser)]
#[command(name = "pim_cli")]
#[command(about = "Catalog family maintenance")]
#[command(version)]
struct Cli {
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "PIM_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error, defaults by build mode
    #[arg(long, global = true, env = "PIM_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print core health and version
    Ping,

    /// Create an attribute, creating the catalog file when missing
    CreateAttribute {
        db_path: PathBuf,
        code: String,
        #[arg(value_parser = parse_attribute_type)]
        attribute_type: AttributeType,
    },

    /// Remove an attribute from a family, cascading into its variants
    RemoveAttribute {
        db_path: PathBuf,
        family: String,
        attribute: String,
    },

    /// List attribute codes used as axis by the family variants
    Axes { db_path: PathBuf, family: String },

    /// Print the internal-API view of a family
    Show {
        db_path: PathBuf,
        family: String,
        /// Emit attributes as codes only, without their types
        #[arg(long)]
        codes_only: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) =
        pim_core::init_logging_if_configured(cli.log_dir.as_deref(), cli.log_level.as_deref())
    {
        eprintln!("logging disabled: {err}");
    }

    match run(cli.command.unwrap_or(Command::Ping)) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode, String> {
    match command {
        Command::Ping => {
            println!("pim_core ping={}", pim_core::ping());
            println!("pim_core version={}", pim_core::core_version());
        }
        Command::CreateAttribute {
            db_path,
            code,
            attribute_type,
        } => {
            let conn = open_db(&db_path).map_err(|err| err.to_string())?;
            let repo = SqliteAttributeRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let attribute = AttributeService::new(repo)
                .create_attribute(code, attribute_type)
                .map_err(|err| err.to_string())?;
            print_json(&attribute)?;
        }
        Command::RemoveAttribute {
            db_path,
            family,
            attribute,
        } => {
            let conn = open_existing_db(&db_path).map_err(|err| err.to_string())?;
            let repo = SqliteFamilyRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let violations = FamilyService::new(repo)
                .remove_attribute_from_family(&family, &attribute)
                .map_err(|err| err.to_string())?;

            print_json(&violations)?;
            if !violations.is_empty() {
                return Ok(ExitCode::from(EXIT_REJECTED));
            }
        }
        Command::Axes { db_path, family } => {
            let conn = open_existing_db(&db_path).map_err(|err| err.to_string())?;
            let repo = SqliteFamilyRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let axes = FamilyService::new(repo)
                .attribute_codes_used_as_axis(&family)
                .map_err(|err| err.to_string())?;
            print_json(&axes)?;
        }
        Command::Show {
            db_path,
            family,
            codes_only,
        } => {
            let conn = open_existing_db(&db_path).map_err(|err| err.to_string())?;
            let repo = SqliteFamilyRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let family = FamilyService::new(repo)
                .get_family(&family)
                .map_err(|err| err.to_string())?;
            let options = NormalizeOptions {
                full_attributes: codes_only,
            };
            let value = normalize_family(&family, &options).map_err(|err| err.to_string())?;
            print_json(&value)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_attribute_type(value: &str) -> Result<AttributeType, String> {
    AttributeType::parse(value).ok_or_else(|| {
        format!(
            "unknown attribute type `{value}`; \
             expected identifier|text|number|boolean|simple_select|metric"
        )
    })
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}
