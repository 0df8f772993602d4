// Foodgram admin CLI: database setup and catalog management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use foodgram::entities::ingredient::import_csv;
use foodgram::entities::tag::insert_tag;
use foodgram::entities::user::create_user;
use foodgram::logging::init_logging;
use foodgram::{open_database, NewTag, NewUser};

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(about = "Foodgram administration tool", version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "FOODGRAM_DATABASE", default_value = "foodgram.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema (idempotent)
    Init,

    /// Load ingredients from a `name,measurement_unit` CSV file
    ImportIngredients {
        csv: PathBuf,
    },

    /// Create a tag
    AddTag {
        #[arg(long)]
        name: String,
        /// Hex color such as #E26C2D
        #[arg(long)]
        color: String,
        #[arg(long)]
        slug: String,
    },

    /// Create a staff account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "Admin")]
        last_name: String,
    },
}

fn main() -> Result<()> {
    init_logging(false);
    let cli = Cli::parse();

    let conn = open_database(&cli.database)
        .with_context(|| format!("opening database {}", cli.database.display()))?;

    match cli.command {
        Command::Init => {
            info!(database = %cli.database.display(), "schema ready");
            println!("✓ Database initialized at {}", cli.database.display());
        }
        Command::ImportIngredients { csv } => {
            let summary = import_csv(&conn, &csv)
                .with_context(|| format!("importing {}", csv.display()))?;
            println!("📦 Ingredients import finished");
            println!("   inserted:   {}", summary.inserted);
            println!("   duplicates: {}", summary.duplicates);
            println!("   rejected:   {}", summary.rejected);
        }
        Command::AddTag { name, color, slug } => {
            let tag = insert_tag(&conn, &NewTag { name, color, slug })?;
            println!("🏷️  Tag #{} created: {} ({})", tag.id, tag.name, tag.slug);
        }
        Command::CreateAdmin {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let user = create_user(
                &conn,
                &NewUser {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                },
                true,
            )?;
            println!("👤 Staff user #{} created: {}", user.id, user.email);
        }
    }

    Ok(())
}
