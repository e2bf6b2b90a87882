//! CLI command definitions for staff-performance.
//!
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::actions::staff::UserInput;
use clap::{Args, Parser, Subcommand};

/// Staff performance server and account tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve,

    /// Create an account directly in the database
    CreateUser(CreateUserArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub full_name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    /// Admin, Supervisor or Staff
    #[arg(long, default_value = "Staff", value_parser = ["Admin", "Supervisor", "Staff"])]
    pub role: String,

    /// Id of an existing Admin or Supervisor
    #[arg(long)]
    pub supervisor_id: Option<i64>,

    #[arg(long, default_value = "")]
    pub department: String,

    #[arg(long, default_value = "")]
    pub position: String,
}

impl From<CreateUserArgs> for UserInput {
    fn from(args: CreateUserArgs) -> Self {
        UserInput {
            username: args.username,
            password: args.password,
            full_name: args.full_name,
            email: args.email,
            role: args.role,
            supervisor_id: args.supervisor_id,
            department: args.department,
            position: args.position,
        }
    }
}
