use clap::{Parser, Subcommand};
use colored::Colorize;
use dira_lib::Repository;
use human_panic::setup_panic;
use sysexits::ExitCode;
use tracing_subscriber::EnvFilter;

mod account;
mod checklist;
mod listing;
mod profile;
mod track;

#[derive(Parser, Debug)]
#[command(name = "dira")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Act as this account instead of the active one
    #[arg(short, long, global = true)]
    account: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on seeker accounts
    #[command(subcommand)]
    Account(account::Command),
    /// Operate on published listings
    #[command(subcommand)]
    Listing(listing::Command),
    /// Operate on the tracked-apartment dashboard
    #[command(subcommand)]
    Track(track::Command),
    /// Operate on a tracked apartment's private checklist
    #[command(subcommand)]
    Checklist(checklist::Command),
    /// Operate on preference profiles
    #[command(subcommand)]
    Profile(profile::Command),
}

fn main() -> ExitCode {
    setup_panic!();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let repo = Repository::new();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Account(cmd) => account::handle(&repo, cmd),
        Command::Listing(cmd) => listing::handle(&repo, cmd),
        Command::Track(cmd) => track::handle(&repo, cli.account.as_deref(), cmd),
        Command::Checklist(cmd) => checklist::handle(&repo, cli.account.as_deref(), cmd),
        Command::Profile(cmd) => profile::handle(&repo, cli.account.as_deref(), cmd),
    };

    match result {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::Software
        }
    }
}
