use clap::Subcommand;
use colored::Colorize;
use dira_lib::{Account, Repository, RepositoryError};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List accounts
    List,
    /// Add a new account
    Add { email: String },
    /// Make an account the active one
    Use { email: String },
    /// Remove an account and all of its seeker data
    Remove { email: String },
}

pub fn handle(repo: &Repository, cmd: &Command) -> dira_lib::Result<()> {
    match cmd {
        Command::List => {
            for account in repo.accounts()? {
                let email = account.email()?;
                if account.is_active()? {
                    println!("{} {}", "*".green(), email.bold());
                } else {
                    println!("  {email}");
                }
            }
        }
        Command::Add { email } => {
            let account = repo.add_account(email)?;
            println!("Added account {}", account.email()?.bold());
        }
        Command::Use { email } => {
            let account = named(repo, email)?;
            account.activate()?;
            println!("Now acting as {}", account.email()?.bold());
        }
        Command::Remove { email } => {
            named(repo, email)?.remove()?;
            println!("Removed account {email}");
        }
    }

    Ok(())
}

/// The account named by the global `--account` flag, or the active one.
pub fn resolve(repo: &Repository, override_email: Option<&str>) -> dira_lib::Result<Account> {
    match override_email {
        Some(email) => named(repo, email),
        None => repo
            .active_account()?
            .ok_or_else(|| RepositoryError::NoActiveAccount.into()),
    }
}

fn named(repo: &Repository, email: &str) -> dira_lib::Result<Account> {
    repo.find_account(email)?
        .ok_or_else(|| RepositoryError::UnknownAccount(email.to_string()).into())
}
