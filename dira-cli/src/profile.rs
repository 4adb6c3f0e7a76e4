use clap::Subcommand;
use colored::Colorize;
use dira_lib::{
    Account, Profile, Repository, RepositoryError,
    fields::FieldKind,
    prefs::{PreferenceProfile, REQUIRED_FIELD_CAP, resolve_field_order},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List profiles
    List,
    /// Show a profile's field order and required fields
    Show { name: String },
    /// Add a new profile
    Add { name: String },
    /// Remove a profile
    Remove { name: String },
    /// Rename a profile
    Rename { name: String, new_name: String },
    /// Move a field to a new position (0-based)
    Reorder {
        name: String,
        field_id: String,
        to: usize,
    },
    /// Toggle whether a field is required
    Require { name: String, field_id: String },
    /// Add a custom checklist field
    FieldAdd {
        name: String,
        label: String,
        #[arg(long, value_enum, default_value_t = FieldKind::Text)]
        kind: FieldKind,
    },
    /// Delete a custom checklist field
    FieldRm { name: String, field_id: String },
}

pub fn handle(
    repo: &Repository,
    account_override: Option<&str>,
    cmd: &Command,
) -> dira_lib::Result<()> {
    let account = crate::account::resolve(repo, account_override)?;

    match cmd {
        Command::List => {
            for profile in account.profiles()? {
                let snapshot = profile.snapshot()?;
                println!(
                    "{}  ({} fields, {}/{REQUIRED_FIELD_CAP} required)",
                    snapshot.name.bold(),
                    snapshot.fields.len(),
                    snapshot.required_fields.len(),
                );
            }
        }
        Command::Show { name } => {
            let snapshot = named(&account, name)?.snapshot()?;
            println!("{}", snapshot.name.bold());
            for (index, field) in resolve_field_order(&[], Some(&snapshot)).iter().enumerate() {
                let marker = if snapshot.is_required(&field.id) {
                    " *".red().to_string()
                } else {
                    String::new()
                };
                let tag = if field.is_custom {
                    format!("  [{}]", field.id.dimmed())
                } else {
                    String::new()
                };
                println!("{:>2}. {}{marker}{tag}", index + 1, field.label);
            }
        }
        Command::Add { name } => {
            account.add_profile(name)?;
            println!("Added profile {}", name.bold());
        }
        Command::Remove { name } => {
            named(&account, name)?.remove()?;
            println!("Removed profile {name}");
        }
        Command::Rename { name, new_name } => {
            let profile = named(&account, name)?;
            let mut snapshot = profile.snapshot()?;
            snapshot.name = new_name.clone();
            profile.save(&snapshot)?;
            println!("Renamed {name} to {new_name}");
        }
        Command::Reorder {
            name,
            field_id,
            to,
        } => {
            let profile = named(&account, name)?;
            let snapshot = profile.snapshot()?;

            let Some(from) = snapshot.field_order.iter().position(|id| id == field_id) else {
                println!(
                    "{} {field_id:?} is not in the display order",
                    "warning:".yellow().bold()
                );
                return Ok(());
            };

            profile.save(&snapshot.reorder(field_id, from, *to))?;
            println!("Moved {field_id} to position {}", to + 1);
        }
        Command::Require { name, field_id } => {
            let profile = named(&account, name)?;
            let snapshot = profile.snapshot()?;
            let was_required = snapshot.is_required(field_id);

            // A refused toggle is feedback, not a failure: report it and
            // leave the stored profile as it was
            match snapshot.toggle_required(field_id) {
                Ok(next) => {
                    profile.save(&next)?;
                    if was_required {
                        println!("{field_id} is no longer required");
                    } else {
                        println!(
                            "Marked {field_id} as required ({}/{REQUIRED_FIELD_CAP})",
                            next.required_fields.len()
                        );
                    }
                }
                Err(rejection) => {
                    println!("{} {rejection}", "warning:".yellow().bold());
                }
            }
        }
        Command::FieldAdd { name, label, kind } => {
            let profile = named(&account, name)?;
            match profile.snapshot()?.add_custom_field(label, *kind) {
                Ok(next) => {
                    profile.save(&next)?;
                    let added = next.fields.last().expect("a field was just appended");
                    println!("Added field {} as {}", label.bold(), added.id);
                }
                Err(rejection) => {
                    println!("{} {rejection}", "warning:".yellow().bold());
                }
            }
        }
        Command::FieldRm { name, field_id } => {
            let profile = named(&account, name)?;
            match profile.snapshot()?.delete_custom_field(field_id) {
                Ok(next) => {
                    profile.save(&next)?;
                    println!("Removed field {field_id}");
                }
                Err(rejection) => {
                    println!("{} {rejection}", "warning:".yellow().bold());
                }
            }
        }
    }

    Ok(())
}

/// Resolve the profile selection for display commands: `None` or the literal
/// name "default" mean catalogue order, anything else must name a stored
/// profile.
pub fn selected(
    account: &Account,
    name: Option<&str>,
) -> dira_lib::Result<Option<PreferenceProfile>> {
    match name {
        None | Some("default") => Ok(None),
        Some(name) => Ok(Some(named(account, name)?.snapshot()?)),
    }
}

fn named(account: &Account, name: &str) -> dira_lib::Result<Profile> {
    Ok(account
        .find_profile(name)?
        .ok_or_else(|| RepositoryError::UnknownProfile(name.to_string()))?)
}
