use clap::Subcommand;
use colored::Colorize;
use dira_lib::{
    Account, Repository, RepositoryError, TrackedListing, prefs::resolve_field_order,
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the checklist, ordered by a preference profile
    Show {
        tracked_id: u64,
        /// Profile to order by; omitted or "default" keeps catalogue order
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Rate a checklist field from 1 to 5
    Rate {
        tracked_id: u64,
        field_id: String,
        score: u8,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set the free-form notes sections
    Note {
        tracked_id: u64,
        #[arg(long)]
        general: Option<String>,
        #[arg(long)]
        pros: Option<String>,
        #[arg(long)]
        cons: Option<String>,
    },
    /// Attach a photo URL
    Photo { tracked_id: u64, url: String },
}

pub fn handle(
    repo: &Repository,
    account_override: Option<&str>,
    cmd: &Command,
) -> dira_lib::Result<()> {
    let account = crate::account::resolve(repo, account_override)?;

    match cmd {
        Command::Show {
            tracked_id,
            profile,
        } => {
            let tracked = named(&account, *tracked_id)?;
            let selected = crate::profile::selected(&account, profile.as_deref())?;
            let ordered = resolve_field_order(&repo.base_fields(), selected.as_ref());
            let checklist = tracked.checklist()?;

            println!("{}", tracked.display_name()?.bold());
            if let Some(average) = checklist.average_rating() {
                println!("Average rating: {average:.1}/5");
            }

            for field in &ordered {
                let required = selected
                    .as_ref()
                    .map(|profile| profile.is_required(&field.id))
                    .unwrap_or(false);
                let marker = if required {
                    " *".red().to_string()
                } else {
                    String::new()
                };

                match checklist.rating(&field.id) {
                    Some(rating) => {
                        let notes = if rating.notes.is_empty() {
                            String::new()
                        } else {
                            format!("  {}", rating.notes)
                        };
                        println!("  {}{marker}  {}{notes}", field.label, stars(rating.score()));
                    }
                    None => println!("  {}{marker}  {}", field.label, "not rated".dimmed()),
                }
            }

            if !checklist.general_notes.is_empty() {
                println!("\nNotes: {}", checklist.general_notes);
            }
            if !checklist.pros.is_empty() {
                println!("{} {}", "Pros:".green(), checklist.pros);
            }
            if !checklist.cons.is_empty() {
                println!("{} {}", "Cons:".red(), checklist.cons);
            }
            for photo in &checklist.photos {
                println!("Photo: {}", photo.url);
            }
        }
        Command::Rate {
            tracked_id,
            field_id,
            score,
            notes,
        } => {
            let tracked = named(&account, *tracked_id)?;
            let mut checklist = tracked.checklist()?;
            checklist.rate(field_id, *score, notes.as_deref())?;
            tracked.save_checklist(&checklist)?;
            println!("Rated {field_id} {}", stars(*score));
        }
        Command::Note {
            tracked_id,
            general,
            pros,
            cons,
        } => {
            let tracked = named(&account, *tracked_id)?;
            let mut checklist = tracked.checklist()?;
            if let Some(general) = general {
                checklist.general_notes = general.clone();
            }
            if let Some(pros) = pros {
                checklist.pros = pros.clone();
            }
            if let Some(cons) = cons {
                checklist.cons = cons.clone();
            }
            tracked.save_checklist(&checklist)?;
            println!("Saved notes for {tracked_id}");
        }
        Command::Photo { tracked_id, url } => {
            let tracked = named(&account, *tracked_id)?;
            let mut checklist = tracked.checklist()?;
            checklist.add_photo(url);
            tracked.save_checklist(&checklist)?;
            println!("Attached photo to {tracked_id}");
        }
    }

    Ok(())
}

fn named(account: &Account, tracked_id: u64) -> dira_lib::Result<TrackedListing> {
    Ok(account
        .find_tracked(tracked_id)?
        .ok_or(RepositoryError::UnknownTracked(tracked_id))?)
}

fn stars(score: u8) -> String {
    format!(
        "{}{}",
        "★".repeat(usize::from(score)).yellow(),
        "☆".repeat(usize::from(5_u8.saturating_sub(score))).dimmed()
    )
}
