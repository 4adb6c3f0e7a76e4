use clap::Subcommand;
use colored::Colorize;
use dira_lib::{Repository, RepositoryError, TrackSource};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Track one of dira's published listings
    Add { listing_id: u64 },
    /// Track an apartment found elsewhere
    AddExternal {
        #[arg(long)]
        address: String,
        /// Monthly rent
        #[arg(long)]
        rent: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tracked apartments with dashboard stats
    List,
    /// Stop tracking an apartment
    Remove { id: u64 },
}

pub fn handle(
    repo: &Repository,
    account_override: Option<&str>,
    cmd: &Command,
) -> dira_lib::Result<()> {
    let account = crate::account::resolve(repo, account_override)?;

    match cmd {
        Command::Add { listing_id } => {
            let listing = repo
                .find_listing(*listing_id)?
                .ok_or(RepositoryError::UnknownListing(*listing_id))?;
            let tracked = account.track_listing(&listing)?;
            println!(
                "Tracking {} as {}",
                listing.address()?.bold(),
                tracked.uid()
            );
        }
        Command::AddExternal {
            address,
            rent,
            notes,
        } => {
            let tracked = account.track_external(address, *rent, notes.as_deref())?;
            println!("Tracking {} as {}", address.bold(), tracked.uid());
        }
        Command::List => {
            let currency = repo.currency();
            let tracked = account.tracked_listings()?;

            let mut external = 0_u32;
            let mut rating_sum = 0.0;

            for entry in &tracked {
                let source = entry.source()?;
                let badge = match source {
                    TrackSource::Internal => "internal".green(),
                    TrackSource::ExternalManual => "external".cyan(),
                };
                if source == TrackSource::ExternalManual {
                    external += 1;
                }

                let checklist = entry.checklist()?;
                let rating = match checklist.average_rating() {
                    Some(average) => {
                        rating_sum += average;
                        format!("{average:.1}/5")
                    }
                    None => "not rated".dimmed().to_string(),
                };

                let rent = match entry.rent()? {
                    Some(rent) => format!("  {currency}{rent}"),
                    None => String::new(),
                };

                println!(
                    "{:>4}  [{badge}]  {}{rent}  {rating}",
                    entry.uid(),
                    entry.display_name()?
                );
            }

            // The dashboard summary: apartments that have no ratings yet
            // still count into the average, as zero
            let total = u32::try_from(tracked.len()).expect("tracked count fits in u32");
            let average = if total == 0 {
                0.0
            } else {
                rating_sum / f64::from(total)
            };
            println!(
                "\n{total} tracked · average rating {average:.1} · {external} external"
            );
        }
        Command::Remove { id } => {
            account
                .find_tracked(*id)?
                .ok_or(RepositoryError::UnknownTracked(*id))?
                .remove()?;
            println!("Stopped tracking {id}");
        }
    }

    Ok(())
}
