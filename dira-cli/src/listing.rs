use clap::Subcommand;
use colored::Colorize;
use dira_lib::{
    Listing, Repository, RepositoryError,
    fields::{FieldValue, ListingField, builtin_listing_fields, listing_field_id, parse_field_spec},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Publish a new listing
    Create {
        /// Email the edit token is issued to
        #[arg(long)]
        owner_email: String,
        #[arg(long)]
        address: String,
        /// Monthly rent
        #[arg(long)]
        rent: f64,
        #[arg(long)]
        floor: f64,
        /// The apartment has a balcony
        #[arg(long)]
        balcony: bool,
        /// Extra fields as "Label:kind=value" (kind: text|long_text|number|boolean)
        #[arg(long = "field")]
        fields: Vec<String>,
    },
    /// List published listings
    List,
    /// Show a listing's fields
    Show { id: u64 },
    /// Change one field's value (requires the edit token)
    Set {
        id: u64,
        field_id: String,
        value: String,
        #[arg(long)]
        token: String,
    },
    /// Take a listing down (requires the edit token)
    Remove {
        id: u64,
        #[arg(long)]
        token: String,
    },
}

pub fn handle(repo: &Repository, cmd: &Command) -> dira_lib::Result<()> {
    match cmd {
        Command::Create {
            owner_email,
            address,
            rent,
            floor,
            balcony,
            fields,
        } => {
            let values = [
                FieldValue::Text(address.clone()),
                FieldValue::Number(*rent),
                FieldValue::Number(*floor),
                FieldValue::Boolean(*balcony),
            ];

            let mut listing_fields: Vec<ListingField> = builtin_listing_fields()
                .into_iter()
                .zip(values)
                .enumerate()
                .map(|(position, (def, value))| ListingField {
                    id: def.id,
                    label: def.label,
                    kind: def.kind,
                    value,
                    is_custom: false,
                    position: u64::try_from(position).expect("field positions fit in u64"),
                })
                .collect();

            for spec in fields {
                let (label, kind, value) = parse_field_spec(spec)?;
                let id = listing_field_id(&label, &listing_fields);
                let position =
                    u64::try_from(listing_fields.len()).expect("field positions fit in u64");
                listing_fields.push(ListingField {
                    id,
                    label,
                    kind,
                    value,
                    is_custom: true,
                    position,
                });
            }

            let listing = repo.create_listing(owner_email, &listing_fields)?;
            println!("Published listing {}", listing.uid().to_string().bold());
            println!(
                "Edit token (keep it somewhere safe): {}",
                listing.edit_token()?.yellow()
            );
        }
        Command::List => {
            let currency = repo.currency();
            for listing in repo.listings()? {
                let rent = listing
                    .fields()?
                    .into_iter()
                    .find(|field| field.id == "rent")
                    .map(|field| format!("{currency}{}", field.value))
                    .unwrap_or_default();
                println!("{:>4}  {}  {rent}", listing.uid(), listing.address()?);
            }
        }
        Command::Show { id } => {
            let listing = named(repo, *id)?;
            println!("{}", listing.address()?.bold());
            println!(
                "Published {} by {}",
                listing.created_at()?,
                listing.owner_email()?
            );
            for field in listing.fields()? {
                println!("  {}: {}", field.label, field.value);
            }
        }
        Command::Set {
            id,
            field_id,
            value,
            token,
        } => {
            named(repo, *id)?.set_field_value(field_id, value, token)?;
            println!("Updated {field_id} on listing {id}");
        }
        Command::Remove { id, token } => {
            named(repo, *id)?.remove(token)?;
            println!("Removed listing {id}");
        }
    }

    Ok(())
}

fn named(repo: &Repository, id: u64) -> dira_lib::Result<Listing> {
    repo.find_listing(id)?
        .ok_or_else(|| RepositoryError::UnknownListing(id).into())
}
