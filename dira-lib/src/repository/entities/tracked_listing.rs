use std::fmt::Debug;

use agdb::{DbId, DbValue, QueryBuilder, QueryId};
use tracing::debug;

use crate::{
    checklist::{Photo, PrivateChecklist, Rating},
    repository::{
        db::{
            Db,
            models::{PhotoModel, RatingModel, TrackSource, TrackedModel},
        },
        entities::{Account, EntityId, Error, Listing, Result, Uid, get_field},
    },
};

/// Represents one apartment on a seeker's dashboard.
///
/// A tracked listing either points at one of dira's own listings or holds
/// manually entered data for an apartment found elsewhere. The private
/// checklist attached to it is loaded and saved as a whole. Always reflects
/// the current database state.
#[derive(Debug, Clone)]
pub struct TrackedListing {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl TrackedListing {
    pub(crate) fn load(db_id: DbId, db: Db) -> Result<Self> {
        let id = EntityId::load(&db, db_id)?;
        Ok(Self { id, db })
    }

    // Fields

    pub fn uid(&self) -> u64 {
        self.id.uid()
    }

    pub fn source(&self) -> Result<TrackSource> {
        self.get_field("source")
    }

    /// UID of the internal listing this entry points at, if any.
    pub fn listing_uid(&self) -> Result<Option<u64>> {
        let uid: u64 = self.get_field("listing_uid")?;
        Ok((uid != 0).then_some(uid))
    }

    pub fn listing(&self) -> Result<Option<Listing>> {
        match self.listing_uid()? {
            Some(uid) => Listing::find(&self.db, uid),
            None => Ok(None),
        }
    }

    pub fn address(&self) -> Result<String> {
        self.get_field("address")
    }

    /// Monthly rent, when one was given.
    pub fn rent(&self) -> Result<Option<f64>> {
        let rent: f64 = self.get_field("rent")?;
        Ok((rent > 0.0).then_some(rent))
    }

    pub fn notes(&self) -> Result<String> {
        self.get_field("notes")
    }

    pub fn created_at(&self) -> Result<String> {
        self.get_field("created_at")
    }

    /// What to call this apartment in a list: the address for external
    /// entries, the listing's address for internal ones (or a placeholder if
    /// the listing has since been deleted).
    pub fn display_name(&self) -> Result<String> {
        match self.source()? {
            TrackSource::ExternalManual => self.address(),
            TrackSource::Internal => match self.listing()? {
                Some(listing) => listing.address(),
                None => Ok(format!(
                    "listing #{} (no longer published)",
                    self.listing_uid()?.unwrap_or_default()
                )),
            },
        }
    }

    // Checklist

    /// Pull the whole private checklist into a snapshot.
    pub fn checklist(&self) -> Result<PrivateChecklist> {
        let mut checklist = PrivateChecklist {
            ratings: Default::default(),
            general_notes: self.get_field("general_notes")?,
            pros: self.get_field("pros")?,
            cons: self.get_field("cons")?,
            photos: Vec::new(),
        };

        for element_id in self.child_node_ids("score")? {
            let id = EntityId::load(&self.db, element_id)?;
            let field_id: String = get_field(&self.db, id, "field_id")?;
            let score: u64 = get_field(&self.db, id, "score")?;
            let notes: String = get_field(&self.db, id, "notes")?;

            let score = u8::try_from(score).expect("stored scores fit in u8");
            let rating = Rating::new(score, notes).expect("stored scores are validated on save");
            checklist.ratings.insert(field_id, rating);
        }

        for element_id in self.child_node_ids("url")? {
            let id = EntityId::load(&self.db, element_id)?;
            checklist.photos.push(Photo {
                url: get_field(&self.db, id, "url")?,
                created_at: get_field(&self.db, id, "created_at")?,
            });
        }

        checklist
            .photos
            .sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(checklist)
    }

    /// Persist a whole checklist snapshot, replacing whatever was stored.
    pub fn save_checklist(&self, checklist: &PrivateChecklist) -> Result<()> {
        let db_id = self.id.db_id(&self.db)?;

        let mut stale = self.child_node_ids("score")?;
        stale.extend(self.child_node_ids("url")?);

        let rating_models = checklist
            .ratings
            .iter()
            .map(|(field_id, rating)| Ok(RatingModel::new(Uid::new(&self.db)?, field_id, rating)))
            .collect::<Result<Vec<_>>>()?;
        let photo_models = checklist
            .photos
            .iter()
            .map(|photo| Ok(PhotoModel::new(Uid::new(&self.db)?, photo)))
            .collect::<Result<Vec<_>>>()?;

        self.db.write().transaction_mut(|t| -> Result<()> {
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[
                        ("general_notes", checklist.general_notes.as_str()).into(),
                        ("pros", checklist.pros.as_str()).into(),
                        ("cons", checklist.cons.as_str()).into(),
                    ]])
                    .ids(db_id)
                    .query(),
            )?;

            if !stale.is_empty() {
                t.exec_mut(QueryBuilder::remove().ids(stale).query())?;
            }

            for model in rating_models {
                let rating_id = t
                    .exec_mut(QueryBuilder::insert().element(model).query())?
                    .elements
                    .first()
                    .expect("RatingModel insertion should return the ID as the first element")
                    .id;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(db_id)
                        .to(rating_id)
                        .query(),
                )?;
            }

            for model in photo_models {
                let photo_id = t
                    .exec_mut(QueryBuilder::insert().element(model).query())?
                    .elements
                    .first()
                    .expect("PhotoModel insertion should return the ID as the first element")
                    .id;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(db_id)
                        .to(photo_id)
                        .query(),
                )?;
            }

            Ok(())
        })?;

        debug!("Saved checklist for tracked listing {}", self.uid());

        Ok(())
    }

    // Operations

    pub fn remove(self) -> Result<()> {
        let uid = self.uid();

        let mut children = self.child_node_ids("score")?;
        children.extend(self.child_node_ids("url")?);
        let db_id = self.id.db_id(&self.db)?;

        self.db.write().transaction_mut(|t| -> Result<()> {
            if !children.is_empty() {
                t.exec_mut(QueryBuilder::remove().ids(children).query())?;
            }
            t.exec_mut(QueryBuilder::remove().ids(db_id).query())?;

            Ok(())
        })?;

        debug!("Removed tracked listing: {uid}");

        Ok(())
    }

    pub(crate) fn add_internal(db: &Db, account: &Account, listing: &Listing) -> Result<Self> {
        let model = TrackedModel::internal(Uid::new(db)?, listing.uid());
        let tracked = Self::insert(db, account, model)?;

        debug!(
            "Account {} now tracks listing {}",
            account.uid(),
            listing.uid()
        );

        Ok(tracked)
    }

    pub(crate) fn add_external(
        db: &Db,
        account: &Account,
        address: &str,
        rent: Option<f64>,
        notes: Option<&str>,
    ) -> Result<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::MissingAddress);
        }

        let model = TrackedModel::external(
            Uid::new(db)?,
            address,
            rent.unwrap_or_default(),
            notes.unwrap_or_default(),
        );
        let tracked = Self::insert(db, account, model)?;

        debug!("Account {} now tracks external apartment", account.uid());

        Ok(tracked)
    }

    fn insert(db: &Db, account: &Account, model: TrackedModel) -> Result<Self> {
        let account_id = account.id.db_id(db)?;
        let tracked_id = db.write().transaction_mut(|t| -> Result<DbId> {
            let tracked_id = t
                .exec_mut(QueryBuilder::insert().element(model).query())?
                .elements
                .first()
                .expect("TrackedModel insertion should return the ID as the first element")
                .id;

            // Link to the owning account and the root node
            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from([QueryId::from("tracked_listings"), QueryId::from(account_id)])
                    .to(tracked_id)
                    .query(),
            )?;

            Ok(tracked_id)
        })?;

        TrackedListing::load(tracked_id, db.clone())
    }

    pub(crate) fn list(db: &Db, account: &Account) -> Result<Vec<Self>> {
        let account_id = account.id.db_id(db)?;
        Ok(db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<TrackedModel>()
                    .search()
                    .from(account_id)
                    .where_()
                    .neighbor()
                    .and()
                    .keys("source")
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| TrackedListing::load(e.id, db.clone()).unwrap())
            .collect())
    }

    /// Direct children of this entry carrying the given key (rating or photo
    /// nodes).
    fn child_node_ids(&self, key: &str) -> Result<Vec<DbId>> {
        let db_id = self.id.db_id(&self.db)?;
        Ok(self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .search()
                    .from(db_id)
                    .where_()
                    .neighbor()
                    .and()
                    .keys(key)
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| e.id)
            .collect())
    }

    fn get_field<T>(&self, field: &str) -> Result<T>
    where
        T: TryFrom<DbValue>,
        T::Error: Debug,
    {
        get_field(&self.db, self.id, field)
    }
}

impl PartialEq for TrackedListing {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod test {
    use crate::{
        Repository, TrackSource,
        fields::{FieldValue, ListingField, builtin_listing_fields},
        repository::entities::Error,
    };

    fn listing_fields() -> Vec<ListingField> {
        let values = [
            FieldValue::Text("8 Rothschild Blvd, Tel Aviv".to_string()),
            FieldValue::Number(6800.0),
            FieldValue::Number(2.0),
            FieldValue::Boolean(false),
        ];

        builtin_listing_fields()
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(position, (def, value))| ListingField {
                id: def.id,
                label: def.label,
                kind: def.kind,
                value,
                is_custom: false,
                position: u64::try_from(position).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_track_internal() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let listing = repo
            .create_listing("landlord@example.com", &listing_fields())
            .unwrap();

        let tracked = account.track_listing(&listing).unwrap();

        assert_eq!(tracked.source().unwrap(), TrackSource::Internal);
        assert_eq!(tracked.listing_uid().unwrap(), Some(listing.uid()));
        assert_eq!(
            tracked.display_name().unwrap(),
            "8 Rothschild Blvd, Tel Aviv"
        );
        assert_eq!(account.tracked_listings().unwrap().len(), 1);
    }

    #[test]
    fn test_track_internal_twice_rejected() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let listing = repo
            .create_listing("landlord@example.com", &listing_fields())
            .unwrap();

        account.track_listing(&listing).unwrap();

        assert!(matches!(
            account.track_listing(&listing),
            Err(Error::AlreadyTracked)
        ));
    }

    #[test]
    fn test_track_external() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();

        let tracked = account
            .track_external("4 Bialik St, Ramat Gan", Some(4300.0), Some("no elevator"))
            .unwrap();

        assert_eq!(tracked.source().unwrap(), TrackSource::ExternalManual);
        assert_eq!(tracked.listing_uid().unwrap(), None);
        assert_eq!(tracked.rent().unwrap(), Some(4300.0));
        assert_eq!(tracked.notes().unwrap(), "no elevator");
    }

    #[test]
    fn test_track_external_needs_address() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();

        assert!(matches!(
            account.track_external("   ", None, None),
            Err(Error::MissingAddress)
        ));
    }

    #[test]
    fn test_checklist_starts_empty() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let tracked = account
            .track_external("4 Bialik St, Ramat Gan", None, None)
            .unwrap();

        let checklist = tracked.checklist().unwrap();

        assert!(checklist.ratings.is_empty());
        assert!(checklist.general_notes.is_empty());
        assert_eq!(checklist.average_rating(), None);
    }

    #[test]
    fn test_checklist_round_trip() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let tracked = account
            .track_external("4 Bialik St, Ramat Gan", None, None)
            .unwrap();

        let mut checklist = tracked.checklist().unwrap();
        checklist.rate("location", 4, Some("close to work")).unwrap();
        checklist.rate("price", 2, None).unwrap();
        checklist.general_notes = "second viewing scheduled".to_string();
        checklist.pros = "big kitchen".to_string();
        checklist.cons = "street noise".to_string();
        checklist.add_photo("https://example.com/balcony.jpg");

        tracked.save_checklist(&checklist).unwrap();

        let stored = tracked.checklist().unwrap();
        assert_eq!(stored, checklist);
    }

    #[test]
    fn test_checklist_save_replaces_old_ratings() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let tracked = account
            .track_external("4 Bialik St, Ramat Gan", None, None)
            .unwrap();

        let mut checklist = tracked.checklist().unwrap();
        checklist.rate("location", 4, None).unwrap();
        checklist.rate("price", 2, None).unwrap();
        tracked.save_checklist(&checklist).unwrap();

        let mut checklist = tracked.checklist().unwrap();
        checklist.ratings.remove("price");
        checklist.rate("location", 5, None).unwrap();
        tracked.save_checklist(&checklist).unwrap();

        let stored = tracked.checklist().unwrap();
        assert_eq!(stored.ratings.len(), 1);
        assert_eq!(stored.rating("location").unwrap().score(), 5);
    }

    #[test]
    fn test_remove() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let tracked = account
            .track_external("4 Bialik St, Ramat Gan", None, None)
            .unwrap();

        let mut checklist = tracked.checklist().unwrap();
        checklist.rate("location", 3, None).unwrap();
        tracked.save_checklist(&checklist).unwrap();

        tracked.remove().unwrap();

        assert_eq!(account.tracked_listings().unwrap().len(), 0);
    }

    #[test]
    fn test_display_name_survives_listing_removal() {
        let repo = Repository::mock();
        let account = repo.add_account("dana@example.com").unwrap();
        let listing = repo
            .create_listing("landlord@example.com", &listing_fields())
            .unwrap();
        let tracked = account.track_listing(&listing).unwrap();

        let token = listing.edit_token().unwrap();
        listing.remove(&token).unwrap();

        assert!(tracked.display_name().unwrap().contains("no longer published"));
    }
}
