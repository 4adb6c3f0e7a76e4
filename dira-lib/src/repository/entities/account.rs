use std::fmt::{self, Debug, Display, Formatter};

use agdb::{DbId, DbValue, QueryBuilder};
use tracing::debug;

use crate::repository::{
    Cfg,
    db::{Db, models::AccountModel},
    entities::{EntityId, Error, Listing, Profile, Result, TrackedListing, Uid, get_field},
};

/// Represents a seeker account in the dira system.
///
/// Provides methods to inspect and modify this account's data, including
/// managing tracked listings and preference profiles. Always reflects the
/// current database state.
#[derive(Debug, Clone)]
pub struct Account {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
    pub(crate) cfg: Cfg,
}

impl Account {
    pub(crate) fn load(db_id: DbId, db: Db, cfg: Cfg) -> Result<Self> {
        let id = EntityId::load(&db, db_id)?;
        Ok(Self { id, db, cfg })
    }

    // Fields

    pub fn uid(&self) -> u64 {
        self.id.uid()
    }

    pub fn email(&self) -> Result<String> {
        self.get_field("email")
    }

    pub fn created_at(&self) -> Result<String> {
        self.get_field("created_at")
    }

    // Session state

    /// Make this account the active one
    pub fn activate(&self) -> Result<()> {
        let db_id = self.id.db_id(&self.db)?;
        self.db.write().transaction_mut(|t| {
            // Remove the `active` marker from whichever root edge carries it
            t.exec_mut(
                QueryBuilder::remove()
                    .values("active")
                    .search()
                    .from("accounts")
                    .where_()
                    .edge()
                    .query(),
            )?;
            // Mark the edge pointing to this account
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("active", true).into()]])
                    .search()
                    .from("accounts")
                    .to(db_id)
                    .where_()
                    .edge()
                    .query(),
            )?;

            Ok(())
        })
    }

    pub fn is_active(&self) -> Result<bool> {
        Ok(Account::active(self.db.clone(), self.cfg.clone())? == Some(self.clone()))
    }

    pub(crate) fn active(db: Db, cfg: Cfg) -> Result<Option<Account>> {
        let elements = db
            .read()
            .exec(
                QueryBuilder::select()
                    .search()
                    .from("accounts")
                    .where_()
                    .beyond()
                    .where_()
                    .keys("active")
                    .or()
                    .node()
                    .end_where()
                    .and()
                    .element::<AccountModel>()
                    .query(),
            )?
            .elements;

        if elements.len() > 1 {
            panic!("there should only be one active account");
        }

        // If we have an active account, load it
        if let Some(active) = elements.first() {
            return Ok(Some(Account::load(active.id, db, cfg)?));
        }

        Ok(None)
    }

    // Operations

    pub(crate) fn add(db: &Db, cfg: &Cfg, email: &str) -> Result<Self> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') || email.contains(char::is_whitespace) {
            return Err(Error::InvalidEmail(email.to_string()));
        }

        if Account::list(db, cfg)?
            .iter()
            .any(|a: &Account| a.email().unwrap() == email)
        {
            return Err(Error::DuplicateName);
        }

        let model = AccountModel::new(Uid::new(db)?, email);
        let account_id = db.write().transaction_mut(|t| -> Result<DbId> {
            let account_id = t
                .exec_mut(QueryBuilder::insert().element(model).query())?
                .elements
                .first()
                .expect("AccountModel insertion should return the ID as the first element")
                .id;

            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from("accounts")
                    .to(account_id)
                    .query(),
            )?;

            Ok(account_id)
        })?;

        let account = Account::load(account_id, db.clone(), cfg.clone())?;

        // The first account becomes the active session
        if Account::active(db.clone(), cfg.clone())?.is_none() {
            account.activate()?;
        }

        debug!("Created account: {email}");

        Ok(account)
    }

    pub(crate) fn list(db: &Db, cfg: &Cfg) -> Result<Vec<Self>> {
        Ok(db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<AccountModel>()
                    .search()
                    .from("accounts")
                    .where_()
                    .node()
                    .and()
                    .neighbor()
                    .query(),
            )?
            .elements
            .iter()
            .map(|e| Account::load(e.id, db.clone(), cfg.clone()).unwrap())
            .collect())
    }

    /// Search for an account by email
    pub(crate) fn search(db: &Db, cfg: &Cfg, email: &str) -> Result<Option<Account>> {
        Ok(Account::list(db, cfg)?
            .into_iter()
            .find(|a| a.email().map(|e| e == email).unwrap_or(false)))
    }

    pub fn remove(self) -> Result<()> {
        // Seeker-side data hangs off the account, so it goes with it
        for tracked in self.tracked_listings()? {
            tracked.remove()?;
        }
        for profile in self.profiles()? {
            profile.remove()?;
        }

        let email = self.email()?;
        let db_id = self.id.db_id(&self.db)?;
        self.db
            .write()
            .exec_mut(QueryBuilder::remove().ids(db_id).query())?;

        // Bootstrap an active account if there isn't one left
        if Account::active(self.db.clone(), self.cfg.clone())?.is_none()
            && let Some(first_account) = Account::list(&self.db, &self.cfg)?.first()
        {
            first_account.activate()?;
        }

        debug!("Removed account: {email}");

        Ok(())
    }

    // Tracked listings

    /// Start tracking one of dira's own listings. Tracking the same listing
    /// twice is rejected.
    pub fn track_listing(&self, listing: &Listing) -> Result<TrackedListing> {
        let listing_uid = listing.uid();
        for tracked in self.tracked_listings()? {
            if tracked.listing_uid()? == Some(listing_uid) {
                return Err(Error::AlreadyTracked);
            }
        }

        TrackedListing::add_internal(&self.db, self, listing)
    }

    /// Track an apartment found outside dira, entered by hand.
    pub fn track_external(
        &self,
        address: &str,
        rent: Option<f64>,
        notes: Option<&str>,
    ) -> Result<TrackedListing> {
        TrackedListing::add_external(&self.db, self, address, rent, notes)
    }

    pub fn tracked_listings(&self) -> Result<Vec<TrackedListing>> {
        TrackedListing::list(&self.db, self)
    }

    pub fn find_tracked(&self, uid: u64) -> Result<Option<TrackedListing>> {
        Ok(self
            .tracked_listings()?
            .into_iter()
            .find(|tracked| tracked.uid() == uid))
    }

    // Preference profiles

    pub fn add_profile(&self, name: &str) -> Result<Profile> {
        let base_fields = self.cfg.read().base_fields();
        Profile::add(&self.db, &self.cfg, self, name, &base_fields)
    }

    pub fn profiles(&self) -> Result<Vec<Profile>> {
        Profile::list(&self.db, &self.cfg, self)
    }

    pub fn find_profile(&self, name: &str) -> Result<Option<Profile>> {
        Ok(self
            .profiles()?
            .into_iter()
            .find(|p| p.name().map(|n| n == name).unwrap_or(false)))
    }

    fn get_field<T>(&self, field: &str) -> Result<T>
    where
        T: TryFrom<DbValue>,
        T::Error: Debug,
    {
        get_field(&self.db, self.id, field)
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.email()
                .unwrap_or_else(|_| "<invalid account email>".into())
        )
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod test {
    use crate::{Repository, repository::entities::Error};

    #[test]
    fn test_add() {
        let repo = Repository::mock();

        let account = repo.add_account("dana@example.com").unwrap();

        assert_eq!(account.email().unwrap(), "dana@example.com");
        assert_eq!(repo.accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_add_duplicate() {
        let repo = Repository::mock();

        repo.add_account("dana@example.com").unwrap();

        assert!(matches!(
            repo.add_account("dana@example.com"),
            Err(crate::Error::Repository(Error::DuplicateName))
        ));
    }

    #[test]
    fn test_add_invalid_email() {
        let repo = Repository::mock();

        assert!(matches!(
            repo.add_account("not an email"),
            Err(crate::Error::Repository(Error::InvalidEmail(_)))
        ));
    }

    #[test]
    fn test_first_account_becomes_active() {
        let repo = Repository::mock();

        let first = repo.add_account("dana@example.com").unwrap();
        let second = repo.add_account("noam@example.com").unwrap();

        assert!(first.is_active().unwrap());
        assert!(!second.is_active().unwrap());
    }

    #[test]
    fn test_activate() {
        let repo = Repository::mock();

        let first = repo.add_account("dana@example.com").unwrap();
        let second = repo.add_account("noam@example.com").unwrap();

        second.activate().unwrap();

        assert!(!first.is_active().unwrap());
        assert!(second.is_active().unwrap());
        assert_eq!(repo.active_account().unwrap(), Some(second));
    }

    #[test]
    fn test_remove_promotes_next_account() {
        let repo = Repository::mock();

        let first = repo.add_account("dana@example.com").unwrap();
        let second = repo.add_account("noam@example.com").unwrap();

        first.remove().unwrap();

        assert!(second.is_active().unwrap());
        assert_eq!(repo.accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_takes_seeker_data_along() {
        let repo = Repository::mock();

        let account = repo.add_account("dana@example.com").unwrap();
        account
            .track_external("12 Herzl St, Tel Aviv", Some(5200.0), None)
            .unwrap();
        account.add_profile("Just me").unwrap();

        account.remove().unwrap();

        assert_eq!(repo.accounts().unwrap().len(), 0);
    }
}
