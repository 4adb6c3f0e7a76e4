use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    Result,
    fields::ListingField,
    prefs::ProfileField,
    repository::{config::CoreConfig, db::Db},
};

mod db;

pub mod config;
pub mod entities;

pub(crate) use config::Cfg;
pub use db::models::TrackSource;
pub use entities::{Account, Listing, Profile, TrackedListing};

/// Central access point for all persistent data.
///
/// The [`Repository`] handles the database and configuration file and
/// provides a single, consistent interface for reading and writing accounts,
/// listings, tracked apartments, and preference profiles.
#[derive(Clone, Debug)]
pub struct Repository {
    db: Db,
    cfg: Cfg,
}

impl Repository {
    pub fn new() -> Self {
        Self {
            db: Db::new(),
            cfg: Arc::new(RwLock::new(CoreConfig::load())),
        }
    }

    // Accounts

    pub fn add_account(&self, email: &str) -> Result<Account> {
        Ok(Account::add(&self.db, &self.cfg, email)?)
    }

    pub fn accounts(&self) -> Result<Vec<Account>> {
        Ok(Account::list(&self.db, &self.cfg)?)
    }

    pub fn find_account(&self, email: &str) -> Result<Option<Account>> {
        Ok(Account::search(&self.db, &self.cfg, email)?)
    }

    pub fn active_account(&self) -> Result<Option<Account>> {
        Ok(Account::active(self.db.clone(), self.cfg.clone())?)
    }

    // Listings

    pub fn create_listing(&self, owner_email: &str, fields: &[ListingField]) -> Result<Listing> {
        Ok(Listing::add(&self.db, owner_email, fields)?)
    }

    pub fn listings(&self) -> Result<Vec<Listing>> {
        Ok(Listing::list(&self.db)?)
    }

    pub fn find_listing(&self, uid: u64) -> Result<Option<Listing>> {
        Ok(Listing::find(&self.db, uid)?)
    }

    // Configuration

    /// The base checklist catalogue from the configuration (or the built-in
    /// six categories).
    pub fn base_fields(&self) -> Vec<ProfileField> {
        self.cfg.read().base_fields()
    }

    /// Currency symbol for money display.
    pub fn currency(&self) -> String {
        self.cfg.read().currency().clone()
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] with an in-memory database
    /// and configuration file.
    pub(crate) fn mock() -> Self {
        Self {
            db: Db::in_memory(),
            cfg: Arc::new(RwLock::new(CoreConfig::mock())),
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
