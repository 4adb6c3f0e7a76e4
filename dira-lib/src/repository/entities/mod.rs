//! Core domain entities for dira.
//!
//! These types represent accounts, listings, tracked apartments, and
//! preference profiles. They provide a unified interface for inspecting and
//! mutating these elements, handling all necessary database operations
//! behind the scenes. Entities always reflect the current database state;
//! snapshot types (preference profiles, checklists) are pulled and saved
//! wholesale through them.

use std::fmt::Debug;

use agdb::{DbId, DbValue, QueryBuilder};
use thiserror::Error;

use crate::repository::db::Db;

mod account;
mod entity_id;
mod listing;
mod profile;
mod tracked_listing;

pub(crate) use entity_id::EntityId;

pub use account::Account;
pub use listing::Listing;
pub use profile::Profile;
pub use tracked_listing::TrackedListing;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("internal database error: {0}")]
    Internal(#[from] agdb::DbError),
    #[error("this entity no longer exists in the database")]
    RemovedEntity,
    #[error("an entity with that name already exists")]
    DuplicateName,
    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),
    #[error("that listing is already tracked")]
    AlreadyTracked,
    #[error("an external listing needs an address")]
    MissingAddress,
    #[error("edit token does not match this listing")]
    EditTokenMismatch,
    #[error("built-in listing field {0:?} needs a value")]
    MissingFieldValue(String),
    #[error("no field with id {0:?} on this listing")]
    UnknownListingField(String),
    #[error("no account is active")]
    NoActiveAccount,
    #[error("no account with email {0:?}")]
    UnknownAccount(String),
    #[error("no listing with id {0}")]
    UnknownListing(u64),
    #[error("no tracked apartment with id {0}")]
    UnknownTracked(u64),
    #[error("no profile named {0:?}")]
    UnknownProfile(String),
    #[error(transparent)]
    Rejected(#[from] crate::prefs::Rejection),
    #[error(transparent)]
    InvalidValue(#[from] crate::fields::FieldError),
}

/// A unique identifier that survives database id reuse.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Uid(pub(crate) u64);

impl Uid {
    /// Allocate the next free UID from the counter node.
    pub fn new(db: &Db) -> Result<Self> {
        let uid = db.write().transaction_mut(|t| -> Result<u64> {
            let uid = t
                .exec(
                    QueryBuilder::select()
                        .values("next_uid")
                        .ids("next_uid")
                        .query(),
                )?
                .elements
                .pop()
                .expect("successful queries should not be empty")
                .values
                .pop()
                .expect("successful queries should not be empty")
                .value
                .to_u64()?;

            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("next_uid", uid + 1).into()]])
                    .ids("next_uid")
                    .query(),
            )?;

            Ok(uid)
        })?;

        Ok(Self(uid))
    }

    /// Read the UID stored on an existing element.
    pub fn load(db: &Db, db_id: DbId) -> Result<Self> {
        let uid = db
            .read()
            .exec(QueryBuilder::select().values("uid").ids(db_id).query())?
            .elements
            .pop()
            .expect("successful queries should not be empty")
            .values
            .pop()
            .expect("successful queries should not be empty")
            .value
            .to_u64()?;

        Ok(Self(uid))
    }
}

pub(crate) fn get_field<T>(db: &Db, id: EntityId, field: &str) -> Result<T>
where
    T: TryFrom<DbValue>,
    T::Error: Debug,
{
    let db_id = id.db_id(db)?;
    let value = db
        .read()
        .exec(QueryBuilder::select().values(field).ids(db_id).query())?
        .elements
        .pop()
        .expect("successful queries should not be empty")
        .values
        .pop()
        .expect("successful queries should not be empty")
        .value;

    Ok(T::try_from(value).expect("conversion from a `DbValue` must succeed"))
}

pub(crate) fn set_field<T>(db: &Db, id: EntityId, field: &str, value: T) -> Result<()>
where
    T: Into<DbValue>,
{
    let db_id = id.db_id(db)?;
    db.write().exec_mut(
        QueryBuilder::insert()
            .values([[(field, value).into()]])
            .ids(db_id)
            .query(),
    )?;

    Ok(())
}
