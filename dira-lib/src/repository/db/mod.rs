use std::sync::Arc;

use agdb::{DbAny, DbError, QueryBuilder};
use derive_more::Deref;
use parking_lot::RwLock;

use crate::fs::state_dir;

pub(crate) mod models;

/// Version stamp of the on-disk graph layout. Bumped when the shape of the
/// stored models changes.
pub(crate) const CURRENT_MODEL_VERSION: u64 = 1;

#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
}

impl Db {
    pub fn new() -> Self {
        let path = state_dir().join("data.db");
        let path_str = path.to_str().unwrap();

        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_file(path_str).unwrap())),
        };

        db.init();

        db
    }

    fn init(&mut self) {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())
            .unwrap()
            .result;

        if alias_count == 0 {
            self.db
                .write()
                .transaction_mut(|t| -> Result<(), DbError> {
                    t.exec_mut(
                        QueryBuilder::insert()
                            .nodes()
                            .aliases([
                                // Root element nodes
                                "accounts",
                                "listings",
                                "profiles",
                                "tracked_listings",
                                // State nodes
                                "model_version",
                                "next_uid",
                            ])
                            .query(),
                    )?;

                    // UID handed to the next inserted entity; incremented on
                    // every allocation. Starts at 1 so 0 can mean "no entity".
                    t.exec_mut(
                        QueryBuilder::insert()
                            .values([[("next_uid", 1_u64).into()]])
                            .ids("next_uid")
                            .query(),
                    )?;

                    t.exec_mut(
                        QueryBuilder::insert()
                            .values([[("version", CURRENT_MODEL_VERSION).into()]])
                            .ids("model_version")
                            .query(),
                    )?;

                    Ok(())
                })
                .unwrap();

            return;
        }

        let version = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .values("version")
                    .ids("model_version")
                    .query(),
            )
            .unwrap()
            .elements
            .pop()
            .expect("the model_version node is created at first init")
            .values
            .pop()
            .expect("the model_version node carries a version value")
            .value
            .to_u64()
            .unwrap();

        if version < CURRENT_MODEL_VERSION {
            self.backup();
            self.migrate();
        }
    }

    /// Perform a backup of the database
    fn backup(&self) {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = state_dir().join(format!("data-{}.db.bak", timestamp));
        let path_str = path.to_str().unwrap();

        self.db.write().backup(path_str).unwrap();
    }

    /// Perform database migrations
    fn migrate(&self) {
        todo!()
    }

    /// Create a memory backed database for use in tests
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_memory("test").unwrap())),
        };

        db.init();

        db
    }
}
