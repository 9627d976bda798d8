//! Account records and the stores that hold them.
//!
//! [`AccountDirectory`] is the keyed-document boundary the app talks to.
//! [`LocalAccountStore`] implements it on a local SQLite file and adds the
//! offline credential lookup used when no network store is reachable.

use std::future::Future;

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::db::models::{AccountRow, NewAccountRow};
use crate::db::{self, DbPool, operations};
use crate::error::AccountError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Account {
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            username: row.username,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

/// What a new user submits at sign-up. The password is hashed before it is
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_admin: bool,
}

/// Account documents addressed by username.
pub trait AccountDirectory {
    /// The stored account, or `None` when it is missing or cannot be read.
    fn fetch_account(&self, username: &str) -> impl Future<Output = Option<Account>> + Send;

    fn create_account(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<Account, AccountError>> + Send;
}

#[derive(Clone)]
pub struct LocalAccountStore {
    pool: DbPool,
    hash_cost: u32,
}

impl LocalAccountStore {
    /// Open (creating if needed) the database at `database_url` and bring its
    /// schema up to date.
    pub async fn open(database_url: &str) -> Result<Self, AccountError> {
        let url = database_url.to_string();
        let pool = tokio::task::spawn_blocking(move || -> Result<DbPool, AccountError> {
            let pool = db::establish_pool(&url)?;
            let mut conn = pool.get()?;
            db::run_migrations(&mut conn)?;
            Ok(pool)
        })
        .await??;

        info!("Account store ready at {}", database_url);
        Ok(Self {
            pool,
            hash_cost: bcrypt::DEFAULT_COST,
        })
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, AccountError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, AccountError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await?
    }

    /// Offline credential check. `None` for an unknown user or a wrong
    /// password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        let username = username.trim().to_string();
        let password = password.to_string();
        self.with_conn(move |conn| {
            let Some(row) = operations::find_account(conn, &username)? else {
                debug!("No local account for {}", username);
                return Ok(None);
            };
            if bcrypt::verify(&password, &row.password_hash)? {
                Ok(Some(Account::from(row)))
            } else {
                debug!("Password mismatch for {}", username);
                Ok(None)
            }
        })
        .await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, AccountError> {
        self.with_conn(|conn| {
            Ok(operations::list_accounts(conn)?
                .into_iter()
                .map(Account::from)
                .collect())
        })
        .await
    }

    /// Returns whether an account was removed.
    pub async fn delete_account(&self, username: &str) -> Result<bool, AccountError> {
        let username = username.trim().to_string();
        self.with_conn(move |conn| Ok(operations::delete_account(conn, &username)? > 0))
            .await
    }

    pub async fn reset(&self) -> Result<(), AccountError> {
        let removed = self
            .with_conn(|conn| Ok(operations::delete_all_accounts(conn)?))
            .await?;
        info!("Removed {} local accounts", removed);
        Ok(())
    }
}

impl AccountDirectory for LocalAccountStore {
    async fn fetch_account(&self, username: &str) -> Option<Account> {
        let key = username.trim().to_string();
        match self
            .with_conn(move |conn| Ok(operations::find_account(conn, &key)?))
            .await
        {
            Ok(row) => row.map(Account::from),
            Err(e) => {
                warn!("Failed to fetch account {}: {}", username, e);
                None
            }
        }
    }

    async fn create_account(&self, registration: &Registration) -> Result<Account, AccountError> {
        let username = registration.username.trim().to_string();
        if username.is_empty() {
            return Err(AccountError::InvalidUsername);
        }
        let password = registration.password.clone();
        let email = registration.email.trim().to_string();
        let is_admin = registration.is_admin;
        let cost = self.hash_cost;

        let row = self
            .with_conn(move |conn| {
                let password_hash = bcrypt::hash(&password, cost)?;
                let new = NewAccountRow {
                    username: &username,
                    password_hash: &password_hash,
                    email: &email,
                    is_admin,
                    created_at: Utc::now().timestamp(),
                };
                operations::insert_account(conn, &new).map_err(|e| match e {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AccountError::AlreadyExists(username.clone())
                    }
                    other => AccountError::Database(other),
                })
            })
            .await?;

        info!("Created account {}", row);
        Ok(Account::from(row))
    }
}
