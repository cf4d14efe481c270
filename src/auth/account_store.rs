//! Account Storage
//! Mission: Store back-office accounts with bcrypt-hashed passwords

use crate::auth::models::{Account, NewAccount, Role};
use crate::store::{page_bounds, Database, Page};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use rusqlite::{params, params_from_iter, types::Value as SqlValue, ErrorCode, OptionalExtension, Row};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

const ACCOUNT_COLUMNS: &str = "id, username, email, password, role, first_name, last_name, \
     company, is_active, last_login, created_at";

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@croxy-exim.com";

/// Development fallback when ADMIN_PASSWORD is unset
pub const DEV_ADMIN_PASSWORD: &str = "admin123";

/// Minimum accepted password length for new accounts
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("username or email already exists")]
    Duplicate,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Account listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    pub role: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Account store backed by the shared SQLite database
#[derive(Clone)]
pub struct AccountStore {
    db: Database,
    hash_cost: u32,
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let role: String = row.get(4)?;
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::from_str(&role).unwrap_or(Role::Customer),
        first_name: row.get(5)?,
        last_name: row.get(6)?,
        company: row.get(7)?,
        is_active: row.get::<_, i64>(8)? != 0,
        last_login: row.get(9)?,
        created_at: row.get(10)?,
    })
}

impl AccountStore {
    /// Create the store and make sure an admin account exists
    pub fn new(db: Database, admin_password: &str) -> Result<Self> {
        Self::with_hash_cost(db, admin_password, DEFAULT_COST)
    }

    /// Same as [`AccountStore::new`] with an explicit bcrypt cost
    pub fn with_hash_cost(db: Database, admin_password: &str, hash_cost: u32) -> Result<Self> {
        let store = Self { db, hash_cost };
        store.create_default_admin(admin_password)?;
        Ok(store)
    }

    /// Create default admin account for initial setup
    fn create_default_admin(&self, password: &str) -> Result<()> {
        let count: i64 = self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM users WHERE role = 'admin'", [], |row| {
                row.get(0)
            })
            .context("Failed to check for admin users")?;

        if count > 0 {
            return Ok(());
        }

        let password_hash = hash(password, self.hash_cost).context("Failed to hash password")?;
        self.db
            .conn()
            .execute(
                "INSERT INTO users (username, email, password, role, first_name)
                 VALUES (?1, ?2, ?3, 'admin', 'Admin')",
                params![DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_EMAIL, password_hash],
            )
            .context("Failed to insert admin user")?;

        info!("🔐 Default admin account created (username: {})", DEFAULT_ADMIN_USERNAME);
        if password == DEV_ADMIN_PASSWORD {
            warn!("⚠️  Default admin uses the development password, set ADMIN_PASSWORD in production!");
        }

        Ok(())
    }

    /// Active account whose username or email matches
    pub fn find_by_login_name(&self, login_name: &str) -> Result<Option<Account>> {
        self.db
            .conn()
            .query_row(
                &format!(
                    "SELECT {} FROM users
                     WHERE (username = ?1 OR email = ?1) AND is_active = 1
                     ORDER BY id LIMIT 1",
                    ACCOUNT_COLUMNS
                ),
                params![login_name.trim()],
                account_from_row,
            )
            .optional()
            .context("Failed to look up account")
    }

    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.db
            .conn()
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", ACCOUNT_COLUMNS),
                params![id],
                account_from_row,
            )
            .optional()
            .context("Failed to load account")
    }

    /// Check credentials; returns the account when they match
    pub fn verify_password(&self, login_name: &str, password: &str) -> Result<Option<Account>> {
        let Some(account) = self.find_by_login_name(login_name)? else {
            return Ok(None);
        };

        let valid = verify(password, &account.password_hash).context("Failed to verify password")?;
        Ok(valid.then_some(account))
    }

    /// Create an account; the caller has validated the password length
    pub fn create_account(&self, new: &NewAccount) -> Result<Account, AccountError> {
        let username = new.username.trim();
        let email = new
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        // Login matches either column, so both names share one namespace
        let taken = self
            .db
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE username IN (?1, ?2) OR email IN (?1, ?2) LIMIT 1",
                params![username, email],
                |_| Ok(()),
            )
            .optional()
            .context("Failed to check for existing account")?
            .is_some();
        if taken {
            return Err(AccountError::Duplicate);
        }

        let password_hash =
            hash(&new.password, self.hash_cost).context("Failed to hash password")?;

        let id = {
            let conn = self.db.conn();
            let result = conn.execute(
                "INSERT INTO users (username, email, password, role, first_name, last_name, company)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    username,
                    email,
                    password_hash,
                    new.role.as_str(),
                    new.first_name,
                    new.last_name,
                    new.company,
                ],
            );
            match result {
                Ok(_) => conn.last_insert_rowid(),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    return Err(AccountError::Duplicate)
                }
                Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert account").into()),
            }
        };

        info!("✅ Created account: {} ({})", username, new.role.as_str());

        self.get_account(id)?
            .ok_or_else(|| AccountError::Storage(anyhow::anyhow!("account {} vanished after insert", id)))
    }

    /// Accounts newest first, with the unpaginated total
    pub fn list_accounts(&self, filter: &AccountFilter) -> Result<Page<Account>> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(role) = filter.role.as_deref().and_then(Role::from_str) {
            where_sql.push_str(" AND role = ?");
            args.push(SqlValue::Text(role.as_str().to_string()));
        }
        if let Some(active) = filter.active {
            where_sql.push_str(" AND is_active = ?");
            args.push(SqlValue::Integer(active as i64));
        }

        let (limit, offset) = page_bounds(filter.limit, filter.offset);
        let conn = self.db.conn();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM users{}", where_sql),
                params_from_iter(args.iter()),
                |row| row.get(0),
            )
            .context("Failed to count accounts")?;

        let sql = format!(
            "SELECT {} FROM users{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            ACCOUNT_COLUMNS, where_sql
        );
        args.push(SqlValue::Integer(limit));
        args.push(SqlValue::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(args.iter()), account_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list accounts")?;

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    pub fn set_active(&self, id: i64, active: bool) -> Result<bool> {
        let changed = self.db.conn().execute(
            "UPDATE users SET is_active = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![active as i64, id],
        )?;
        if changed > 0 {
            info!("Account {} {}", id, if active { "activated" } else { "deactivated" });
        }
        Ok(changed > 0)
    }

    pub fn set_role(&self, id: i64, role: Role) -> Result<bool> {
        let changed = self.db.conn().execute(
            "UPDATE users SET role = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![role.as_str(), id],
        )?;
        if changed > 0 {
            info!("Account {} role set to {}", id, role.as_str());
        }
        Ok(changed > 0)
    }

    pub fn delete_account(&self, id: i64) -> Result<bool> {
        let changed = self
            .db
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if changed > 0 {
            info!("🗑️  Deleted account: {}", id);
        }
        Ok(changed > 0)
    }

    pub fn record_login(&self, id: i64) -> Result<()> {
        self.db.conn().execute(
            "UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}
