//! Address books and the default-address invariant.
//!
//! Shipping and billing books keep at most one `is_default` row per user.
//! Every statement that reads or changes the default flag runs in a
//! transaction that first locks the owner's `users` row (`FOR UPDATE`), so
//! default-flag changes for one user execute strictly one after another
//! while other users' books are never blocked. The partial unique indexes
//! from the migrations back this up at the storage level.
//!
//! A `Transaction` that is dropped without `commit()` rolls back and releases
//! the lock, so every early return below leaves the books untouched.

use sqlx::{PgPool, Postgres, Transaction};

use crate::database::{Address, AddressBook, AddressFields, StoreError};

pub struct AddressRepository {
    db: PgPool,
}

/// Outcome of adding an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedAddress {
    pub id: i64,
    /// `None` for the general book
    pub is_default: Option<bool>,
}

impl AddressRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Opens a transaction holding the row lock of `user_id`.
    ///
    /// Fails with `NotFound` when the user does not exist.
    async fn begin_for_user(
        &self,
        user_id: i64,
    ) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.db.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound);
        }

        Ok(tx)
    }

    /// Adds an address; the first one in a defaultable book becomes default.
    ///
    /// Fails with `NotFound` for an unknown user.
    pub async fn add(
        &self,
        user_id: i64,
        book: AddressBook,
        fields: &AddressFields,
    ) -> Result<AddedAddress, StoreError> {
        let mut tx = self.begin_for_user(user_id).await?;
        let added = Self::insert_in(&mut tx, user_id, book, fields).await?;
        tx.commit().await?;

        tracing::debug!(
            "Added {} {} for user {} (default: {:?})",
            book.table(),
            added.id,
            user_id,
            added.is_default
        );
        Ok(added)
    }

    async fn insert_in(
        tx: &mut Transaction<'static, Postgres>,
        user_id: i64,
        book: AddressBook,
        fields: &AddressFields,
    ) -> Result<AddedAddress, StoreError> {
        if !book.has_default() {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO addresses (user_id, address_line1, city, country, postal_code, type, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, NOW())
                RETURNING id
                "#,
            )
            .bind(user_id)
            .bind(&fields.address_line1)
            .bind(&fields.city)
            .bind(&fields.country)
            .bind(&fields.postal_code)
            .bind(fields.address_type.as_str())
            .fetch_one(&mut **tx)
            .await?;

            return Ok(AddedAddress {
                id,
                is_default: None,
            });
        }

        let default_exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND is_default = TRUE)",
            book.table()
        ))
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        let is_default = !default_exists;
        let id: i64 = sqlx::query_scalar(&format!(
            r#"
            INSERT INTO {} (user_id, address_line1, city, country, postal_code, type, is_default, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id
            "#,
            book.table()
        ))
        .bind(user_id)
        .bind(&fields.address_line1)
        .bind(&fields.city)
        .bind(&fields.country)
        .bind(&fields.postal_code)
        .bind(fields.address_type.as_str())
        .bind(is_default)
        .fetch_one(&mut **tx)
        .await?;

        Ok(AddedAddress {
            id,
            is_default: Some(is_default),
        })
    }

    /// Makes `address_id` the only default address of the user's book.
    ///
    /// Fails with `NotFound` when the address does not exist, belongs to
    /// someone else, or the book has no default.
    pub async fn set_default(
        &self,
        user_id: i64,
        book: AddressBook,
        address_id: i64,
    ) -> Result<(), StoreError> {
        if !book.has_default() {
            return Err(StoreError::NotFound);
        }
        let table = book.table();
        let mut tx = self.begin_for_user(user_id).await?;

        let owned: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND user_id = $2)",
            table
        ))
        .bind(address_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Err(StoreError::NotFound);
        }

        sqlx::query(&format!(
            "UPDATE {} SET is_default = FALSE WHERE user_id = $1 AND is_default = TRUE",
            table
        ))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(&format!(
            "UPDATE {} SET is_default = TRUE WHERE id = $1 AND user_id = $2",
            table
        ))
        .bind(address_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        tracing::info!("User {} set {} {} as default", user_id, table, address_id);
        Ok(())
    }

    pub async fn list(&self, user_id: i64, book: AddressBook) -> Result<Vec<Address>, StoreError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            r#"
            SELECT id, user_id, address_line1, city, country, postal_code, type, {} AS is_default, created_at
            FROM {}
            WHERE user_id = $1
            ORDER BY id
            "#,
            default_column(book),
            book.table()
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(addresses)
    }

    pub async fn find(
        &self,
        user_id: i64,
        book: AddressBook,
        address_id: i64,
    ) -> Result<Option<Address>, StoreError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            r#"
            SELECT id, user_id, address_line1, city, country, postal_code, type, {} AS is_default, created_at
            FROM {}
            WHERE id = $1 AND user_id = $2
            "#,
            default_column(book),
            book.table()
        ))
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(address)
    }

    /// Updates address columns; the default flag is left alone.
    ///
    /// `owner` restricts the update to that user's rows; `None` is the admin
    /// path without ownership check.
    pub async fn update(
        &self,
        owner: Option<i64>,
        book: AddressBook,
        address_id: i64,
        fields: &AddressFields,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET address_line1 = $1, city = $2, country = $3, postal_code = $4, type = $5
            WHERE id = $6 AND ($7::BIGINT IS NULL OR user_id = $7)
            "#,
            book.table()
        ))
        .bind(&fields.address_line1)
        .bind(&fields.city)
        .bind(&fields.country)
        .bind(&fields.postal_code)
        .bind(fields.address_type.as_str())
        .bind(address_id)
        .bind(owner)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(
        &self,
        user_id: i64,
        book: AddressBook,
        address_id: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            book.table()
        ))
        .bind(address_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn default_column(book: AddressBook) -> &'static str {
    if book.has_default() {
        "is_default"
    } else {
        "NULL::BOOLEAN"
    }
}
