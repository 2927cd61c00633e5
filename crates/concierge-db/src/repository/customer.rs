//! # Customer Repository
//!
//! Database operations for customers, including the CSV import batch path.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use concierge_core::import::CustomerDraft;
use concierge_core::Customer;

const CUSTOMER_COLUMNS: &str = "\
    id, name, email, phone, \
    address_line1, address_line2, city, state, postal_code, country, \
    notes, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, email = %customer.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone,
                address_line1, address_line2, city, state, postal_code, country,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address_line1)
        .bind(&customer.address_line2)
        .bind(&customer.city)
        .bind(&customer.state)
        .bind(&customer.postal_code)
        .bind(&customer.country)
        .bind(&customer.notes)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by email (emails are unique).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a batch of imported rows in one transaction.
    ///
    /// Rows whose email already exists are skipped, not overwritten: a
    /// re-imported spreadsheet must not clobber operator edits. Returns the
    /// customers actually inserted.
    pub async fn insert_import_batch(
        &self,
        drafts: &[CustomerDraft],
    ) -> DbResult<Vec<Customer>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::new();

        for draft in drafts {
            let existing: Option<String> =
                sqlx::query_scalar("SELECT id FROM customers WHERE email = ?1")
                    .bind(&draft.email)
                    .fetch_optional(&mut *tx)
                    .await?;

            if existing.is_some() {
                debug!(email = %draft.email, "Skipping duplicate customer on import");
                continue;
            }

            let now = Utc::now();
            let customer = Customer {
                id: Uuid::new_v4().to_string(),
                name: draft.name.clone(),
                email: draft.email.clone(),
                phone: draft.phone.clone(),
                address_line1: draft.address_line1.clone(),
                address_line2: draft.address_line2.clone(),
                city: draft.city.clone(),
                state: draft.state.clone(),
                postal_code: draft.postal_code.clone(),
                country: draft.country.clone(),
                notes: draft.notes.clone(),
                created_at: now,
                updated_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO customers (
                    id, name, email, phone,
                    address_line1, address_line2, city, state, postal_code, country,
                    notes, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(&customer.address_line1)
            .bind(&customer.address_line2)
            .bind(&customer.city)
            .bind(&customer.state)
            .bind(&customer.postal_code)
            .bind(&customer.country)
            .bind(&customer.notes)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .execute(&mut *tx)
            .await?;

            inserted.push(customer);
        }

        tx.commit().await?;

        debug!(count = inserted.len(), "Import batch inserted");
        Ok(inserted)
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Builds a new customer row from scratch.
pub fn new_customer(name: &str, email: &str) -> Customer {
    let now = Utc::now();
    Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        address_line1: None,
        address_line2: None,
        city: None,
        state: None,
        postal_code: None,
        country: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = new_customer("Alice Park", "alice@example.com");
        repo.insert(&customer).await.unwrap();

        let fetched = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");

        let by_email = repo.get_by_email("alice@example.com").await.unwrap();
        assert!(by_email.is_some());

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&new_customer("Alice", "same@example.com"))
            .await
            .unwrap();

        let err = repo
            .insert(&new_customer("Other Alice", "same@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_import_batch_skips_existing() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&new_customer("Alice", "alice@example.com"))
            .await
            .unwrap();

        let drafts = vec![
            CustomerDraft {
                name: "Alice Again".to_string(),
                email: "alice@example.com".to_string(),
                phone: None,
                address_line1: None,
                address_line2: None,
                city: None,
                state: None,
                postal_code: None,
                country: None,
                notes: None,
            },
            CustomerDraft {
                name: "Bob Ride".to_string(),
                email: "bob@example.com".to_string(),
                phone: Some("407-555-0100".to_string()),
                address_line1: None,
                address_line2: None,
                city: Some("Orlando".to_string()),
                state: None,
                postal_code: None,
                country: None,
                notes: None,
            },
        ];

        let inserted = repo.insert_import_batch(&drafts).await.unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].email, "bob@example.com");
        assert_eq!(repo.count().await.unwrap(), 2);

        // The existing row kept its original name
        let alice = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(alice.name, "Alice");
    }

    #[tokio::test]
    async fn test_list_is_name_ordered() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&new_customer("Zed", "zed@example.com"))
            .await
            .unwrap();
        repo.insert(&new_customer("Amy", "amy@example.com"))
            .await
            .unwrap();

        let list = repo.list(10).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Amy");
        assert_eq!(list[1].name, "Zed");
    }
}
