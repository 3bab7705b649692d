use chrono::{Months, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{Credit, CreditRequest, CreditStatus, Customer, CustomerRequest, CustomerUpdateRequest};

/// Returns true when the first-installment date falls within the allowed
/// scheduling horizon, counted in calendar months from `today`. The boundary
/// is inclusive: a date landing exactly on `today + horizon` is accepted.
pub fn first_installment_within_horizon(
    day_first_installment: NaiveDate,
    today: NaiveDate,
    horizon_months: u32,
) -> bool {
    match today.checked_add_months(Months::new(horizon_months)) {
        Some(limit) => day_first_installment <= limit,
        None => false,
    }
}

/// Owns the customer lifecycle: register, fetch, update mutable fields,
/// delete.
pub struct CustomerService {
    pool: PgPool,
}

impl CustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a new customer.
    ///
    /// CPF uniqueness is enforced by the store's unique constraint; a
    /// duplicate surfaces as `Conflict` through the sqlx error translation,
    /// with no check-then-act pre-check here.
    pub async fn register(&self, request: CustomerRequest) -> Result<Customer, ApiError> {
        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers
                (first_name, last_name, cpf, email, password, income, zip_code, street)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.cpf)
        .bind(&request.email)
        .bind(&request.password)
        .bind(&request.income)
        .bind(&request.zip_code)
        .bind(&request.street)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Registered customer {} (cpf {})", customer.id, customer.cpf);
        Ok(customer)
    }

    /// Looks a customer up by its store-assigned id.
    pub async fn find_by_id(&self, id: i64) -> Result<Customer, ApiError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Id {} not found", id)))
    }

    /// Applies the mutable fields of the patch and returns the updated
    /// customer. CPF, email and password are never touched by this path.
    pub async fn update(
        &self,
        id: i64,
        patch: CustomerUpdateRequest,
    ) -> Result<Customer, ApiError> {
        let customer = self.find_by_id(id).await?;

        let updated = sqlx::query_as::<_, Customer>(
            "UPDATE customers
             SET first_name = $1, last_name = $2, zip_code = $3, street = $4,
                 income = $5, updated_at = NOW()
             WHERE id = $6
             RETURNING *",
        )
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.zip_code)
        .bind(&patch.street)
        .bind(&patch.income)
        .bind(customer.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Deletes a customer and, explicitly, every credit it owns.
    ///
    /// The deletion runs in a single transaction; the credits foreign key
    /// carries no cascade, so this is the only path that removes them.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let customer = self.find_by_id(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM credits WHERE customer_id = $1")
            .bind(customer.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Deleted customer {} and its credits", customer.id);
        Ok(())
    }
}

/// Owns the credit lifecycle: issue against an existing customer, list by
/// customer, fetch by code scoped to a customer.
pub struct CreditService {
    pool: PgPool,
    customers: CustomerService,
    schedule_horizon_months: u32,
}

impl CreditService {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            customers: CustomerService::new(pool.clone()),
            pool,
            schedule_horizon_months: config.schedule_horizon_months,
        }
    }

    /// Issues a credit for an existing customer.
    ///
    /// The schedule rule runs first; an installment date beyond the horizon
    /// fails before the owner is even resolved. A missing customer propagates
    /// the customer service's NotFound unchanged.
    pub async fn issue(&self, request: CreditRequest) -> Result<(Credit, Customer), ApiError> {
        let today = Utc::now().date_naive();
        if !first_installment_within_horizon(
            request.day_first_installment,
            today,
            self.schedule_horizon_months,
        ) {
            return Err(ApiError::Business("Invalid Date".to_string()));
        }

        let customer = self.customers.find_by_id(request.customer_id).await?;

        let credit = sqlx::query_as::<_, Credit>(
            "INSERT INTO credits
                (credit_code, credit_value, day_first_installment,
                 number_of_installments, status, customer_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&request.credit_value)
        .bind(request.day_first_installment)
        .bind(request.number_of_installments)
        .bind(CreditStatus::InProgress)
        .bind(customer.id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Issued credit {} for customer {}",
            credit.credit_code,
            customer.id
        );
        Ok((credit, customer))
    }

    /// Lists every credit owned by the customer, in creation order. An
    /// unknown customer id yields an empty list, not an error.
    pub async fn find_all_by_customer(&self, customer_id: i64) -> Result<Vec<Credit>, ApiError> {
        let credits = sqlx::query_as::<_, Credit>(
            "SELECT * FROM credits WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Fetches a credit by its generated code, scoped to the given customer.
    ///
    /// A code owned by a different customer is reported as "Contact admin"
    /// rather than not-found, so the existence of another customer's credit
    /// is not leaked while the caller still gets a failure.
    pub async fn find_by_code(
        &self,
        customer_id: i64,
        credit_code: Uuid,
    ) -> Result<(Credit, Customer), ApiError> {
        let credit = sqlx::query_as::<_, Credit>("SELECT * FROM credits WHERE credit_code = $1")
            .bind(credit_code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                ApiError::Business(format!("Creditcode {} not found", credit_code))
            })?;

        if credit.customer_id != customer_id {
            return Err(ApiError::Business("Contact admin".to_string()));
        }

        let customer = self.customers.find_by_id(customer_id).await?;
        Ok((credit, customer))
    }
}
