use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============ Database Models ============

/// Represents a registered customer.
///
/// The CPF is the natural key and is unique across all customers; the numeric
/// id is assigned by the database on insert and immutable thereafter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identifier.
    pub id: i64,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// CPF document number (11 digits, unique).
    pub cpf: String,
    /// Email address.
    pub email: String,
    /// Opaque secret, stored as given. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password: String,
    /// Declared monthly income.
    pub income: BigDecimal,
    /// Address postal code (CEP).
    pub zip_code: String,
    /// Address street.
    pub street: String,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Represents a credit issued against a customer.
///
/// The `credit_code` is the external-facing reference; the numeric id stays
/// internal. Credits are immutable after issuance.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Credit {
    /// Store-assigned identifier.
    pub id: i64,
    /// Generated opaque reference, unique.
    pub credit_code: Uuid,
    /// Amount of the credit.
    pub credit_value: BigDecimal,
    /// Date the first installment falls due.
    pub day_first_installment: NaiveDate,
    /// Number of installments (1..=48).
    pub number_of_installments: i32,
    /// Current status of the credit.
    pub status: CreditStatus,
    /// Owning customer.
    pub customer_id: i64,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

/// Lifecycle status of a credit.
///
/// Issued credits start as `InProgress`; no transition workflow is
/// implemented here, the field is stored and reported only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "credit_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    InProgress,
    Approved,
    Rejected,
}

impl Default for CreditStatus {
    fn default() -> Self {
        CreditStatus::InProgress
    }
}

// ============ API Request Models ============

/// Request payload for registering a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// CPF document number.
    pub cpf: String,
    /// Email address.
    pub email: String,
    /// Password (stored as given).
    pub password: String,
    /// Declared monthly income.
    pub income: BigDecimal,
    /// Address postal code.
    pub zip_code: String,
    /// Address street.
    pub street: String,
}

/// Request payload for updating a customer's mutable fields.
///
/// CPF, email and password are immutable after registration and are
/// deliberately absent here.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerUpdateRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Address postal code.
    pub zip_code: String,
    /// Address street.
    pub street: String,
    /// Declared monthly income.
    pub income: BigDecimal,
}

/// Request payload for issuing a credit.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditRequest {
    /// Amount of the credit.
    pub credit_value: BigDecimal,
    /// Date the first installment falls due.
    pub day_first_installment: NaiveDate,
    /// Number of installments.
    pub number_of_installments: i32,
    /// Owning customer id.
    pub customer_id: i64,
}

// ============ API Response Models ============

/// Customer representation returned by the API. Never carries the password.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
    pub email: String,
    pub income: BigDecimal,
    pub zip_code: String,
    pub street: String,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            cpf: customer.cpf,
            email: customer.email,
            income: customer.income,
            zip_code: customer.zip_code,
            street: customer.street,
        }
    }
}

/// Condensed credit representation used in customer-scoped listings.
#[derive(Debug, Clone, Serialize)]
pub struct CreditSummary {
    pub credit_code: Uuid,
    pub credit_value: BigDecimal,
    pub number_of_installments: i32,
}

impl From<Credit> for CreditSummary {
    fn from(credit: Credit) -> Self {
        Self {
            credit_code: credit.credit_code,
            credit_value: credit.credit_value,
            number_of_installments: credit.number_of_installments,
        }
    }
}

/// Full credit representation, carrying the owner's email and income.
#[derive(Debug, Clone, Serialize)]
pub struct CreditView {
    pub credit_code: Uuid,
    pub credit_value: BigDecimal,
    pub number_of_installments: i32,
    pub status: CreditStatus,
    pub day_first_installment: NaiveDate,
    pub email_customer: String,
    pub income_customer: BigDecimal,
}

impl CreditView {
    pub fn new(credit: Credit, customer: &Customer) -> Self {
        Self {
            credit_code: credit.credit_code,
            credit_value: credit.credit_value,
            number_of_installments: credit.number_of_installments,
            status: credit.status,
            day_first_installment: credit.day_first_installment,
            email_customer: customer.email.clone(),
            income_customer: customer.income.clone(),
        }
    }
}

// ============ Query Parameters ============

/// Query parameters for customer-scoped credit endpoints.
#[derive(Debug, Deserialize)]
pub struct CreditQuery {
    /// Owning customer id.
    pub customer_id: i64,
}
