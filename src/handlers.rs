use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{
    CreditQuery, CreditRequest, CreditSummary, CreditView, CustomerRequest,
    CustomerUpdateRequest, CustomerView,
};
use crate::services::{CreditService, CustomerService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-credit-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/customers
///
/// Registers a new customer. Duplicate CPFs are rejected with 409 by the
/// store's unique constraint; structural validation failures return 400.
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerView>), ApiError> {
    tracing::info!("POST /api/customers - cpf: {}", request.cpf);

    request.validate()?;

    let service = CustomerService::new(state.db.clone());
    let customer = service.register(request).await?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// GET /api/customers/:id
///
/// Retrieves a customer by its store-assigned id.
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerView>, ApiError> {
    tracing::info!("GET /api/customers/{}", id);

    let service = CustomerService::new(state.db.clone());
    let customer = service.find_by_id(id).await?;

    Ok(Json(customer.into()))
}

/// PATCH /api/customers/:id
///
/// Updates the mutable fields of a customer: first/last name, address and
/// income. CPF, email and password are immutable after registration.
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<CustomerUpdateRequest>,
) -> Result<Json<CustomerView>, ApiError> {
    tracing::info!("PATCH /api/customers/{}", id);

    patch.validate()?;

    let service = CustomerService::new(state.db.clone());
    let customer = service.update(id, patch).await?;

    Ok(Json(customer.into()))
}

/// DELETE /api/customers/:id
///
/// Deletes a customer and every credit it owns.
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    tracing::info!("DELETE /api/customers/{}", id);

    let service = CustomerService::new(state.db.clone());
    service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/credits
///
/// Issues a credit for an existing customer. An installment date beyond the
/// scheduling horizon or an unknown customer id both return 400.
pub async fn create_credit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreditRequest>,
) -> Result<(StatusCode, Json<CreditView>), ApiError> {
    tracing::info!("POST /api/credits - customer: {}", request.customer_id);

    request.validate()?;

    let service = CreditService::new(state.db.clone(), &state.config);
    let (credit, customer) = service.issue(request).await?;

    Ok((StatusCode::CREATED, Json(CreditView::new(credit, &customer))))
}

/// GET /api/credits?customer_id=<id>
///
/// Lists the credits owned by a customer, in creation order. A customer with
/// no credits yields an empty list.
pub async fn list_credits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreditQuery>,
) -> Result<Json<Vec<CreditSummary>>, ApiError> {
    tracing::info!("GET /api/credits - customer: {}", query.customer_id);

    let service = CreditService::new(state.db.clone(), &state.config);
    let credits = service.find_all_by_customer(query.customer_id).await?;

    Ok(Json(credits.into_iter().map(CreditSummary::from).collect()))
}

/// GET /api/credits/:credit_code?customer_id=<id>
///
/// Fetches a credit by its generated code, scoped to the supplied customer.
pub async fn get_credit(
    State(state): State<Arc<AppState>>,
    Path(credit_code): Path<Uuid>,
    Query(query): Query<CreditQuery>,
) -> Result<Json<CreditView>, ApiError> {
    tracing::info!(
        "GET /api/credits/{} - customer: {}",
        credit_code,
        query.customer_id
    );

    let service = CreditService::new(state.db.clone(), &state.config);
    let (credit, customer) = service.find_by_code(query.customer_id, credit_code).await?;

    Ok(Json(CreditView::new(credit, &customer)))
}
