/// Integration scenarios for the customer and credit services against a real
/// database. Marked ignored to avoid running against production by accident;
/// apply schema.sql and set TEST_DATABASE_URL to run:
///
///   cargo test -- --ignored
use std::env;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Duration, Months, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rust_credit_api::config::Config;
use rust_credit_api::db::Database;
use rust_credit_api::errors::ApiError;
use rust_credit_api::models::{CreditRequest, CustomerRequest, CustomerUpdateRequest, CreditStatus};
use rust_credit_api::services::{CreditService, CustomerService};

async fn test_pool() -> anyhow::Result<PgPool> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    Ok(db.pool)
}

fn test_config(pool_url: &str) -> Config {
    Config {
        database_url: pool_url.to_string(),
        port: 0,
        schedule_horizon_months: 3,
    }
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let len = digits.len() as u32;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (len + 1 - i as u32))
        .sum();
    let rem = (sum * 10) % 11;
    if rem == 10 {
        0
    } else {
        rem
    }
}

/// Generates a structurally valid CPF unique per invocation, so repeated
/// runs against a shared database never collide.
fn random_cpf() -> String {
    let seed = Uuid::new_v4().as_u128();
    let mut digits: Vec<u32> = (0..9).map(|i| ((seed >> (i * 4)) % 10) as u32).collect();
    // Avoid the reserved all-same-digit values.
    if digits.iter().all(|&d| d == digits[0]) {
        digits[0] = (digits[0] + 1) % 10;
    }
    let d10 = cpf_check_digit(&digits);
    digits.push(d10);
    let d11 = cpf_check_digit(&digits);
    digits.push(d11);
    digits.iter().map(|d| d.to_string()).collect()
}

fn build_customer_request(cpf: &str) -> CustomerRequest {
    CustomerRequest {
        first_name: "Layin".to_string(),
        last_name: "Costa".to_string(),
        cpf: cpf.to_string(),
        email: "me@layin.net".to_string(),
        password: "12345".to_string(),
        income: BigDecimal::from_str("1000.0").unwrap(),
        zip_code: "00101".to_string(),
        street: "Neko Street".to_string(),
    }
}

fn build_credit_request(customer_id: i64) -> CreditRequest {
    CreditRequest {
        credit_value: BigDecimal::from_str("5000.0").unwrap(),
        day_first_installment: Utc::now().date_naive() + Duration::days(30),
        number_of_installments: 24,
        customer_id,
    }
}

#[tokio::test]
#[ignore]
async fn register_find_delete_roundtrip() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let service = CustomerService::new(pool);

    let cpf = random_cpf();
    let created = service
        .register(build_customer_request(&cpf))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    assert!(created.id > 0);
    assert_eq!(created.first_name, "Layin");
    assert_eq!(created.last_name, "Costa");
    assert_eq!(created.cpf, cpf);
    assert_eq!(created.email, "me@layin.net");
    assert_eq!(created.zip_code, "00101");
    assert_eq!(created.street, "Neko Street");

    // Id is stable on a subsequent lookup.
    let found = service
        .find_by_id(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(found.id, created.id);
    assert_eq!(found.cpf, created.cpf);

    service
        .delete(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let err = service.find_by_id(created.id).await.unwrap_err();
    match err {
        ApiError::NotFound(msg) => {
            assert_eq!(msg, format!("Id {} not found", created.id));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
#[ignore]
async fn duplicate_cpf_is_a_conflict() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let service = CustomerService::new(pool);

    let cpf = random_cpf();
    let first = service
        .register(build_customer_request(&cpf))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Same CPF, everything else different.
    let mut second = build_customer_request(&cpf);
    second.first_name = "Aliny".to_string();
    second.email = "aliny@example.com".to_string();

    let err = service.register(second).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "got {:?}", err);

    service
        .delete(first.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn update_changes_only_mutable_fields() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let service = CustomerService::new(pool);

    let cpf = random_cpf();
    let created = service
        .register(build_customer_request(&cpf))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let patch = CustomerUpdateRequest {
        first_name: "Aliny".to_string(),
        last_name: "Costta".to_string(),
        zip_code: "857452".to_string(),
        street: "Inu Street".to_string(),
        income: BigDecimal::from_str("5000.0").unwrap(),
    };
    let updated = service
        .update(created.id, patch)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Supplied fields changed...
    assert_eq!(updated.first_name, "Aliny");
    assert_eq!(updated.last_name, "Costta");
    assert_eq!(updated.zip_code, "857452");
    assert_eq!(updated.street, "Inu Street");
    assert_eq!(updated.income, BigDecimal::from_str("5000.0").unwrap());
    // ...and the immutable ones did not.
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.cpf, created.cpf);
    assert_eq!(updated.email, created.email);
    assert_eq!(updated.password, created.password);

    service
        .delete(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn update_of_unknown_id_is_not_found() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let service = CustomerService::new(pool);

    let missing_id = 9_000_000_000 + (Uuid::new_v4().as_u128() % 1_000_000_000) as i64;
    let patch = CustomerUpdateRequest {
        first_name: "Aliny".to_string(),
        last_name: "Costta".to_string(),
        zip_code: "857452".to_string(),
        street: "Inu Street".to_string(),
        income: BigDecimal::from_str("5000.0").unwrap(),
    };

    let err = service.update(missing_id, patch).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "got {:?}", err);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn issue_credit_and_list_in_creation_order() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let config = test_config("postgres://unused");
    let customers = CustomerService::new(pool.clone());
    let credits = CreditService::new(pool, &config);

    let created = customers
        .register(build_customer_request(&random_cpf()))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (first, owner) = credits
        .issue(build_credit_request(created.id))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(first.status, CreditStatus::InProgress);
    assert_eq!(first.customer_id, created.id);
    assert_eq!(owner.id, created.id);

    let mut second_request = build_credit_request(created.id);
    second_request.credit_value = BigDecimal::from_str("12000.0").unwrap();
    second_request.number_of_installments = 48;
    let (second, _) = credits
        .issue(second_request)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    assert_ne!(first.credit_code, second.credit_code);

    let listed = credits
        .find_all_by_customer(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].credit_code, first.credit_code);
    assert_eq!(listed[1].credit_code, second.credit_code);

    customers
        .delete(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Cascade was explicit: the credits are gone with their owner.
    let listed = credits
        .find_all_by_customer(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(listed.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn issue_rejects_date_past_horizon() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let config = test_config("postgres://unused");
    let customers = CustomerService::new(pool.clone());
    let credits = CreditService::new(pool, &config);

    let created = customers
        .register(build_customer_request(&random_cpf()))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let mut request = build_credit_request(created.id);
    request.day_first_installment = Utc::now()
        .date_naive()
        .checked_add_months(Months::new(3))
        .unwrap()
        + Duration::days(1);

    let err = credits.issue(request).await.unwrap_err();
    match err {
        ApiError::Business(msg) => assert_eq!(msg, "Invalid Date"),
        other => panic!("expected Business, got {:?}", other),
    }

    // Nothing was persisted for the rejected request.
    let listed = credits
        .find_all_by_customer(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(listed.is_empty());

    customers
        .delete(created.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn issue_for_unknown_customer_is_not_found() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let config = test_config("postgres://unused");
    let credits = CreditService::new(pool, &config);

    let missing_id = 9_000_000_000 + (Uuid::new_v4().as_u128() % 1_000_000_000) as i64;
    let err = credits
        .issue(build_credit_request(missing_id))
        .await
        .unwrap_err();

    match err {
        ApiError::NotFound(msg) => {
            assert_eq!(msg, format!("Id {} not found", missing_id));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
#[ignore]
async fn find_by_code_is_scoped_to_the_owner() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let config = test_config("postgres://unused");
    let customers = CustomerService::new(pool.clone());
    let credits = CreditService::new(pool, &config);

    let owner_a = customers
        .register(build_customer_request(&random_cpf()))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let owner_b = customers
        .register(build_customer_request(&random_cpf()))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (credit_b, _) = credits
        .issue(build_credit_request(owner_b.id))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // The owner sees the credit.
    let (found, found_owner) = credits
        .find_by_code(owner_b.id, credit_b.credit_code)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(found.credit_code, credit_b.credit_code);
    assert_eq!(found_owner.id, owner_b.id);

    // Another customer probing the same code gets the scoping failure, not
    // a not-found.
    let err = credits
        .find_by_code(owner_a.id, credit_b.credit_code)
        .await
        .unwrap_err();
    match err {
        ApiError::Business(msg) => assert_eq!(msg, "Contact admin"),
        other => panic!("expected Business, got {:?}", other),
    }

    // A code that exists nowhere reports its absence.
    let unknown_code = Uuid::new_v4();
    let err = credits
        .find_by_code(owner_a.id, unknown_code)
        .await
        .unwrap_err();
    match err {
        ApiError::Business(msg) => {
            assert_eq!(msg, format!("Creditcode {} not found", unknown_code));
        }
        other => panic!("expected Business, got {:?}", other),
    }

    customers
        .delete(owner_a.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    customers
        .delete(owner_b.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}
