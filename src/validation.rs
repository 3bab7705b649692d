use regex::Regex;

use crate::errors::ApiError;
use crate::models::{CreditRequest, CustomerRequest, CustomerUpdateRequest};
use bigdecimal::{BigDecimal, Zero};

/// Upper bound on the number of installments a credit may carry.
pub const MAX_INSTALLMENTS: i32 = 48;

/// Validate email address shape.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    email_regex.is_match(email)
}

/// Validate a CPF document number.
///
/// Accepts the bare 11-digit form or the formatted `XXX.XXX.XXX-XX` form.
/// Applies the official check-digit algorithm: each verification digit is the
/// weighted sum of the preceding digits modulo 11, mapped to 0 when the
/// remainder is below 2. CPFs made of a single repeated digit pass the
/// arithmetic but are reserved values, rejected explicitly.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 || cpf.chars().any(|c| !c.is_ascii_digit() && !".-".contains(c)) {
        return false;
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, &d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rem = (sum * 10) % 11;
        if rem == 10 {
            0
        } else {
            rem
        }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

fn require_not_blank(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{} must not be blank", field));
    }
}

impl CustomerRequest {
    /// Structural validation performed before the domain service is invoked.
    /// Collects every violated constraint rather than failing on the first.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        require_not_blank(&mut errors, "first_name", &self.first_name);
        require_not_blank(&mut errors, "last_name", &self.last_name);
        require_not_blank(&mut errors, "cpf", &self.cpf);
        require_not_blank(&mut errors, "email", &self.email);
        require_not_blank(&mut errors, "password", &self.password);
        require_not_blank(&mut errors, "zip_code", &self.zip_code);
        require_not_blank(&mut errors, "street", &self.street);

        if !self.cpf.trim().is_empty() && !is_valid_cpf(&self.cpf) {
            errors.push("cpf is not a valid CPF".to_string());
        }
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            errors.push("email is not a valid email address".to_string());
        }
        if self.income < BigDecimal::zero() {
            errors.push("income must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

impl CustomerUpdateRequest {
    /// Structural validation for the update patch. Only the mutable fields
    /// exist on this payload, so only those are checked.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        require_not_blank(&mut errors, "first_name", &self.first_name);
        require_not_blank(&mut errors, "last_name", &self.last_name);
        require_not_blank(&mut errors, "zip_code", &self.zip_code);
        require_not_blank(&mut errors, "street", &self.street);

        if self.income < BigDecimal::zero() {
            errors.push("income must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

impl CreditRequest {
    /// Structural validation for credit issuance. The installment-date
    /// horizon is a domain rule, not a structural one, and lives in the
    /// credit service.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.credit_value <= BigDecimal::zero() {
            errors.push("credit_value must be greater than zero".to_string());
        }
        if self.number_of_installments < 1 || self.number_of_installments > MAX_INSTALLMENTS {
            errors.push(format!(
                "number_of_installments must be between 1 and {}",
                MAX_INSTALLMENTS
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}
