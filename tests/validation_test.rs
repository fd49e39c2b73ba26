//! Project payload rules and their mapping to HTTP errors.
use actix_web::ResponseError;
use actix_web::http::StatusCode;
use serde_json::{Value, json};

use freehub_backend::error::AppError;
use freehub_backend::models::projects::ProjectPayload;
use freehub_backend::services::projects::validate_payload;

const DESCRIPTION: &str =
    "We need a clean, modern logo for a small coffee roastery opening next spring.";

fn fixed_payload() -> Value {
    json!({
        "title": "Build a logo",
        "description": DESCRIPTION,
        "category": "Design",
        "budget_type": "FIXED",
        "budget": "$500",
        "skills_required": ["Illustrator"],
        "experience_level": "INTERMEDIATE",
        "project_type": "one-time",
    })
}

fn payload(value: Value) -> ProjectPayload {
    serde_json::from_value(value).expect("payload should deserialize")
}

fn with(mut base: Value, patch: Value) -> Value {
    for (key, value) in patch.as_object().unwrap() {
        base[key] = value.clone();
    }
    base
}

fn violated_fields(err: AppError) -> Vec<String> {
    match err {
        AppError::Validation(failure) => failure.fields().iter().map(|v| v.field.clone()).collect(),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_valid_fixed_payload_is_normalized() {
    let input = with(
        fixed_payload(),
        json!({ "title": "  Build a logo  ", "subcategory": "   ", "tags": ["brand", " "] }),
    );

    let valid = validate_payload(payload(input)).unwrap();
    assert_eq!(valid.title, "Build a logo");
    assert_eq!(valid.subcategory, None);
    assert_eq!(valid.tags, vec!["brand"]);
}

#[test]
fn test_lowercase_enum_values_are_accepted() {
    let input = with(
        fixed_payload(),
        json!({ "budget_type": "fixed", "experience_level": "beginner" }),
    );
    assert!(validate_payload(payload(input)).is_ok());
}

#[test]
fn test_hourly_rates_must_be_ordered() {
    let input = with(
        fixed_payload(),
        json!({ "budget_type": "HOURLY", "budget": null, "min_budget": 10.0, "max_budget": 5.0 }),
    );

    let err = validate_payload(payload(input)).unwrap_err();
    assert!(
        err.to_string()
            .contains("Maximum rate must be greater than or equal to minimum rate")
    );
    assert_eq!(violated_fields(err), vec!["max_budget"]);
}

#[test]
fn test_hourly_rates_are_checked_alongside_other_fields() {
    let input = with(
        fixed_payload(),
        json!({ "title": "Logo", "budget_type": "HOURLY", "min_budget": 50.0, "max_budget": 20.0 }),
    );

    match validate_payload(payload(input)).unwrap_err() {
        AppError::Validation(failure) => {
            assert!(failure.has_field("title"));
            assert!(failure.has_field("max_budget"));
            assert!(!failure.has_field("min_budget"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_hourly_requires_both_rates() {
    let input = with(fixed_payload(), json!({ "budget_type": "HOURLY", "budget": null }));

    let fields = violated_fields(validate_payload(payload(input)).unwrap_err());
    assert_eq!(fields, vec!["min_budget", "max_budget"]);
}

#[test]
fn test_fixed_requires_budget() {
    let input = with(fixed_payload(), json!({ "budget": "   " }));
    assert_eq!(
        violated_fields(validate_payload(payload(input)).unwrap_err()),
        vec!["budget"]
    );
}

#[test]
fn test_rates_must_be_positive_when_given() {
    let input = with(fixed_payload(), json!({ "min_budget": -5.0 }));
    assert_eq!(
        violated_fields(validate_payload(payload(input)).unwrap_err()),
        vec!["min_budget"]
    );
}

#[test]
fn test_all_violations_are_reported_in_form_order() {
    let input = with(
        fixed_payload(),
        json!({ "title": "Logo", "description": "Too short", "skills_required": [" "] }),
    );

    let fields = violated_fields(validate_payload(payload(input)).unwrap_err());
    assert_eq!(fields, vec!["title", "description", "skills_required"]);
}

#[test]
fn test_error_status_codes() {
    let invalid = validate_payload(payload(with(fixed_payload(), json!({ "budget": null }))))
        .unwrap_err();
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(
        AppError::Unauthorized("no token".into()).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Forbidden("not yours".into()).status_code(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AppError::InvalidState("closed".into()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::NotFound("gone".into()).status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::Database(sea_orm::DbErr::Custom("boom".into())).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
