//! Listing filters: query-string parsing and the SQL of the listing page query.
use actix_web::web::Query;
use sea_orm::{DbBackend, QueryTrait, Statement, Value};

use freehub_backend::db::projects::{listing_condition, page_query};
use freehub_backend::models::projects::{BudgetType, ProjectFilters, SortBy};

fn statement_for(filters: &ProjectFilters) -> Statement {
    page_query(listing_condition(filters), filters.sort_by, 0, 10).build(DbBackend::Postgres)
}

fn sql_for(filters: &ProjectFilters) -> (String, String) {
    let stmt = statement_for(filters);
    (stmt.sql, format!("{:?}", stmt.values))
}

fn position(sql: &str, needle: &str) -> usize {
    sql.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not in {sql}"))
}

#[test]
fn test_query_string_accepts_aliases_and_comma_lists() {
    let Query(filters) = Query::<ProjectFilters>::from_query(
        "skills=rust,%20go,,&budgetMin=20&budgetMax=30&sortBy=budget&budget_type=HOURLY&page=2",
    )
    .unwrap();

    assert_eq!(filters.skills_required, vec!["rust", "go"]);
    assert_eq!(filters.min_budget, Some(20.0));
    assert_eq!(filters.max_budget, Some(30.0));
    assert_eq!(filters.sort_by, Some(SortBy::Budget));
    assert_eq!(filters.budget_type, Some(BudgetType::Hourly));
    assert_eq!(filters.page, Some(2));
    assert!(filters.technologies.is_empty());
}

#[test]
fn test_blank_filters_are_dropped() {
    let filters = ProjectFilters {
        category: Some("  ".to_string()),
        search: Some("".to_string()),
        ..Default::default()
    }
    .normalized();

    assert_eq!(filters, ProjectFilters::default());
}

#[test]
fn test_listing_is_always_restricted_to_open_projects() {
    let (sql, values) = sql_for(&ProjectFilters::default());
    assert!(sql.contains("\"status\""), "{sql}");
    assert!(values.contains("OPEN"), "{values}");
}

#[test]
fn test_default_order_is_featured_urgent_newest() {
    let (sql, _) = sql_for(&ProjectFilters::default());

    let featured = position(&sql, "\"is_featured\" DESC");
    let urgent = position(&sql, "\"is_urgent\" DESC");
    let created = position(&sql, "\"created_at\" DESC");
    let id = position(&sql, "\"id\" DESC");

    assert!(featured < urgent && urgent < created && created < id, "{sql}");
}

#[test]
fn test_budget_sort_puts_unpriced_projects_last() {
    let filters = ProjectFilters {
        sort_by: Some(SortBy::Budget),
        ..Default::default()
    };
    let (sql, _) = sql_for(&filters);

    assert!(sql.contains("NULLS LAST"), "{sql}");
    assert!(!sql.contains("\"is_featured\" DESC"), "{sql}");
}

#[test]
fn test_search_is_case_insensitive_substring() {
    let filters = ProjectFilters {
        search: Some("LoGo".to_string()),
        ..Default::default()
    };
    let (sql, values) = sql_for(&filters);

    assert!(sql.contains("LOWER("), "{sql}");
    assert!(sql.contains("LIKE"), "{sql}");
    assert!(values.contains("%logo%"), "{values}");
}

#[test]
fn test_search_escapes_wildcards() {
    let filters = ProjectFilters {
        search: Some("100%".to_string()),
        ..Default::default()
    };
    let (_, values) = sql_for(&filters);

    assert!(values.contains(r"%100\\%%"), "{values}");
}

#[test]
fn test_skills_match_any_through_array_overlap() {
    let filters = ProjectFilters {
        skills_required: vec!["rust".to_string(), "go".to_string()],
        ..Default::default()
    };
    let (sql, values) = sql_for(&filters);

    assert!(sql.contains("\"skills_required\" &&"), "{sql}");
    assert!(values.contains("rust") && values.contains("go"), "{values}");
}

#[test]
fn test_budget_range_overlap_groups_each_bound() {
    let filters = ProjectFilters {
        min_budget: Some(25.0),
        max_budget: Some(100.0),
        ..Default::default()
    };
    let stmt = statement_for(&filters);

    // $1 is the OPEN status.
    let expected = concat!(
        r#"("projects"."min_budget" >= $2 OR "projects"."max_budget" >= $3)"#,
        " AND ",
        r#"("projects"."max_budget" <= $4 OR "projects"."min_budget" <= $5)"#,
    );
    assert!(stmt.sql.contains(expected), "{}", stmt.sql);

    let values = stmt.values.map(|v| v.0).unwrap_or_default();
    assert_eq!(
        values[1..5],
        [
            Value::from(25.0f64),
            Value::from(25.0f64),
            Value::from(100.0f64),
            Value::from(100.0f64),
        ]
    );
}

#[test]
fn test_budget_lower_bound_alone_adds_one_group() {
    let filters = ProjectFilters {
        min_budget: Some(40.0),
        ..Default::default()
    };
    let stmt = statement_for(&filters);

    assert!(
        stmt.sql
            .contains(r#"("projects"."min_budget" >= $2 OR "projects"."max_budget" >= $3)"#),
        "{}",
        stmt.sql
    );
    assert!(!stmt.sql.contains("<="), "{}", stmt.sql);

    let values = stmt.values.map(|v| v.0).unwrap_or_default();
    assert_eq!(values[1..3], [Value::from(40.0f64), Value::from(40.0f64)]);
}
