use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, ErrorCode, Result};
use crate::init::AppState;
use crate::models::{NewRole, Page, Role, RoleListQuery};
use crate::tracking::{like_pattern, non_empty};
use crate::types::Validate;

const DEFAULT_LIMIT: i64 = 50;

const COLUMNS: &str =
    "role_id, role_name, role_category, role_description, typical_skills, created_at, updated_at";

fn list_query(query: &RoleListQuery, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM interview_schema.roles WHERE TRUE",
        COLUMNS
    ));

    if let Some(search) = non_empty(&query.search) {
        let pattern = like_pattern(search);
        qb.push(" AND (role_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR role_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = non_empty(&query.category) {
        qb.push(" AND role_category = ").push_bind(category.to_string());
    }

    qb.push(" ORDER BY role_name OFFSET ")
        .push_bind(page.skip)
        .push(" LIMIT ")
        .push_bind(page.limit);
    qb
}

pub async fn list(db: &PgPool, query: &RoleListQuery) -> Result<Vec<Role>> {
    let page = Page::resolve(query.skip, query.limit, DEFAULT_LIMIT)?;
    let mut qb = list_query(query, page);
    Ok(qb.build_query_as::<Role>().fetch_all(db).await?)
}

pub async fn get(db: &PgPool, role_id: i32) -> Result<Role> {
    let sql = format!("SELECT {} FROM interview_schema.roles WHERE role_id = $1", COLUMNS);
    sqlx::query_as::<_, Role>(&sql)
        .bind(role_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Role"))
}

pub async fn create(db: &PgPool, new: &NewRole) -> Result<Role> {
    let sql = format!(
        "INSERT INTO interview_schema.roles (role_name, role_category, role_description, typical_skills) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    );

    sqlx::query_as::<_, Role>(&sql)
        .bind(new.role_name.trim())
        .bind(&new.role_category)
        .bind(&new.role_description)
        .bind(&new.typical_skills)
        .fetch_one(db)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.code == ErrorCode::Conflict => {
                AppError::conflict("Role with this name already exists")
            }
            err => err,
        })
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<RoleListQuery>, QueryRejection>,
) -> Result<Json<Vec<Role>>> {
    let Query(query) = query?;
    Ok(Json(list(&state.db, &query).await?))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewRole>, JsonRejection>,
) -> Result<(StatusCode, Json<Role>)> {
    let Json(new) = payload?;
    new.validate()?;

    let role = create(&state.db, &new).await?;
    log::info!("🧑‍💼 Created role {} ({})", role.role_name, role.role_id);
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<i32>,
) -> Result<Json<Role>> {
    Ok(Json(get(&state.db, role_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filters() {
        let query = RoleListQuery {
            search: Some("backend".to_string()),
            category: Some("engineering".to_string()),
            ..Default::default()
        };
        let qb = list_query(&query, Page { skip: 0, limit: 50 });
        let sql = qb.sql();

        assert!(sql.contains("role_name ILIKE $1"));
        assert!(sql.contains("role_category = $3"));
        assert!(sql.ends_with("ORDER BY role_name OFFSET $4 LIMIT $5"));
    }

    #[test]
    fn test_blank_category_ignored() {
        let query = RoleListQuery {
            category: Some("  ".to_string()),
            ..Default::default()
        };
        let qb = list_query(&query, Page { skip: 0, limit: 50 });
        assert!(!qb.sql().contains("role_category ="));
    }
}
