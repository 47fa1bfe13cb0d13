use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, ErrorCode, Result};
use crate::init::AppState;
use crate::models::{Company, CompanyListQuery, NewCompany, Page};
use crate::tracking::{like_pattern, non_empty};
use crate::types::Validate;

const DEFAULT_LIMIT: i64 = 50;

const COLUMNS: &str = "company_id, company_name, industry, company_size, headquarters, website, \
                       company_description, created_at, updated_at";

fn list_query(query: &CompanyListQuery, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM interview_schema.companies WHERE TRUE",
        COLUMNS
    ));

    if let Some(search) = non_empty(&query.search) {
        let pattern = like_pattern(search);
        qb.push(" AND (company_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR industry ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY company_name OFFSET ")
        .push_bind(page.skip)
        .push(" LIMIT ")
        .push_bind(page.limit);
    qb
}

pub async fn list(db: &PgPool, query: &CompanyListQuery) -> Result<Vec<Company>> {
    let page = Page::resolve(query.skip, query.limit, DEFAULT_LIMIT)?;
    let mut qb = list_query(query, page);
    Ok(qb.build_query_as::<Company>().fetch_all(db).await?)
}

pub async fn get(db: &PgPool, company_id: i32) -> Result<Company> {
    let sql = format!(
        "SELECT {} FROM interview_schema.companies WHERE company_id = $1",
        COLUMNS
    );
    sqlx::query_as::<_, Company>(&sql)
        .bind(company_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Company"))
}

pub async fn create(db: &PgPool, new: &NewCompany) -> Result<Company> {
    let sql = format!(
        "INSERT INTO interview_schema.companies \
         (company_name, industry, company_size, headquarters, website, company_description) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        COLUMNS
    );

    sqlx::query_as::<_, Company>(&sql)
        .bind(new.company_name.trim())
        .bind(&new.industry)
        .bind(&new.company_size)
        .bind(&new.headquarters)
        .bind(&new.website)
        .bind(&new.company_description)
        .fetch_one(db)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.code == ErrorCode::Conflict => {
                AppError::conflict("Company with this name already exists")
            }
            err => err,
        })
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<CompanyListQuery>, QueryRejection>,
) -> Result<Json<Vec<Company>>> {
    let Query(query) = query?;
    Ok(Json(list(&state.db, &query).await?))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewCompany>, JsonRejection>,
) -> Result<(StatusCode, Json<Company>)> {
    let Json(new) = payload?;
    new.validate()?;

    let company = create(&state.db, &new).await?;
    log::info!("🏢 Created company {} ({})", company.company_name, company.company_id);
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<i32>,
) -> Result<Json<Company>> {
    Ok(Json(get(&state.db, company_id).await?))
}
