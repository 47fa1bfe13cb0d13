use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, ErrorCode, Result};
use crate::init::AppState;
use crate::models::{NewSkill, Page, Skill, SkillListQuery};
use crate::tracking::{ensure_exists, like_pattern, non_empty};
use crate::types::Validate;

const DEFAULT_LIMIT: i64 = 50;

const COLUMNS: &str = "skill_id, skill_name, skill_category, skill_type, skill_description, \
    proficiency_levels, related_skills, parent_skill_id, is_trending, market_demand, \
    average_salary_impact_percentage, learning_resources, official_documentation_url, is_active, \
    created_at, updated_at";

/// Only active skills are listed.
fn list_query(query: &SkillListQuery, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM interview_schema.skills WHERE is_active = TRUE",
        COLUMNS
    ));

    if let Some(search) = non_empty(&query.search) {
        let pattern = like_pattern(search);
        qb.push(" AND (skill_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR skill_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = non_empty(&query.category) {
        qb.push(" AND skill_category = ").push_bind(category.to_string());
    }
    if let Some(is_trending) = query.is_trending {
        qb.push(" AND is_trending = ").push_bind(is_trending);
    }

    qb.push(" ORDER BY skill_name OFFSET ")
        .push_bind(page.skip)
        .push(" LIMIT ")
        .push_bind(page.limit);
    qb
}

pub async fn list(db: &PgPool, query: &SkillListQuery) -> Result<Vec<Skill>> {
    let page = Page::resolve(query.skip, query.limit, DEFAULT_LIMIT)?;
    let mut qb = list_query(query, page);
    Ok(qb.build_query_as::<Skill>().fetch_all(db).await?)
}

pub async fn get(db: &PgPool, skill_id: i32) -> Result<Skill> {
    let sql = format!(
        "SELECT {} FROM interview_schema.skills WHERE skill_id = $1",
        COLUMNS
    );
    sqlx::query_as::<_, Skill>(&sql)
        .bind(skill_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Skill"))
}

pub async fn create(db: &PgPool, new: &NewSkill) -> Result<Skill> {
    if let Some(parent_id) = new.parent_skill_id {
        let label = format!("Parent skill with ID {}", parent_id);
        ensure_exists(db, "skills", "skill_id", parent_id, &label).await?;
    }

    let sql = format!(
        "INSERT INTO interview_schema.skills (skill_name, skill_category, skill_type, \
         skill_description, proficiency_levels, related_skills, parent_skill_id, is_trending, \
         market_demand, average_salary_impact_percentage, learning_resources, \
         official_documentation_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
        COLUMNS
    );

    sqlx::query_as::<_, Skill>(&sql)
        .bind(new.skill_name.trim())
        .bind(&new.skill_category)
        .bind(&new.skill_type)
        .bind(&new.skill_description)
        .bind(&new.proficiency_levels)
        .bind(&new.related_skills)
        .bind(new.parent_skill_id)
        .bind(new.is_trending)
        .bind(&new.market_demand)
        .bind(new.average_salary_impact_percentage)
        .bind(&new.learning_resources)
        .bind(&new.official_documentation_url)
        .fetch_one(db)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.code == ErrorCode::Conflict => {
                AppError::conflict("Skill with this name already exists")
            }
            err => err,
        })
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<SkillListQuery>, QueryRejection>,
) -> Result<Json<Vec<Skill>>> {
    let Query(query) = query?;
    Ok(Json(list(&state.db, &query).await?))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewSkill>, JsonRejection>,
) -> Result<(StatusCode, Json<Skill>)> {
    let Json(new) = payload?;
    new.validate()?;

    let skill = create(&state.db, &new).await?;
    log::info!("🧩 Created skill {} ({})", skill.skill_name, skill.skill_id);
    Ok((StatusCode::CREATED, Json(skill)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(skill_id): Path<i32>,
) -> Result<Json<Skill>> {
    Ok(Json(get(&state.db, skill_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_hides_inactive() {
        let qb = list_query(&SkillListQuery::default(), Page { skip: 0, limit: 50 });
        let sql = qb.sql();
        assert!(sql.contains("WHERE is_active = TRUE ORDER BY skill_name"));
        assert!(sql.ends_with("OFFSET $1 LIMIT $2"));
    }

    #[test]
    fn test_list_filters() {
        let query = SkillListQuery {
            search: Some("async".to_string()),
            category: Some("Programming".to_string()),
            is_trending: Some(true),
            ..Default::default()
        };
        let qb = list_query(&query, Page { skip: 0, limit: 10 });
        let sql = qb.sql();

        assert!(sql.contains("(skill_name ILIKE $1 OR skill_description ILIKE $2)"));
        assert!(sql.contains("skill_category = $3 AND is_trending = $4"));
        assert!(sql.ends_with("OFFSET $5 LIMIT $6"));
    }

    #[test]
    fn test_blank_category_ignored() {
        let query = SkillListQuery {
            category: Some("  ".to_string()),
            ..Default::default()
        };
        let qb = list_query(&query, Page { skip: 0, limit: 10 });
        assert!(!qb.sql().contains("skill_category ="));
    }
}
