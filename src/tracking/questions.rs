use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, Result};
use crate::init::AppState;
use crate::models::{
    CategoryQuery, ListResponse, NewQuestion, Page, Question, QuestionCategory, QuestionListQuery,
    QuestionUpdate,
};
use crate::tracking::{like_pattern, non_empty, push_set};
use crate::types::Validate;

const DEFAULT_LIMIT: i64 = 20;

const COLUMNS: &str = "question_id, question_text, question_category, question_difficulty, \
    question_context, answer_summary, answer_markdown_content, key_concepts, tags, times_asked, \
    times_practiced, is_active, created_at, updated_at";

/// Inactive questions are hidden unless `is_active=false` is asked for explicitly.
fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &QuestionListQuery) {
    qb.push(" WHERE is_active = ")
        .push_bind(query.is_active.unwrap_or(true));

    if let Some(category) = query.category {
        qb.push(" AND question_category = ").push_bind(category);
    }
    if let Some(difficulty) = query.difficulty {
        qb.push(" AND question_difficulty = ").push_bind(difficulty);
    }
    if let Some(search) = non_empty(&query.search) {
        let pattern = like_pattern(search);
        qb.push(" AND (question_text ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR question_context ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    for tag in query.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        qb.push(" AND ")
            .push_bind(tag.to_string())
            .push(" = ANY(tags)");
    }
}

fn list_query(query: &QuestionListQuery, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM interview_schema.questions", COLUMNS));
    push_filters(&mut qb, query);
    qb.push(format!(
        " ORDER BY {} {}, question_id OFFSET ",
        query.sort_by.column(),
        query.order.sql()
    ))
    .push_bind(page.skip)
    .push(" LIMIT ")
    .push_bind(page.limit);
    qb
}

fn count_query(query: &QuestionListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM interview_schema.questions");
    push_filters(&mut qb, query);
    qb
}

pub async fn list(db: &PgPool, query: &QuestionListQuery) -> Result<ListResponse<Question>> {
    let page = Page::resolve(query.skip, query.limit, DEFAULT_LIMIT)?;

    let total: i64 = count_query(query).build_query_scalar::<i64>().fetch_one(db).await?;
    let data = list_query(query, page)
        .build_query_as::<Question>()
        .fetch_all(db)
        .await?;

    Ok(ListResponse::new(total, page, data))
}

pub async fn get(db: &PgPool, question_id: i32) -> Result<Question> {
    let sql = format!(
        "SELECT {} FROM interview_schema.questions WHERE question_id = $1",
        COLUMNS
    );
    sqlx::query_as::<_, Question>(&sql)
        .bind(question_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Question"))
}

pub async fn create(db: &PgPool, new: &NewQuestion) -> Result<Question> {
    let sql = format!(
        "INSERT INTO interview_schema.questions (question_text, question_category, \
         question_difficulty, question_context, answer_summary, answer_markdown_content, \
         key_concepts, tags) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
        COLUMNS
    );

    Ok(sqlx::query_as::<_, Question>(&sql)
        .bind(new.question_text.trim())
        .bind(new.question_category)
        .bind(new.question_difficulty)
        .bind(&new.question_context)
        .bind(&new.answer_summary)
        .bind(&new.answer_markdown_content)
        .bind(&new.key_concepts)
        .bind(&new.tags)
        .fetch_one(db)
        .await?)
}

fn update_query(question_id: i32, update: &QuestionUpdate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE interview_schema.questions SET updated_at = NOW()");
    push_set(
        &mut qb,
        "question_text",
        update.question_text.as_deref().map(|t| t.trim().to_string()),
    );
    push_set(&mut qb, "question_category", update.question_category);
    push_set(&mut qb, "question_difficulty", update.question_difficulty);
    push_set(&mut qb, "question_context", update.question_context.clone());
    push_set(&mut qb, "answer_summary", update.answer_summary.clone());
    push_set(&mut qb, "answer_markdown_content", update.answer_markdown_content.clone());
    push_set(&mut qb, "key_concepts", update.key_concepts.clone());
    push_set(&mut qb, "tags", update.tags.clone());
    push_set(&mut qb, "times_asked", update.times_asked);
    push_set(&mut qb, "times_practiced", update.times_practiced);
    push_set(&mut qb, "is_active", update.is_active);
    qb.push(" WHERE question_id = ")
        .push_bind(question_id)
        .push(format!(" RETURNING {}", COLUMNS));
    qb
}

pub async fn update(db: &PgPool, question_id: i32, update: &QuestionUpdate) -> Result<Question> {
    update_query(question_id, update)
        .build_query_as::<Question>()
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Question"))
}

/// Soft delete: the question is hidden from default listings.
pub async fn deactivate(db: &PgPool, question_id: i32) -> Result<()> {
    let result = sqlx::query(
        "UPDATE interview_schema.questions SET is_active = FALSE, updated_at = NOW() \
         WHERE question_id = $1",
    )
    .bind(question_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Question"));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Uses the `axum_extra` query extractor so `tags` may repeat.
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<
        axum_extra::extract::Query<QuestionListQuery>,
        axum_extra::extract::QueryRejection,
    >,
) -> Result<Json<ListResponse<Question>>> {
    let axum_extra::extract::Query(query) = query?;
    Ok(Json(list(&state.db, &query).await?))
}

pub async fn by_category_handler(
    State(state): State<Arc<AppState>>,
    category: std::result::Result<Path<QuestionCategory>, PathRejection>,
    query: std::result::Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Question>>> {
    let Path(category) = category?;
    let Query(query) = query?;

    let query = QuestionListQuery {
        skip: query.skip,
        limit: query.limit,
        category: Some(category),
        difficulty: query.difficulty,
        ..Default::default()
    };
    Ok(Json(list(&state.db, &query).await?))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewQuestion>, JsonRejection>,
) -> Result<(StatusCode, Json<Question>)> {
    let Json(new) = payload?;
    new.validate()?;

    let question = create(&state.db, &new).await?;
    log::info!(
        "❓ Created {} question {}",
        question.question_category,
        question.question_id
    );
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i32>,
) -> Result<Json<Question>> {
    Ok(Json(get(&state.db, question_id).await?))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i32>,
    payload: std::result::Result<Json<QuestionUpdate>, JsonRejection>,
) -> Result<Json<Question>> {
    let Json(changes) = payload?;
    changes.validate()?;
    Ok(Json(update(&state.db, question_id, &changes).await?))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i32>,
) -> Result<StatusCode> {
    deactivate(&state.db, question_id).await?;
    log::info!("🗑️  Deactivated question {}", question_id);
    Ok(StatusCode::NO_CONTENT)
}
