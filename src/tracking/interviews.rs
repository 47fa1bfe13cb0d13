use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, Result};
use crate::init::AppState;
use crate::models::{
    Interview, InterviewListQuery, InterviewQuestion, InterviewStatus, InterviewUpdate,
    ListResponse, NewInterview, NewInterviewQuestion, Page,
};
use crate::tracking::{ensure_exists, push_set};
use crate::types::Validate;

const DEFAULT_LIMIT: i64 = 20;

const SELECT: &str = "SELECT i.interview_id, i.company_id, c.company_name, i.role_id, r.role_name, \
    i.custom_role_title, i.interview_type, i.seniority_level, i.interview_status, \
    i.interview_result, i.job_description, i.main_skills_required, i.job_location, i.is_remote, \
    i.salary_range, i.application_date, i.first_interview_date, i.overall_feedback, \
    i.preparation_notes, i.created_at, i.updated_at \
    FROM interview_schema.interviews i \
    LEFT JOIN interview_schema.companies c ON c.company_id = i.company_id \
    LEFT JOIN interview_schema.roles r ON r.role_id = i.role_id";

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &InterviewListQuery) {
    qb.push(" WHERE TRUE");
    if let Some(company_id) = query.company_id {
        qb.push(" AND i.company_id = ").push_bind(company_id);
    }
    if let Some(role_id) = query.role_id {
        qb.push(" AND i.role_id = ").push_bind(role_id);
    }
    if let Some(interview_type) = query.interview_type {
        qb.push(" AND i.interview_type = ").push_bind(interview_type);
    }
    if let Some(status) = query.interview_status {
        qb.push(" AND i.interview_status = ").push_bind(status);
    }
    if let Some(result) = query.interview_result {
        qb.push(" AND i.interview_result = ").push_bind(result);
    }
    if let Some(seniority) = query.seniority_level {
        qb.push(" AND i.seniority_level = ").push_bind(seniority);
    }
    if let Some(is_remote) = query.is_remote {
        qb.push(" AND i.is_remote = ").push_bind(is_remote);
    }
}

fn list_query(query: &InterviewListQuery, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT);
    push_filters(&mut qb, query);
    qb.push(format!(
        " ORDER BY {} {} NULLS LAST, i.interview_id OFFSET ",
        query.sort_by.column(),
        query.order.sql()
    ))
    .push_bind(page.skip)
    .push(" LIMIT ")
    .push_bind(page.limit);
    qb
}

fn count_query(query: &InterviewListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM interview_schema.interviews i");
    push_filters(&mut qb, query);
    qb
}

pub async fn list(db: &PgPool, query: &InterviewListQuery) -> Result<ListResponse<Interview>> {
    let page = Page::resolve(query.skip, query.limit, DEFAULT_LIMIT)?;

    let total: i64 = count_query(query).build_query_scalar::<i64>().fetch_one(db).await?;
    let data = list_query(query, page)
        .build_query_as::<Interview>()
        .fetch_all(db)
        .await?;

    Ok(ListResponse::new(total, page, data))
}

pub async fn get(db: &PgPool, interview_id: i32) -> Result<Interview> {
    let sql = format!("{} WHERE i.interview_id = $1", SELECT);
    sqlx::query_as::<_, Interview>(&sql)
        .bind(interview_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Interview"))
}

async fn ensure_references(db: &PgPool, company_id: Option<i32>, role_id: Option<i32>) -> Result<()> {
    if let Some(id) = company_id {
        let label = format!("Company with ID {}", id);
        ensure_exists(db, "companies", "company_id", id, &label).await?;
    }
    if let Some(id) = role_id {
        let label = format!("Role with ID {}", id);
        ensure_exists(db, "roles", "role_id", id, &label).await?;
    }
    Ok(())
}

pub async fn create(db: &PgPool, new: &NewInterview) -> Result<Interview> {
    ensure_references(db, new.company_id, new.role_id).await?;

    let interview_id: i32 = sqlx::query_scalar(
        "INSERT INTO interview_schema.interviews (company_id, role_id, custom_role_title, \
         interview_type, seniority_level, interview_status, interview_result, job_description, \
         main_skills_required, job_location, is_remote, salary_range, application_date, \
         first_interview_date, overall_feedback, preparation_notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING interview_id",
    )
    .bind(new.company_id)
    .bind(new.role_id)
    .bind(&new.custom_role_title)
    .bind(new.interview_type)
    .bind(new.seniority_level)
    .bind(new.interview_status)
    .bind(new.interview_result)
    .bind(&new.job_description)
    .bind(&new.main_skills_required)
    .bind(&new.job_location)
    .bind(new.is_remote)
    .bind(&new.salary_range)
    .bind(new.application_date)
    .bind(new.first_interview_date)
    .bind(&new.overall_feedback)
    .bind(&new.preparation_notes)
    .fetch_one(db)
    .await?;

    get(db, interview_id).await
}

fn update_query(interview_id: i32, update: &InterviewUpdate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE interview_schema.interviews SET updated_at = NOW()");
    push_set(&mut qb, "company_id", update.company_id);
    push_set(&mut qb, "role_id", update.role_id);
    push_set(&mut qb, "custom_role_title", update.custom_role_title.clone());
    push_set(&mut qb, "interview_type", update.interview_type);
    push_set(&mut qb, "seniority_level", update.seniority_level);
    push_set(&mut qb, "interview_status", update.interview_status);
    push_set(&mut qb, "interview_result", update.interview_result);
    push_set(&mut qb, "job_description", update.job_description.clone());
    push_set(&mut qb, "main_skills_required", update.main_skills_required.clone());
    push_set(&mut qb, "job_location", update.job_location.clone());
    push_set(&mut qb, "is_remote", update.is_remote);
    push_set(&mut qb, "salary_range", update.salary_range.clone());
    push_set(&mut qb, "application_date", update.application_date);
    push_set(&mut qb, "first_interview_date", update.first_interview_date);
    push_set(&mut qb, "overall_feedback", update.overall_feedback.clone());
    push_set(&mut qb, "preparation_notes", update.preparation_notes.clone());
    qb.push(" WHERE interview_id = ")
        .push_bind(interview_id)
        .push(" RETURNING interview_id");
    qb
}

pub async fn update(db: &PgPool, interview_id: i32, update: &InterviewUpdate) -> Result<Interview> {
    ensure_references(db, update.company_id, update.role_id).await?;

    let updated: Option<i32> = update_query(interview_id, update)
        .build_query_scalar::<i32>()
        .fetch_optional(db)
        .await?;

    match updated {
        Some(id) => get(db, id).await,
        None => Err(AppError::not_found("Interview")),
    }
}

/// Soft delete: the row stays, marked cancelled.
pub async fn cancel(db: &PgPool, interview_id: i32) -> Result<()> {
    let result = sqlx::query(
        "UPDATE interview_schema.interviews SET interview_status = $1, updated_at = NOW() \
         WHERE interview_id = $2",
    )
    .bind(InterviewStatus::Cancelled)
    .bind(interview_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Interview"));
    }
    Ok(())
}

// ============================================================================
// Questions asked in an interview
// ============================================================================

const LINK_COLUMNS: &str = "interview_question_id, interview_id, round_id, question_id, \
    was_asked, order_asked, candidate_answer, answer_quality_rating, time_taken_minutes, \
    interviewer_feedback, what_went_well, what_could_improve, was_prepared, preparation_notes, \
    confidence_level, follow_up_questions_asked, follow_up_answers, created_at, updated_at";

fn linked_questions_sql() -> String {
    format!(
        "SELECT {} FROM interview_schema.interview_questions WHERE interview_id = $1 \
         ORDER BY order_asked NULLS LAST, interview_question_id",
        LINK_COLUMNS
    )
}

pub async fn list_questions(db: &PgPool, interview_id: i32) -> Result<Vec<InterviewQuestion>> {
    ensure_exists(db, "interviews", "interview_id", interview_id, "Interview").await?;

    Ok(sqlx::query_as::<_, InterviewQuestion>(&linked_questions_sql())
        .bind(interview_id)
        .fetch_all(db)
        .await?)
}

/// Records a bank question as asked in the interview and bumps its `times_asked`.
///
/// A `round_id` must name a round of this same interview.
pub async fn link_question(
    db: &PgPool,
    interview_id: i32,
    new: &NewInterviewQuestion,
) -> Result<InterviewQuestion> {
    let mut tx = db.begin().await?;

    ensure_exists(&mut *tx, "interviews", "interview_id", interview_id, "Interview").await?;
    ensure_exists(&mut *tx, "questions", "question_id", new.question_id, "Question").await?;
    if let Some(round_id) = new.round_id {
        let in_interview: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM interview_schema.interview_rounds \
             WHERE round_id = $1 AND interview_id = $2)",
        )
        .bind(round_id)
        .bind(interview_id)
        .fetch_one(&mut *tx)
        .await?;
        if !in_interview {
            return Err(AppError::not_found("Round"));
        }
    }

    let sql = format!(
        "INSERT INTO interview_schema.interview_questions (interview_id, round_id, question_id, \
         was_asked, order_asked, candidate_answer, answer_quality_rating, time_taken_minutes, \
         interviewer_feedback, what_went_well, what_could_improve, was_prepared, \
         preparation_notes, confidence_level, follow_up_questions_asked, follow_up_answers) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {}",
        LINK_COLUMNS
    );
    let link = sqlx::query_as::<_, InterviewQuestion>(&sql)
        .bind(interview_id)
        .bind(new.round_id)
        .bind(new.question_id)
        .bind(new.was_asked)
        .bind(new.order_asked)
        .bind(&new.candidate_answer)
        .bind(new.answer_quality_rating)
        .bind(new.time_taken_minutes)
        .bind(&new.interviewer_feedback)
        .bind(&new.what_went_well)
        .bind(&new.what_could_improve)
        .bind(new.was_prepared)
        .bind(&new.preparation_notes)
        .bind(new.confidence_level)
        .bind(&new.follow_up_questions_asked)
        .bind(&new.follow_up_answers)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE interview_schema.questions SET times_asked = times_asked + 1, updated_at = NOW() \
         WHERE question_id = $1",
    )
    .bind(new.question_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(link)
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<InterviewListQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Interview>>> {
    let Query(query) = query?;
    Ok(Json(list(&state.db, &query).await?))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewInterview>, JsonRejection>,
) -> Result<(StatusCode, Json<Interview>)> {
    let Json(new) = payload?;
    new.validate()?;

    let interview = create(&state.db, &new).await?;
    log::info!("📅 Created interview {}", interview.interview_id);
    Ok((StatusCode::CREATED, Json(interview)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
) -> Result<Json<Interview>> {
    Ok(Json(get(&state.db, interview_id).await?))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
    payload: std::result::Result<Json<InterviewUpdate>, JsonRejection>,
) -> Result<Json<Interview>> {
    let Json(changes) = payload?;
    changes.validate()?;
    Ok(Json(update(&state.db, interview_id, &changes).await?))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
) -> Result<StatusCode> {
    cancel(&state.db, interview_id).await?;
    log::info!("🗑️  Cancelled interview {}", interview_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_questions_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
) -> Result<Json<Vec<InterviewQuestion>>> {
    Ok(Json(list_questions(&state.db, interview_id).await?))
}

pub async fn link_question_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
    payload: std::result::Result<Json<NewInterviewQuestion>, JsonRejection>,
) -> Result<(StatusCode, Json<InterviewQuestion>)> {
    let Json(new) = payload?;
    new.validate()?;

    let link = link_question(&state.db, interview_id, &new).await?;
    log::info!(
        "🔗 Linked question {} to interview {}",
        link.question_id,
        interview_id
    );
    Ok((StatusCode::CREATED, Json(link)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InterviewSort, SeniorityLevel, SortOrder};

    #[test]
    fn test_default_sort_is_newest_first() {
        let qb = list_query(&InterviewListQuery::default(), Page { skip: 0, limit: 20 });
        assert!(qb.sql().contains("ORDER BY i.created_at DESC NULLS LAST"));
    }

    #[test]
    fn test_sort_by_company_name_uses_join() {
        let query = InterviewListQuery {
            sort_by: InterviewSort::CompanyName,
            order: SortOrder::Asc,
            ..Default::default()
        };
        let qb = list_query(&query, Page { skip: 0, limit: 20 });
        assert!(qb.sql().contains("LEFT JOIN interview_schema.companies c"));
        assert!(qb.sql().contains("ORDER BY c.company_name ASC"));
    }

    #[test]
    fn test_filters_shared_by_count_and_list() {
        let query = InterviewListQuery {
            company_id: Some(3),
            seniority_level: Some(SeniorityLevel::Senior),
            is_remote: Some(true),
            ..Default::default()
        };
        let count = count_query(&query);
        let list = list_query(&query, Page { skip: 0, limit: 20 });

        let filters = "i.company_id = $1 AND i.seniority_level = $2 AND i.is_remote = $3";
        assert!(count.sql().ends_with(filters));
        assert!(list.sql().contains(filters));
        assert!(list.sql().ends_with("OFFSET $4 LIMIT $5"));
    }

    #[test]
    fn test_linked_questions_in_asked_order() {
        let sql = linked_questions_sql();
        assert!(sql.contains("FROM interview_schema.interview_questions WHERE interview_id = $1"));
        assert!(sql.ends_with("ORDER BY order_asked NULLS LAST, interview_question_id"));
    }

    #[test]
    fn test_update_only_sets_present_fields() {
        let changes = InterviewUpdate {
            interview_status: Some(InterviewStatus::Completed),
            overall_feedback: Some("Went well".to_string()),
            ..Default::default()
        };
        let qb = update_query(7, &changes);
        assert_eq!(
            qb.sql(),
            "UPDATE interview_schema.interviews SET updated_at = NOW(), interview_status = $1, \
             overall_feedback = $2 WHERE interview_id = $3 RETURNING interview_id"
        );
    }
}
