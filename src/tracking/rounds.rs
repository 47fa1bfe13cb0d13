use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;

use crate::error::Result;
use crate::init::AppState;
use crate::models::{InterviewRound, NewInterviewRound};
use crate::tracking::ensure_exists;
use crate::types::Validate;

const DEFAULT_TIMEZONE: &str = "UTC";

const COLUMNS: &str = "round_id, interview_id, round_number, round_name, round_type, \
    scheduled_date, scheduled_time, duration_minutes, timezone, is_virtual, meeting_platform, \
    meeting_link, physical_location, interviewer_name, interviewer_title, \
    interviewer_linkedin_url, interviewer_email, interviewer_notes, round_status, round_result, \
    feedback, rating, preparation_notes, questions_asked_summary, key_topics_covered, \
    follow_up_actions, created_at, updated_at";

fn list_sql() -> String {
    format!(
        "SELECT {} FROM interview_schema.interview_rounds WHERE interview_id = $1 \
         ORDER BY round_number, round_id",
        COLUMNS
    )
}

/// Rounds in `round_number` order; 404 when the interview does not exist.
pub async fn list(db: &PgPool, interview_id: i32) -> Result<Vec<InterviewRound>> {
    ensure_exists(db, "interviews", "interview_id", interview_id, "Interview").await?;

    Ok(sqlx::query_as::<_, InterviewRound>(&list_sql())
        .bind(interview_id)
        .fetch_all(db)
        .await?)
}

pub async fn create(db: &PgPool, interview_id: i32, new: &NewInterviewRound) -> Result<InterviewRound> {
    ensure_exists(db, "interviews", "interview_id", interview_id, "Interview").await?;

    let sql = format!(
        "INSERT INTO interview_schema.interview_rounds (interview_id, round_number, round_name, \
         round_type, scheduled_date, scheduled_time, duration_minutes, timezone, is_virtual, \
         meeting_platform, meeting_link, physical_location, interviewer_name, interviewer_title, \
         interviewer_linkedin_url, interviewer_email, interviewer_notes, round_status, \
         round_result, feedback, rating, preparation_notes, questions_asked_summary, \
         key_topics_covered, follow_up_actions) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
         $18, $19, $20, $21, $22, $23, $24, $25) RETURNING {}",
        COLUMNS
    );

    Ok(sqlx::query_as::<_, InterviewRound>(&sql)
        .bind(interview_id)
        .bind(new.round_number)
        .bind(&new.round_name)
        .bind(new.round_type)
        .bind(new.scheduled_date)
        .bind(new.scheduled_time)
        .bind(new.duration_minutes)
        .bind(new.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE))
        .bind(new.is_virtual)
        .bind(&new.meeting_platform)
        .bind(&new.meeting_link)
        .bind(&new.physical_location)
        .bind(&new.interviewer_name)
        .bind(&new.interviewer_title)
        .bind(&new.interviewer_linkedin_url)
        .bind(&new.interviewer_email)
        .bind(&new.interviewer_notes)
        .bind(new.round_status)
        .bind(new.round_result)
        .bind(&new.feedback)
        .bind(new.rating)
        .bind(&new.preparation_notes)
        .bind(&new.questions_asked_summary)
        .bind(&new.key_topics_covered)
        .bind(&new.follow_up_actions)
        .fetch_one(db)
        .await?)
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
) -> Result<Json<Vec<InterviewRound>>> {
    Ok(Json(list(&state.db, interview_id).await?))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<i32>,
    payload: std::result::Result<Json<NewInterviewRound>, JsonRejection>,
) -> Result<(StatusCode, Json<InterviewRound>)> {
    let Json(new) = payload?;
    new.validate()?;

    let round = create(&state.db, interview_id, &new).await?;
    log::info!(
        "🔁 Added round {} ({}) to interview {}",
        round.round_number,
        round.round_type,
        interview_id
    );
    Ok((StatusCode::CREATED, Json(round)))
}
