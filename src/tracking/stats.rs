use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use strum::IntoEnumIterator;

use crate::error::Result;
use crate::init::AppState;
use crate::models::{InterviewResult, InterviewStatus, QuestionCategory, QuestionDifficulty};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total_interviews: i64,
    pub total_questions: i64,
    pub total_companies: i64,
    pub interviews_by_status: BTreeMap<String, i64>,
    pub interviews_by_result: BTreeMap<String, i64>,
    pub questions_by_category: BTreeMap<String, i64>,
    pub questions_by_difficulty: BTreeMap<String, i64>,
}

/// Every variant starts at zero so the overview always lists the full set.
fn tally<E>(rows: Vec<(String, i64)>) -> BTreeMap<String, i64>
where
    E: IntoEnumIterator + ToString,
{
    let mut counts: BTreeMap<String, i64> = E::iter().map(|v| (v.to_string(), 0)).collect();
    for (key, count) in rows {
        *counts.entry(key).or_insert(0) += count;
    }
    counts
}

async fn grouped(db: &PgPool, column: &str, table: &str, filter: &str) -> Result<Vec<(String, i64)>> {
    let sql = format!(
        "SELECT {col}::text, COUNT(*) FROM interview_schema.{table} {filter} GROUP BY {col}",
        col = column,
        table = table,
        filter = filter
    );
    Ok(sqlx::query_as::<_, (String, i64)>(&sql).fetch_all(db).await?)
}

pub async fn overview(db: &PgPool) -> Result<OverviewStats> {
    let total_interviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interview_schema.interviews")
        .fetch_one(db)
        .await?;
    let total_questions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM interview_schema.questions WHERE is_active = TRUE",
    )
    .fetch_one(db)
    .await?;
    let total_companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interview_schema.companies")
        .fetch_one(db)
        .await?;

    let active = "WHERE is_active = TRUE";
    Ok(OverviewStats {
        total_interviews,
        total_questions,
        total_companies,
        interviews_by_status: tally::<InterviewStatus>(
            grouped(db, "interview_status", "interviews", "").await?,
        ),
        interviews_by_result: tally::<InterviewResult>(
            grouped(db, "interview_result", "interviews", "").await?,
        ),
        questions_by_category: tally::<QuestionCategory>(
            grouped(db, "question_category", "questions", active).await?,
        ),
        questions_by_difficulty: tally::<QuestionDifficulty>(
            grouped(db, "question_difficulty", "questions", active).await?,
        ),
    })
}

pub async fn overview_handler(State(state): State<Arc<AppState>>) -> Result<Json<OverviewStats>> {
    Ok(Json(overview(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_fills_missing_variants() {
        let counts = tally::<QuestionDifficulty>(vec![("hard".to_string(), 3)]);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts["hard"], 3);
        assert_eq!(counts["easy"], 0);
    }

    #[test]
    fn test_tally_status_keys_match_wire_names() {
        let counts = tally::<InterviewStatus>(vec![("in_progress".to_string(), 2)]);
        assert_eq!(counts["in_progress"], 2);
        assert!(counts.contains_key("rescheduled"));
    }
}
