//! Interview tracking CRUD over the `interview_schema` tables.

pub mod companies;
pub mod interviews;
pub mod questions;
pub mod roles;
pub mod rounds;
pub mod skills;
pub mod stats;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sqlx::{Encode, Executor, Postgres, QueryBuilder, Type};

use crate::error::{AppError, Result};
use crate::init::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/companies",
            get(companies::list_handler).post(companies::create_handler),
        )
        .route("/api/companies/{company_id}", get(companies::get_handler))
        .route("/api/roles", get(roles::list_handler).post(roles::create_handler))
        .route("/api/roles/{role_id}", get(roles::get_handler))
        .route(
            "/api/interviews",
            get(interviews::list_handler).post(interviews::create_handler),
        )
        .route(
            "/api/interviews/{interview_id}",
            get(interviews::get_handler)
                .put(interviews::update_handler)
                .delete(interviews::delete_handler),
        )
        .route(
            "/api/questions",
            get(questions::list_handler).post(questions::create_handler),
        )
        .route(
            "/api/questions/{question_id}",
            get(questions::get_handler)
                .put(questions::update_handler)
                .delete(questions::delete_handler),
        )
        .route(
            "/api/questions/category/{category}",
            get(questions::by_category_handler),
        )
        .route(
            "/api/interviews/{interview_id}/rounds",
            get(rounds::list_handler).post(rounds::create_handler),
        )
        .route(
            "/api/interviews/{interview_id}/questions",
            get(interviews::list_questions_handler).post(interviews::link_question_handler),
        )
        .route("/api/skills", get(skills::list_handler).post(skills::create_handler))
        .route("/api/skills/{skill_id}", get(skills::get_handler))
        .route("/api/stats/overview", get(stats::overview_handler))
}

/// `%term%` for ILIKE, with the pattern metacharacters escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Blank search strings are treated as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 404 with `label` unless `interview_schema.{table}` has a row where `column = id`.
pub(crate) async fn ensure_exists<'c, E>(
    executor: E,
    table: &str,
    column: &str,
    id: i32,
    label: &str,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM interview_schema.{} WHERE {} = $1)",
        table, column
    );
    let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(executor).await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::not_found(label))
    }
}

/// Appends `, column = $n` when `value` is present.
pub(crate) fn push_set<T>(qb: &mut QueryBuilder<'static, Postgres>, column: &str, value: Option<T>)
where
    T: 'static + Send + Encode<'static, Postgres> + Type<Postgres>,
{
    if let Some(value) = value {
        qb.push(", ").push(column).push(" = ").push_bind(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::create_app_router;
    use crate::init::testing::test_state;
    use crate::llm::testing::ScriptedLlm;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&Some(" go ".to_string())), Some("go"));
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn test_push_set_skips_absent() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE t SET updated_at = NOW()");
        push_set(&mut qb, "a", Some(1i32));
        push_set::<String>(&mut qb, "b", None);
        assert_eq!(qb.sql(), "UPDATE t SET updated_at = NOW(), a = $1");
    }

    async fn request(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = create_app_router(test_state(Arc::new(ScriptedLlm::answering("ok"))));
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_pagination_rejected_before_query() {
        for uri in [
            "/api/companies?limit=500",
            "/api/roles?skip=-1",
            "/api/interviews?limit=0",
            "/api/questions?limit=101",
        ] {
            let (status, body) = request(get_req(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn test_unknown_sort_rejected() {
        let (status, _) = request(get_req("/api/interviews?sort_by=salary")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = request(get_req("/api/questions?order=sideways")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_validation_rejected_before_insert() {
        let (status, body) = request(post_req("/api/companies", r#"{"company_name": ""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("company_name"));

        let (status, body) = request(post_req(
            "/api/questions",
            r#"{"question_text": "Why?", "question_category": "behavioral"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("question_text"));
    }

    #[tokio::test]
    async fn test_round_validation_rejected_before_lookup() {
        let (status, body) = request(post_req(
            "/api/interviews/1/rounds",
            r#"{"round_number": 0, "round_type": "coding", "rating": 11}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("round_number"));
        assert!(detail.contains("rating"));

        let (status, _) = request(post_req(
            "/api/interviews/1/rounds",
            r#"{"round_number": 1, "round_type": "lunch"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_linked_question_validation_rejected() {
        let (status, body) = request(post_req(
            "/api/interviews/1/questions",
            r#"{"question_id": 3, "answer_quality_rating": 11}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("answer_quality_rating"));

        let (status, _) = request(post_req("/api/interviews/1/questions", r#"{}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_skill_validation_and_listing_bounds() {
        let (status, body) = request(post_req("/api/skills", r#"{"skill_name": " "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("skill_name"));

        let (status, _) = request(get_req("/api/skills?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_rejected() {
        for uri in ["/api/skills/abc", "/api/interviews/abc/rounds", "/api/interviews/x/questions"] {
            let (status, _) = request(get_req(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_enum_in_body_rejected() {
        let (status, _) = request(post_req(
            "/api/interviews",
            r#"{"seniority_level": "wizard"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
