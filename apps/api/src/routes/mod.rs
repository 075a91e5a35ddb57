pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::feedback::handlers as feedback;
use crate::interview::handlers as interview;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Question bank
        .route("/interview-generate", post(interview::handle_generate))
        .route("/interviews", get(interview::handle_list_interviews))
        .route("/interviews/latest", get(interview::handle_latest_interviews))
        .route("/interviews/:id", get(interview::handle_get_interview))
        // Turn decisions
        .route("/next-question", post(session::handle_next_question))
        .route(
            "/interviews/:id/session",
            post(session::handle_start_session),
        )
        .route(
            "/interviews/:id/session/turns",
            post(session::handle_submit_answer),
        )
        .route(
            "/interviews/:id/session/end",
            post(session::handle_end_session),
        )
        // Scoring
        .route(
            "/interviews/:id/feedback",
            post(feedback::handle_score).get(feedback::handle_get_feedback),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::fake::ScriptedBackend;
    use crate::store::MemoryStore;

    fn app(backend: ScriptedBackend) -> Router {
        build_router(AppState::for_tests(
            Arc::new(MemoryStore::new()),
            Arc::new(backend),
            false,
        ))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(ScriptedBackend::new()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "rehearsal-api");
    }

    #[tokio::test]
    async fn test_next_question_rejects_empty_messages() {
        let app = app(ScriptedBackend::new());
        let (status, body) = send(&app, post_json("/next-question", json!({ "messages": [] }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing conversation messages");
    }

    #[tokio::test]
    async fn test_next_question_rejects_unparseable_body() {
        let app = app(ScriptedBackend::new());
        let request = Request::builder()
            .method("POST")
            .uri("/next-question")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_next_question_decisions() {
        let app = app(ScriptedBackend::new());
        let messages = json!([
            { "role": "assistant", "content": "Hello" },
            { "role": "user", "content": "Hi there" }
        ]);

        let (status, body) = send(
            &app,
            post_json(
                "/next-question",
                json!({
                    "messages": messages,
                    "baseQuestion": { "text": "Tell me about a project.", "ordinal": 0 },
                    "remainingCount": 3
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({
            "success": true,
            "type": "base",
            "question": "Tell me about a project.",
            "ordinal": 0
        }));

        let (_, body) = send(
            &app,
            post_json(
                "/next-question",
                json!({
                    "messages": messages,
                    "baseQuestion": { "text": "A fourth question", "ordinal": 3 },
                    "remainingCount": 0
                }),
            ),
        )
        .await;
        assert_eq!(body, json!({ "success": true, "type": "end" }));
    }

    #[tokio::test]
    async fn test_next_question_accepts_chat_client_shapes() {
        let app = app(ScriptedBackend::new());
        let (status, body) = send(
            &app,
            post_json(
                "/next-question",
                json!({
                    "messages": [
                        { "role": "system", "content": "You are a friendly interviewer." },
                        { "role": "assistant", "content": "Hello" },
                        { "role": "user", "content": "Hi there" }
                    ],
                    "baseQuestion": "Tell me about a project.",
                    "remainingCount": 3
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "base");
        assert_eq!(body["question"], "Tell me about a project.");
        assert_eq!(body["ordinal"], 0);
    }

    #[tokio::test]
    async fn test_generate_then_read() {
        let app = app(ScriptedBackend::new().with_text(r#"["Why Rust?", "What is ownership?"]"#));

        let (status, created) = send(
            &app,
            post_json(
                "/interview-generate",
                json!({
                    "role": "Backend Engineer",
                    "level": "senior",
                    "type": "technical",
                    "amount": 2,
                    "techstack": "Rust, Postgres",
                    "userid": "user-1"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get(&format!("/interviews/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interview"]["techstack"], json!(["Rust", "Postgres"]));
        assert_eq!(body["interview"]["questions"][1]["text"], "What is ownership?");

        let (_, own) = send(&app, get("/interviews?userId=user-1")).await;
        assert_eq!(own["interviews"].as_array().unwrap().len(), 1);

        let (_, latest) = send(&app, get("/interviews/latest?userId=user-1")).await;
        assert!(latest["interviews"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_validation_and_backend_failure() {
        let app = app(ScriptedBackend::new().with_text("no questions today"));

        let (status, body) = send(
            &app,
            post_json(
                "/interview-generate",
                json!({ "role": "Backend", "amount": 0, "techstack": ["Rust"], "userId": "u" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let (status, body) = send(
            &app,
            post_json(
                "/interview-generate",
                json!({ "role": "Backend", "amount": 3, "techstack": ["Rust"], "userId": "u" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_session_flow_to_feedback() {
        let scoring = json!({
            "totalScore": 77,
            "categoryScores": {
                "Communication Skills": 80,
                "Technical Knowledge": 75,
                "Problem Solving": 70,
                "Cultural & Role Fit": 82,
                "Confidence & Clarity": 78
            },
            "strengths": ["Clear examples"],
            "areasForImprovement": ["More depth on trade-offs"],
            "finalAssessment": "A confident, well-structured interview."
        });
        let app = app(
            ScriptedBackend::new()
                .with_text(r#"["Why Rust?"]"#)
                .with_text(scoring.to_string()),
        );

        let (_, created) = send(
            &app,
            post_json(
                "/interview-generate",
                json!({ "role": "Backend", "amount": 1, "techstack": ["Rust"], "userId": "owner" }),
            ),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, started) = send(
            &app,
            post_json(&format!("/interviews/{id}/session"), json!({ "userId": "cand" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["decision"]["type"], "base");
        assert_eq!(started["remainingBudget"], 0);

        let (_, answered) = send(
            &app,
            post_json(
                &format!("/interviews/{id}/session/turns"),
                json!({ "userId": "cand", "text": "Memory safety without a GC.", "expectedTurns": 2 }),
            ),
        )
        .await;
        assert_eq!(answered["decision"]["type"], "end");
        assert_eq!(answered["status"], "ended");

        let (status, _) = send(&app, get(&format!("/interviews/{id}/feedback?userId=cand"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, scored) = send(
            &app,
            post_json(&format!("/interviews/{id}/feedback"), json!({ "userId": "cand" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scored["feedback"]["totalScore"], 77);

        let (status, fetched) =
            send(&app, get(&format!("/interviews/{id}/feedback?userId=cand"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            fetched["feedback"]["categoryScores"]["Problem Solving"],
            70
        );
    }

    #[tokio::test]
    async fn test_unknown_interview_is_404() {
        let app = app(ScriptedBackend::new());
        let uri = format!("/interviews/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
