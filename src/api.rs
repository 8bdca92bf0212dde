//! The `/api/achievements` JSON endpoint.
//!
//! GET returns the current progress snapshot; POST replaces it wholesale.
//! Every failure here is the client's problem: bad JSON and wrong-shaped
//! payloads become `400` responses carrying the error text, and the stored
//! record stays exactly as it was.

use std::sync::Arc;

use http::StatusCode;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::progress::ProgressStore;
use crate::request::Request;
use crate::response::Response;

/// The one reserved path; everything else is static-file territory.
pub const ACHIEVEMENTS_PATH: &str = "/api/achievements";

/// `GET /api/achievements` — snapshot of the shared progress record.
pub async fn get_achievements(store: Arc<ProgressStore>, _req: Request) -> Response {
    let snapshot = store.snapshot();
    match serde_json::to_vec(&snapshot) {
        Ok(body) => Response::json(body),
        Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// `POST /api/achievements` — replace the progress record.
///
/// An empty body counts as `{}`; missing fields fall back to `0` clicks and
/// no unlocked keys, so the client may always send the full picture it has.
pub async fn post_achievements(store: Arc<ProgressStore>, req: Request) -> Response {
    let payload = if req.body().is_empty() {
        Value::Object(Map::new())
    } else {
        match serde_json::from_slice(req.body()) {
            Ok(value) => value,
            Err(e) => return bad_request(format!("invalid JSON: {e}")),
        }
    };

    let Value::Object(fields) = payload else {
        return bad_request("payload must be a JSON object".to_owned());
    };

    let clicks = fields.get("clicks").cloned().unwrap_or(json!(0));
    let unlocked = fields.get("unlocked").cloned().unwrap_or(json!([]));

    match store.replace(&clicks, &unlocked) {
        Ok(stored) => {
            debug!(clicks = stored.clicks, unlocked = stored.unlocked.len(), "progress replaced");
            Response::json(br#"{"status":"ok"}"#.to_vec())
        }
        Err(e) => bad_request(e.to_string()),
    }
}

fn bad_request(message: String) -> Response {
    let body = json!({ "error": message });
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .json(body.to_string().into_bytes())
}

#[cfg(test)]
mod tests {
    use http::Method;
    use serde_json::json;

    use super::*;

    fn store() -> Arc<ProgressStore> {
        Arc::new(ProgressStore::new())
    }

    fn post(body: &str) -> Request {
        Request::test(Method::POST, ACHIEVEMENTS_PATH, body.as_bytes())
    }

    async fn get_body(store: &Arc<ProgressStore>) -> Value {
        let req = Request::test(Method::GET, ACHIEVEMENTS_PATH, b"");
        let response = get_achievements(Arc::clone(store), req).await;
        serde_json::from_slice(&response.body).unwrap()
    }

    #[tokio::test]
    async fn get_reflects_the_last_successful_post() {
        let store = store();
        let body = r#"{"clicks": 4, "unlocked": ["first-click", "night-owl"]}"#;
        let response = post_achievements(Arc::clone(&store), post(body)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&response.body).unwrap(),
            json!({"status": "ok"}),
        );

        assert_eq!(
            get_body(&store).await,
            json!({"clicks": 4, "unlocked": ["first-click", "night-owl"]}),
        );
    }

    #[tokio::test]
    async fn post_clamps_dedupes_and_drops() {
        let store = store();
        let body = r#"{"clicks": -5, "unlocked": ["a", 3, null, "b", "a"]}"#;
        post_achievements(Arc::clone(&store), post(body)).await;

        assert_eq!(get_body(&store).await, json!({"clicks": 0, "unlocked": ["a", "b"]}));
    }

    #[tokio::test]
    async fn empty_body_resets_to_defaults() {
        let store = store();
        post_achievements(Arc::clone(&store), post(r#"{"clicks": 9, "unlocked": ["a"]}"#)).await;
        let response = post_achievements(Arc::clone(&store), post("")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(get_body(&store).await, json!({"clicks": 0, "unlocked": []}));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_and_state_kept() {
        let store = store();
        post_achievements(Arc::clone(&store), post(r#"{"clicks": 2, "unlocked": ["a"]}"#)).await;

        let response = post_achievements(Arc::clone(&store), post("{not json")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("invalid JSON"));

        assert_eq!(get_body(&store).await, json!({"clicks": 2, "unlocked": ["a"]}));
    }

    #[tokio::test]
    async fn non_object_payload_is_rejected() {
        let store = store();
        let response = post_achievements(Arc::clone(&store), post("[1, 2]")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_sequence_unlocked_is_rejected_and_state_kept() {
        let store = store();
        post_achievements(Arc::clone(&store), post(r#"{"clicks": 1, "unlocked": ["a"]}"#)).await;

        let response =
            post_achievements(Arc::clone(&store), post(r#"{"unlocked": {"a": true}}"#)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("'unlocked' must be a list"));

        assert_eq!(get_body(&store).await, json!({"clicks": 1, "unlocked": ["a"]}));
    }

    #[tokio::test]
    async fn missing_fields_default() {
        let store = store();
        post_achievements(Arc::clone(&store), post(r#"{"clicks": 3}"#)).await;
        assert_eq!(get_body(&store).await, json!({"clicks": 3, "unlocked": []}));
    }
}
