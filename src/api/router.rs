//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. Everything except the health check and
//! master registration requires bearer token authentication.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` via `with_state`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    // Protected routes — require a bearer token
    let protected = Router::new()
        .route("/masters", get(endpoints::masters::list))
        .route("/masters/:id", put(endpoints::masters::update_profile))
        .route("/masters/:id/colors", get(endpoints::masters::colors))
        .route(
            "/masters/:id/appointments",
            get(endpoints::appointments::list_for_master),
        )
        .route("/appointments", get(endpoints::appointments::day))
        .route("/appointments/range", get(endpoints::appointments::range))
        .route(
            "/appointments/:master_id",
            post(endpoints::appointments::create),
        )
        .route(
            "/appointments/:master_id/:appointment_id",
            put(endpoints::appointments::update),
        )
        .route(
            "/appointments/:master_id/:appointment_id",
            delete(endpoints::appointments::delete),
        )
        .route(
            "/appointments/:master_id/:appointment_id/complete",
            post(endpoints::appointments::complete),
        )
        .route(
            "/appointments/:master_id/:appointment_id/cancel",
            post(endpoints::appointments::cancel),
        )
        .route("/stats", get(endpoints::stats::day))
        .route("/stats/range", get(endpoints::stats::range))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes — health check and registration
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/masters/register", post(endpoints::masters::register))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::db::open_memory_database;

    fn test_app() -> Router {
        let conn = open_memory_database().unwrap();
        api_router(ApiContext::new(conn))
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    /// Registers a master and returns (master_id, token).
    async fn register(app: &Router, name: &str, telegram_id: i64) -> (String, String) {
        let body = format!(r#"{{"name":"{name}","telegram_id":{telegram_id}}}"#);
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/masters/register", None, &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        (
            json["master"]["id"].as_str().unwrap().to_string(),
            json["token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = test_app();
        let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn masters_list_requires_auth() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/api/masters", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/api/masters", Some("bogus")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_then_list_masters() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let response = app
            .oneshot(get_request("/api/masters", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let masters = json["masters"].as_array().unwrap();
        assert_eq!(masters.len(), 1);
        assert_eq!(masters[0]["id"], id.as_str());
        assert_eq!(masters[0]["role"], "member");
        assert!(masters[0]["colors"]["background"]
            .as_str()
            .unwrap()
            .starts_with("hsl("));
    }

    #[tokio::test]
    async fn re_registration_reuses_the_master() {
        let app = test_app();
        let (id, _) = register(&app, "Olga", 100).await;
        let (again, token) = register(&app, "Olga", 100).await;
        assert_eq!(id, again);

        let response = app
            .oneshot(get_request("/api/masters", Some(&token)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["masters"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn booking_flow() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}"),
                Some(&token),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(response).await;
        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["duration"], 60);
        assert!(json["payment"].is_null());

        let response = app
            .oneshot(get_request(
                &format!("/api/masters/{id}/appointments?date=2024-06-01"),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["appointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn double_booking_returns_409() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        let uri = format!("/api/appointments/{id}");
        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request("POST", &uri, Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "SLOT_TAKEN");
    }

    #[tokio::test]
    async fn member_cannot_book_for_another_master() {
        let app = test_app();
        let (other_id, _) = register(&app, "Olga", 100).await;
        let (_, token) = register(&app, "Vera", 101).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{other_id}"),
                Some(&token),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn complete_records_payment() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}"),
                Some(&token),
                body,
            ))
            .await
            .unwrap();
        let apt_id = response_json(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}/{apt_id}/complete"),
                Some(&token),
                r#"{"cash_payment":500,"card_payment":1200}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "completed");
        assert_eq!(json["payment"]["cash"], 500);
        assert_eq!(json["payment"]["card"], 1200);

        // Completing twice is an invalid transition
        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}/{apt_id}/complete"),
                Some(&token),
                r#"{}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn cancel_then_delete() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}"),
                Some(&token),
                body,
            ))
            .await
            .unwrap();
        let apt_id = response_json(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}/{apt_id}/cancel"),
                Some(&token),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "cancelled");

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/appointments/{id}/{apt_id}"))
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn day_view_groups_by_master() {
        let app = test_app();
        let (id_a, token_a) = register(&app, "Olga", 100).await;
        let (id_b, token_b) = register(&app, "Vera", 101).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id_a}"),
                Some(&token_a),
                body,
            ))
            .await
            .unwrap();
        let body = r#"{"date":"2024-06-01","time":"11:00","client_name":"Dina"}"#;
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id_b}"),
                Some(&token_b),
                body,
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request("/api/appointments?date=2024-06-01", Some(&token_a)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json[&id_a].as_array().unwrap().len(), 1);
        assert_eq!(json[&id_b].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn range_view_includes_empty_days() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}"),
                Some(&token),
                body,
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request(
                "/api/appointments/range?start_date=2024-06-01&end_date=2024-06-03",
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let days = json.as_object().unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days["2024-06-01"].as_array().unwrap().len(), 1);
        assert!(days["2024-06-02"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inverted_range_returns_400() {
        let app = test_app();
        let (_, token) = register(&app, "Olga", 100).await;

        let response = app
            .oneshot(get_request(
                "/api/appointments/range?start_date=2024-06-03&end_date=2024-06-01",
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_range_reports_revenue() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let body = r#"{"date":"2024-06-01","time":"10:00","client_name":"Anna"}"#;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}"),
                Some(&token),
                body,
            ))
            .await
            .unwrap();
        let apt_id = response_json(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/appointments/{id}/{apt_id}/complete"),
                Some(&token),
                r#"{"cash_payment":500,"card_payment":1200}"#,
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request(
                "/api/stats/range?start_date=2024-06-01&end_date=2024-06-01",
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["total_appointments"], 1);
        assert_eq!(json["completed_appointments"], 1);
        assert_eq!(json["total_revenue"], 1700);
    }

    #[tokio::test]
    async fn profile_update_is_owner_only() {
        let app = test_app();
        let (id, _) = register(&app, "Olga", 100).await;
        let (_, other_token) = register(&app, "Vera", 101).await;

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/masters/{id}"),
                Some(&other_token),
                r#"{"name":"Hacked"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn colors_are_stable_per_master() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        let uri = format!("/api/masters/{id}/colors");
        let response = app
            .clone()
            .oneshot(get_request(&uri, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let first = response_json(response).await;
        assert!(first["background"].as_str().unwrap().starts_with("hsl("));
        assert!(first["indicator"].is_string());
        assert!(first["border"].is_string());

        let response = app
            .clone()
            .oneshot(get_request(&uri, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response_json(response).await, first);

        let response = app
            .oneshot(get_request("/api/masters/ghost/colors", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_without_date_cover_the_whole_store() {
        let app = test_app();
        let (id, token) = register(&app, "Olga", 100).await;

        for date in ["2024-06-01", "2024-06-02"] {
            let body = format!(r#"{{"date":"{date}","time":"10:00","client_name":"Anna"}}"#);
            app.clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/appointments/{id}"),
                    Some(&token),
                    &body,
                ))
                .await
                .unwrap();
        }

        let response = app
            .oneshot(get_request("/api/stats", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["total_appointments"], 2);
        assert_eq!(json["completed_appointments"], 0);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/api/nonexistent", Some("token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
