use super::{
    health::build_health_check_routers, owner::build_owner_routers,
    reservation::build_reservation_routers, turf::build_turf_routers, user::build_user_routers,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_user_routers())
        .merge(build_turf_routers())
        .merge(build_reservation_routers())
        .merge(build_owner_routers());
    Router::new().nest("/api/v1", router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{EMAIL_VERIFIED_HEADER, USER_ID_HEADER};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use shared::config::BookingConfig;
    use tower::ServiceExt;

    const OWNER: &str = "owner-1";
    const PLAYER: &str = "player-1";
    const EVENING: &str = "18:00 - 19:00";

    fn app() -> Router {
        routes().with_state(AppRegistry::in_memory(BookingConfig::default()))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder
                .header(USER_ID_HEADER, user)
                .header(EMAIL_VERIFIED_HEADER, "true");
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    // オーナー登録とターフ作成を済ませた状態を作る
    async fn setup_turf(app: &Router, capacity: i32) -> String {
        let (status, _) = send(
            app,
            Method::POST,
            "/api/v1/users/me",
            Some(OWNER),
            Some(json!({ "name": "Asha", "role": "owner" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/turfs",
            Some(OWNER),
            Some(json!({
                "name": "Greenfield Arena",
                "city": "Pune",
                "pricePerPlayer": 150,
                "capacity": capacity,
                "sports": ["Football"],
                "coverImage": "https://img.example/cover.jpg"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["turfId"].as_str().unwrap().to_string()
    }

    async fn reserve(app: &Router, turf_id: &str, user: &str, players: i32) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            &format!("/api/v1/turfs/{turf_id}/reservations"),
            Some(user),
            Some(json!({ "date": "2030-06-01", "slot": EVENING, "players": players })),
        )
        .await
    }

    #[tokio::test]
    async fn health_check_works() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/api/v1/health/db", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn booking_flow_fills_slot_and_rejects_overflow() {
        let app = app();
        let turf_id = setup_turf(&app, 22).await;

        let (status, body) = reserve(&app, &turf_id, PLAYER, 20).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["totalAmount"], 3000);
        assert_eq!(body["slot"], EVENING);
        assert_eq!(body["status"], "confirmed");

        let (status, body) = reserve(&app, &turf_id, "player-2", 3).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("slot full"));

        let (status, _) = reserve(&app, &turf_id, "player-2", 2).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/turfs/{turf_id}/availability?date=2030-06-01"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let slots = body["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 14);
        let evening = slots.iter().find(|s| s["slot"] == EVENING).unwrap();
        assert_eq!(evening["occupancy"], 22);
        assert_eq!(evening["band"], "closed");
        assert_eq!(evening["selectable"], false);
        assert_eq!(slots[0]["band"], "open");
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_booking() {
        let app = app();
        let turf_id = setup_turf(&app, 22).await;

        let (status, _) = reserve(&app, &turf_id, PLAYER, 31).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = reserve(&app, &turf_id, PLAYER, 0).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/turfs/{turf_id}/reservations"),
            Some(PLAYER),
            Some(json!({ "date": "2030-06-01", "slot": "21:00 - 22:00", "players": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = kernel::model::id::TurfId::new();
        let (status, _) = reserve(&app, &unknown.to_string(), PLAYER, 2).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn identity_and_role_are_enforced() {
        let app = app();
        let turf_id = setup_turf(&app, 22).await;

        let (status, _) = send(&app, Method::GET, "/api/v1/reservations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // メール未確認のユーザーは予約できない
        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/turfs/{turf_id}/reservations"))
            .header(USER_ID_HEADER, PLAYER)
            .header(EMAIL_VERIFIED_HEADER, "false")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "date": "2030-06-01", "slot": EVENING, "players": 2 }).to_string(),
            ))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/turfs",
            Some(PLAYER),
            Some(json!({
                "name": "Not Mine",
                "city": "Pune",
                "pricePerPlayer": 100,
                "coverImage": "cover"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(&app, Method::GET, "/api/v1/owner/bookings", Some(PLAYER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn cancel_once_and_orphans_disappear() {
        let app = app();
        let turf_id = setup_turf(&app, 22).await;

        let (_, body) = reserve(&app, &turf_id, PLAYER, 12).await;
        let reservation_id = body["reservationId"].as_str().unwrap().to_string();
        let cancel_uri = format!("/api/v1/reservations/{reservation_id}/cancel");

        let (status, _) = send(&app, Method::PUT, &cancel_uri, Some(OWNER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, Method::PUT, &cancel_uri, Some(PLAYER), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::PUT, &cancel_uri, Some(PLAYER), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/reservations/{reservation_id}"),
            Some(PLAYER),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "cancelled");
        assert_eq!(body["cancelledBy"], PLAYER);

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/v1/turfs/{turf_id}"),
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send(&app, Method::GET, "/api/v1/reservations", Some(PLAYER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn owner_sees_monthly_matrix() {
        let app = app();
        let turf_id = setup_turf(&app, 22).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/users/me",
            Some(PLAYER),
            Some(json!({ "name": "Ravi", "role": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        reserve(&app, &turf_id, PLAYER, 12).await;
        reserve(&app, &turf_id, "player-2", 8).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/owner/bookings?month=2030-06",
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month"], "2030-06");
        let turf = &body["turfs"][0];
        assert_eq!(turf["turfName"], "Greenfield Arena");
        let cell = &turf["dates"][0]["slots"][0];
        assert_eq!(turf["dates"][0]["date"], "2030-06-01");
        assert_eq!(cell["slot"], EVENING);
        assert_eq!(cell["occupancy"], 20);
        let entries = cell["reservations"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        let ravi = entries.iter().find(|e| e["userId"] == PLAYER).unwrap();
        assert_eq!(ravi["userName"], "Ravi");
        let unnamed = entries.iter().find(|e| e["userId"] == "player-2").unwrap();
        assert!(unnamed["userName"].is_null());

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/owner/bookings?month=2030-07",
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["turfs"].as_array().unwrap().is_empty());

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/owner/bookings?month=2030-13",
            Some(OWNER),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn owner_cannot_shrink_capacity_below_bookings() {
        let app = app();
        let turf_id = setup_turf(&app, 22).await;
        reserve(&app, &turf_id, PLAYER, 15).await;

        let uri = format!("/api/v1/turfs/{turf_id}");
        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(OWNER),
            Some(json!({ "capacity": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(OWNER),
            Some(json!({ "capacity": 16, "city": "Mumbai" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["capacity"], 16);

        let (status, body) =
            send(&app, Method::GET, "/api/v1/turfs?city=mumbai", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
    }
}
