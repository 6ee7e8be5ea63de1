use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn setup_test_app() -> Router {
    init_test_logging();
    cityweather::app()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
    let raw = body.map(|b| serde_json::to_vec(b).unwrap());
    send_raw(app, method, uri, raw).await
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Vec<u8>>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn weather(city: &str, temperature: f64, condition: &str, timestamp: &str) -> Value {
    json!({
        "city_name": city,
        "temperature": temperature,
        "condition": condition,
        "timestamp": timestamp,
    })
}

#[tokio::test]
async fn post_returns_stored_observation() {
    let app = setup_test_app();
    let body = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z");

    let (status, json) = send(&app, Method::POST, "/weather", Some(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, body);
}

#[tokio::test]
async fn get_returns_latest_or_404() {
    let app = setup_test_app();
    let body = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z");
    send(&app, Method::POST, "/weather", Some(&body)).await;

    let (status, json) = send(&app, Method::GET, "/weather/manchester", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, body);

    let (status, json) = send(&app, Method::GET, "/weather/london", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json,
        json!({"code": 404, "name": "Not Found", "description": "city not found"})
    );

    let (status, _) = send(&app, Method::GET, "/weather/not_valid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_all_lists_latest_per_city_in_insertion_order() {
    let app = setup_test_app();

    let (status, json) = send(&app, Method::GET, "/weather", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"all_city_weather": []}));

    let bodies = [
        weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z"),
        weather("london", 28.0, "rainy", "2025-12-20T10:00:00Z"),
    ];
    for body in &bodies {
        let (status, json) = send(&app, Method::POST, "/weather", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&json, body);
    }

    let (status, json) = send(&app, Method::GET, "/weather", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"all_city_weather": bodies}));
}

#[tokio::test]
async fn delete_removes_city() {
    let app = setup_test_app();

    let (status, _) = send(&app, Method::DELETE, "/weather/london", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z");
    send(&app, Method::POST, "/weather", Some(&body)).await;

    let (status, json) = send(&app, Method::DELETE, "/weather/manchester", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);

    let (status, _) = send(&app, Method::GET, "/weather/manchester", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/weather/manchester", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_appends_and_rejects_older_data() {
    let app = setup_test_app();
    let body = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z");
    send(&app, Method::POST, "/weather", Some(&body)).await;

    let updated = weather("manchester", 28.0, "sunny", "2025-12-20T10:00:00Z");
    let (status, json) = send(&app, Method::PUT, "/weather/manchester", Some(&updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, updated);

    let stale = weather("manchester", -5.0, "sunny", "2020-01-20T10:00:00Z");
    let (status, json) = send(&app, Method::PUT, "/weather/manchester", Some(&stale)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({
            "code": 400,
            "name": "Bad Request",
            "description": "new weather data: 2020-01-20 10:00:00+00:00 is older than current data: 2025-12-20 10:00:00+00:00",
        })
    );

    let (_, json) = send(&app, Method::GET, "/weather/manchester", None).await;
    assert_eq!(json, updated);

    let london = weather("london", 22.0, "sunny", "2025-12-20T10:00:00Z");
    let (status, _) = send(&app, Method::PUT, "/weather/london", Some(&london)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_rejects_older_data() {
    let app = setup_test_app();
    send(
        &app,
        Method::POST,
        "/weather",
        Some(&weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z")),
    )
    .await;

    let stale = weather("manchester", -5.0, "sunny", "2020-01-20T10:00:00Z");
    let (status, json) = send(&app, Method::POST, "/weather", Some(&stale)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn update_rejects_mismatched_city() {
    let app = setup_test_app();
    send(
        &app,
        Method::POST,
        "/weather",
        Some(&weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z")),
    )
    .await;

    let london = weather("london", 12.0, "cloudy", "2025-12-21T10:00:00Z");
    let (status, _) = send(&app, Method::PUT, "/weather/manchester", Some(&london)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/weather/london", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests_with_json_errors() {
    let app = setup_test_app();

    let mut extra = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z");
    extra["humidity"] = json!(50);

    let cases = [
        weather("atlantis", 22.0, "sunny", "2025-12-20T10:00:00Z"),
        weather("manchester", 70.0, "sunny", "2025-12-20T10:00:00Z"),
        weather("manchester", 22.0, "tornado", "2025-12-20T10:00:00Z"),
        weather("manchester", 22.0, "sunny", "1999-12-31T10:00:00Z"),
        weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00"),
        json!({"city_name": "manchester"}),
        extra,
    ];

    for body in &cases {
        let (status, json) = send(&app, Method::POST, "/weather", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["code"], 400);
        assert_eq!(json["name"], "Bad Request");
        assert!(json["description"].is_string());
    }

    let (_, json) = send(&app, Method::GET, "/weather", None).await;
    assert_eq!(json, json!({"all_city_weather": []}));
}

#[tokio::test]
async fn unknown_routes_return_json_404() {
    let app = setup_test_app();

    let (status, json) = send(&app, Method::GET, "/forecast", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 404);
    assert_eq!(json["name"], "Not Found");
}

#[tokio::test]
async fn unsupported_methods_return_json_405() {
    let app = setup_test_app();
    let body = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00Z");

    let cases = [
        (Method::PATCH, "/weather", None),
        (Method::DELETE, "/weather", None),
        (Method::POST, "/weather/manchester", Some(&body)),
    ];

    for (method, uri, body) in cases {
        let (status, json) = send(&app, method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(json["code"], 405);
        assert_eq!(json["name"], "Method Not Allowed");
        assert!(json["description"].is_string());
    }
}

#[tokio::test]
async fn put_validates_body_before_looking_up_city() {
    let app = setup_test_app();

    let invalid = weather("london", 99.0, "sunny", "2025-12-20T10:00:00Z");
    let (status, json) = send(&app, Method::PUT, "/weather/london", Some(&invalid)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn non_json_body_is_bad_request() {
    let app = setup_test_app();

    let (status, json) =
        send_raw(&app, Method::POST, "/weather", Some(b"{not json".to_vec())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["name"], "Bad Request");

    let (status, _) = send_raw(&app, Method::POST, "/weather", Some(Vec::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn writes_differing_below_a_microsecond_are_equal() {
    let app = setup_test_app();

    let first = weather("manchester", 22.0, "sunny", "2025-12-20T10:00:00.1234568Z");
    let (status, json) = send(&app, Method::POST, "/weather", Some(&first)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["timestamp"], "2025-12-20T10:00:00.123456Z");

    let second = weather("manchester", 23.0, "sunny", "2025-12-20T10:00:00.1234567Z");
    let (status, _) = send(&app, Method::POST, "/weather", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn undecodable_path_returns_json_error() {
    let app = setup_test_app();

    let (status, json) = send(&app, Method::GET, "/weather/%FF", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
    assert!(json["description"].is_string());
}
