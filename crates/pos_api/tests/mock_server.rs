use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use pos_api::{ApiAuth, ApiConnection, GENERIC_ORDER_PLU, PosApiError, PosClient};
use serde_json::{Value, json};

fn spawn_server(app: Router) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.set_nonblocking(true).expect("nonblocking");
    let addr = listener.local_addr().expect("addr");
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
            axum::serve(listener, app).await.expect("serve");
        });
    });
    addr
}

fn client(addr: SocketAddr, auth: ApiAuth) -> PosClient {
    PosClient::new(ApiConnection::new(format!("http://{}", addr), auth)).expect("client")
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")
}

async fn sales(headers: HeaderMap, Query(params): Query<BTreeMap<String, String>>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|value| value.to_str().ok()) != Some("secret") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "denied"})));
    }
    let location = params.get("location").cloned().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "data": [
                {"item_id": "81831", "quantity": 2, "order_time": "2024-07-01T11:05:00", "store_location": location},
                {"item_id": "2307", "order_time": "2024-07-01T18:05:00"},
                {"item_id": "2307", "order_time": "2024-07-01T18:10:00", "is_void": true},
                {"quantity": 1, "order_time": "2024-07-01T18:10:00"}
            ],
            "start": params.get("start_date"),
            "format": params.get("format")
        })),
    )
}

fn generic_router() -> Router {
    Router::new()
        .route("/api/health", get(|| async { "ok" }))
        .route("/api/sales", get(sales))
        .route(
            "/api/categories",
            get(|| async { Json(json!({"Corn": [2307, "3082"], "1/2 Chix": [81831]})) }),
        )
}

#[test]
fn generic_api_pull_normalizes_records() {
    let addr = spawn_server(generic_router());
    let client = client(
        addr,
        ApiAuth::ApiKey {
            header: "X-API-Key".to_string(),
            key: "secret".to_string(),
        },
    );
    assert!(client.test_connection().expect("health"));

    let pull = client
        .pull_sales("Covington", date("2024-07-01"), date("2024-07-01"))
        .expect("pull");
    assert_eq!(pull.records_read, 4);
    assert_eq!(pull.records_dropped, 2);
    assert_eq!(pull.items.len(), 2);
    assert_eq!(pull.items[0].quantity, 2.0);
    assert_eq!(pull.items[1].quantity, 1.0);
    assert!(pull.items.iter().all(|item| item.location == "Covington"));

    let rules = client.pull_category_mappings().expect("categories");
    assert_eq!(rules.len(), 2);
}

async fn repeated_sales() -> Json<Value> {
    Json(json!([
        {"item_id": "2307", "qty": 1, "order_time": "2024-07-01T18:05:00"},
        {"item_id": "2307", "qty": 1, "order_time": "2024-07-01T18:05:00"}
    ]))
}

#[test]
fn identical_sales_are_all_stored() {
    let addr = spawn_server(Router::new().route("/api/sales", get(repeated_sales)));
    let client = client(addr, ApiAuth::None);
    let pull = client
        .pull_sales("Kenner", date("2024-07-01"), date("2024-07-01"))
        .expect("pull");
    assert_eq!(pull.items.len(), 2);

    let dir = tempfile::tempdir().expect("temp dir");
    let mut db = sales_db::Db::open(dir.path().join("pull.sqlite")).expect("open db");
    db.migrate().expect("migrate db");
    let summary = db.insert_sale_rows(&pull.items).expect("insert");
    assert_eq!(summary.inserted, 2);

    let again = client
        .pull_sales("Kenner", date("2024-07-01"), date("2024-07-01"))
        .expect("pull again");
    let summary = db.insert_sale_rows(&again.items).expect("insert again");
    assert_eq!(summary.inserted, 0);
}

#[test]
fn rejected_credentials_surface_as_auth_error() {
    let addr = spawn_server(generic_router());
    let client = client(
        addr,
        ApiAuth::Bearer {
            token: "wrong".to_string(),
        },
    );
    let err = client
        .pull_sales("Covington", date("2024-07-01"), date("2024-07-01"))
        .expect_err("unauthorized");
    assert!(matches!(err, PosApiError::Auth(_)));
}

#[test]
fn missing_endpoint_is_a_status_error() {
    let addr = spawn_server(Router::new());
    let client = client(addr, ApiAuth::None);
    assert!(!client.test_connection().expect("health"));
    let err = client.pull_category_mappings().expect_err("not found");
    assert!(matches!(err, PosApiError::Status { status: 404, .. }));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = PosClient::new(ApiConnection::new("ftp://example", ApiAuth::None))
        .err()
        .expect("invalid");
    assert!(matches!(err, PosApiError::InvalidConfig(_)));
}

async fn toast_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["clientId"] == "client" && body["userAccessType"] == "TOAST_MACHINE_CLIENT" {
        (
            StatusCode::OK,
            Json(json!({"token": {"accessToken": "toast-token"}})),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({})))
    }
}

async fn toast_orders(
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some("Bearer toast-token");
    let restaurant = headers
        .get("toast-restaurant-external-id")
        .and_then(|value| value.to_str().ok());
    if !authorized || restaurant != Some("guid-1") {
        return (StatusCode::FORBIDDEN, Json(json!([])));
    }
    if params.get("businessDate").map(String::as_str) != Some("20240701") {
        return (StatusCode::BAD_REQUEST, Json(json!([])));
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "guid": "o1",
                "openedDate": "2024-07-01T11:05:00.000+0000",
                "checks": [{"selections": [{"guid": "s1", "item": {"guid": "81831"}, "quantity": 3.0}]}]
            },
            {"guid": "o2", "openedDate": "2024-07-01T12:05:00.000+0000"},
            {"guid": "o3", "voided": true, "openedDate": "2024-07-01T12:10:00.000+0000"}
        ])),
    )
}

#[test]
fn toast_pull_logs_in_and_reads_orders() {
    let app = Router::new()
        .route("/authentication/v1/authentication/login", post(toast_login))
        .route("/orders/v2/ordersBulk", get(toast_orders));
    let addr = spawn_server(app);
    let client = client(
        addr,
        ApiAuth::ToastClient {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        },
    );
    let pull = client
        .pull_toast_orders("guid-1", "Covington", date("2024-07-01"))
        .expect("toast pull");
    assert_eq!(pull.records_read, 3);
    let plus = pull
        .items
        .iter()
        .map(|item| item.product_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(plus, vec!["81831", GENERIC_ORDER_PLU]);
}

#[test]
fn toast_login_failure_is_auth_error() {
    let app = Router::new().route("/authentication/v1/authentication/login", post(toast_login));
    let addr = spawn_server(app);
    let client = client(
        addr,
        ApiAuth::ToastClient {
            client_id: "other".to_string(),
            client_secret: "secret".to_string(),
        },
    );
    let err = client
        .pull_toast_orders("guid-1", "Covington", date("2024-07-01"))
        .expect_err("login fails");
    assert!(matches!(err, PosApiError::Auth(_)));
}
