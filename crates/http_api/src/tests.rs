use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use app_api::AppContext;
use sales_app::{AppPaths, AppState, ensure_app_data_dir};

use crate::HttpState;

#[tokio::test]
async fn serves_index_and_static_assets() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let app_state = AppState::new(paths.db_path, paths.mapping_defaults_path);
    app_state.setup_db().expect("setup db");

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let state = HttpState::new(context, "testtoken".to_string());
    let app = crate::router(state);

    for (uri, mime) in [("/", "text/html"), ("/app.js", "javascript"), ("/style.css", "text/css")] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        assert!(content_type.contains(mime), "{uri}: {content_type}");
    }

    let missing = app
        .oneshot(
            Request::builder()
                .uri("/nope.png")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
