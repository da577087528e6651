use std::sync::Arc;

use tower_http::cors::CorsLayer;

use catalog::services::db;
use catalog::{AppState, routes};

#[tokio::main]
async fn main() {
    let database_url = db::database_url_from_env();
    let pool = db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let state = Arc::new(AppState { db: pool });

    let app = routes::build_routes()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}
