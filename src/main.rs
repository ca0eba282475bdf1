use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use talenthub_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, rate_limit},
    routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route(
            "/api/candidates",
            get(routes::candidate_routes::list_candidates)
                .post(routes::candidate_routes::create_candidate),
        )
        .route(
            "/api/candidates/events",
            get(routes::candidate_routes::candidate_events),
        )
        .route(
            "/api/candidates/:id",
            get(routes::candidate_routes::get_candidate)
                .patch(routes::candidate_routes::update_candidate)
                .delete(routes::candidate_routes::delete_candidate),
        )
        .route("/api/admin/login", post(routes::admin_routes::login))
        .route("/api/admin/signup", post(routes::admin_routes::signup))
        .route(
            "/api/admin/fix-accounts",
            get(routes::admin_routes::fix_accounts),
        )
        .route("/api/admin/stats", get(routes::admin_routes::stats))
        .route("/api/setup-db", get(routes::admin_routes::setup_db))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RequestBudget::per_second(config.public_rps),
            rate_limit::throttle,
        ));

    let app = base_routes
        .merge(public_api)
        .with_state(app_state)
        .layer(axum::middleware::from_fn(auth::route_guard))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
