use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod extractors;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use iplus_shared::clients::db::{create_pool, DbPool};
use iplus_shared::clients::email::EmailClient;
use iplus_shared::clients::storage::StorageClient;
use models::{ListingKind, SubjectKind};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub email: EmailClient,
    pub storage: StorageClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    iplus_shared::middleware::init_tracing("iplus-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let email = EmailClient::new(&config.resend_api_key, &config.from_email, "I-Plus");
    let storage = StorageClient::new(
        &config.s3_endpoint,
        &config.s3_access_key,
        &config.s3_secret_key,
        &config.s3_bucket,
        &config.s3_public_url,
    )
    .await;

    let state = Arc::new(AppState { db, config, email, storage });

    let metrics_handle = iplus_shared::middleware::init_metrics();

    let inspire = routes::inspire::routes()
        .merge(routes::inspire_comments::routes())
        .merge(routes::inspire_saves::routes())
        .merge(routes::reactions::routes(SubjectKind::Inspire));

    let ican = routes::listings::routes(ListingKind::ICan)
        .merge(routes::reactions::routes(SubjectKind::ICan))
        .nest("/requests", routes::listing_requests::routes(ListingKind::ICan));

    let ineed = routes::listings::routes(ListingKind::INeed)
        .merge(routes::reactions::routes(SubjectKind::INeed))
        .nest("/requests", routes::listing_requests::routes(ListingKind::INeed));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(move || async move { metrics_handle.render() }))
        .nest("/auth", routes::auth::routes())
        .nest("/user", routes::users::routes())
        .nest("/user-images", routes::user_images::routes())
        .nest("/user-skills", routes::user_skills::routes())
        .nest("/skills", routes::skills::routes())
        .nest("/inspire", inspire)
        .nest("/ican", ican)
        .nest("/ineed", ineed)
        .nest("/conversations", routes::conversations::routes())
        .nest("/ratings", routes::ratings::routes())
        .nest("/newsletter", routes::newsletter::routes())
        .nest("/contact", routes::contact::routes())
        // Axum's 2 MB default would reject media uploads well under the cap.
        .layer(DefaultBodyLimit::max(services::uploads::MAX_UPLOAD_BYTES))
        .layer(axum::middleware::from_fn(
            iplus_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "iplus-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
