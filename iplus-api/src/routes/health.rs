use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use iplus_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_check = match state.db.get() {
        Ok(mut conn) => match diesel::sql_query("SELECT 1").execute(&mut conn) {
            Ok(_) => HealthCheck {
                name: "database".into(),
                status: HealthStatus::Healthy,
                message: None,
            },
            Err(e) => HealthCheck {
                name: "database".into(),
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
            },
        },
        Err(e) => HealthCheck {
            name: "database".into(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
        },
    };

    Json(
        HealthResponse::healthy("iplus-api", env!("CARGO_PKG_VERSION"))
            .with_checks(vec![db_check]),
    )
}
