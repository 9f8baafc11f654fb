//! Exchange rate queries and reference amount maintenance.

use api_types::exchange::{ExchangeRateQuery, ExchangeRateView, RecomputeResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, currency, server::ServerState, user};

pub async fn rate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<Json<ExchangeRateView>, ServerError> {
    let rate = state
        .engine
        .exchange_rate(
            &user.username,
            currency::to_engine(query.from),
            currency::to_engine(query.to),
            query.date,
        )
        .await?;

    Ok(Json(ExchangeRateView {
        from: query.from,
        to: query.to,
        date: query.date,
        rate,
    }))
}

pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<RecomputeResponse>, ServerError> {
    let updated = state
        .engine
        .recompute_reference_amounts(&user.username)
        .await?;
    tracing::info!(user = %user.username, updated, "reference amounts recomputed");
    Ok(Json(RecomputeResponse { updated }))
}
