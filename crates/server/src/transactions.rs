//! Transactions API endpoints: debits/credits, changes and shared views.

use api_types::transaction::{
    ChangeNew, DebitsCreditsNew, TransactionCreated, TransactionKind as ApiKind, TransactionList,
    TransactionListResponse, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{ChangeCmd, DebitsCreditsCmd, Money, UpdateTransactionCmd};
use uuid::Uuid;

use crate::{ServerError, currency, server::ServerState, user};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::DebitsCredits => ApiKind::DebitsCredits,
        engine::TransactionKind::Change => ApiKind::Change,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        account_id: tx.account_id,
        name: tx.name.clone(),
        amount_minor: tx.amount.amount_minor(),
        currency: currency::to_api(tx.amount.currency()),
        value: tx.value(),
        reference_amount_minor: tx.reference_amount.map(Money::amount_minor),
        date: tx.date,
        active: tx.active,
        category_id: tx.category_id,
        new_amount_minor: tx.new_amount.map(Money::amount_minor),
        new_currency: tx.new_amount.map(|money| currency::to_api(money.currency())),
        new_value: tx.new_value(),
        exchange_rate: tx.exchange_rate(),
    }
}

fn map_update(payload: &TransactionUpdate) -> UpdateTransactionCmd {
    let category_id = if payload.clear_category {
        Some(None)
    } else {
        payload.category_id.map(Some)
    };
    UpdateTransactionCmd {
        name: payload.name.clone(),
        amount_minor: payload.amount_minor,
        currency: payload.currency.map(currency::to_engine),
        date: payload.date,
        active: payload.active,
        category_id,
        new_amount_minor: payload.new_amount_minor,
        new_currency: payload.new_currency.map(currency::to_engine),
    }
}

pub async fn debits_credits_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DebitsCreditsNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = DebitsCreditsCmd::new(
        payload.account_id,
        &user.username,
        payload.name,
        payload.amount_minor,
        payload.date,
    );
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency::to_engine(currency));
    }
    if let Some(active) = payload.active {
        cmd = cmd.active(active);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }

    let id = state.engine.new_debits_credits(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn debits_credits_update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    if payload.force {
        return Err(ServerError::Generic(
            "force only applies to changes".to_string(),
        ));
    }

    let engine = &state.engine;
    engine
        .update_debits_credits(transaction_id, &user.username, map_update(&payload))
        .await?;
    let tx = engine.transaction(transaction_id, &user.username).await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn change_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ChangeNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = ChangeCmd::new(
        payload.account_id,
        &user.username,
        payload.name,
        payload.amount_minor,
        payload.new_amount_minor,
        currency::to_engine(payload.new_currency),
        payload.date,
    );
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency::to_engine(currency));
    }
    if let Some(active) = payload.active {
        cmd = cmd.active(active);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }

    let id = state.engine.new_change(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn change_update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(change_id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let engine = &state.engine;
    let cmd = map_update(&payload);
    if payload.force {
        engine
            .force_save_change(change_id, &user.username, cmd)
            .await?;
    } else {
        engine.update_change(change_id, &user.username, cmd).await?;
    }

    let tx = engine.transaction(change_id, &user.username).await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(ServerError::Generic(
            "from must not be after to".to_string(),
        ));
    }

    let filter = engine::TransactionListFilter {
        account_id: query.account_id,
        kind: query.kind.map(|kind| match kind {
            ApiKind::DebitsCredits => engine::TransactionKind::DebitsCredits,
            ApiKind::Change => engine::TransactionKind::Change,
        }),
        from: query.from,
        to: query.to,
        include_inactive: query.include_inactive.unwrap_or(false),
        limit: query.limit,
    };

    let transactions = state
        .engine
        .list_transactions(&user.username, &filter)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .transaction(transaction_id, &user.username)
        .await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(transaction_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
