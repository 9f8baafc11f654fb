//! Accounts API endpoints.

use api_types::account::{
    AccountBalanceView, AccountCreated, AccountList, AccountListResponse, AccountNew,
    AccountUpdate, AccountView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, currency, server::ServerState, user};

fn map_account(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        currency: currency::to_api(account.currency),
        archived: account.archived,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let currency = currency::to_engine(payload.currency.unwrap_or_default());
    let id = state
        .engine
        .new_account(&payload.name, currency, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(&user.username, query.include_archived.unwrap_or(false))
        .await?
        .into_iter()
        .map(map_account)
        .collect();
    Ok(Json(AccountListResponse { accounts }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(account_id, &user.username).await?;
    Ok(Json(map_account(account)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    if payload.name.is_none() && payload.archived.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or archived".to_string(),
        ));
    }

    if let Some(name) = payload.name.as_deref() {
        state
            .engine
            .rename_account(account_id, name, &user.username)
            .await?;
    }
    if let Some(archived) = payload.archived {
        state
            .engine
            .set_account_archived(account_id, archived, &user.username)
            .await?;
    }

    let account = state.engine.account(account_id, &user.username).await?;
    Ok(Json(map_account(account)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_account(account_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountBalanceView>, ServerError> {
    let balance = state
        .engine
        .account_balance(account_id, &user.username)
        .await?;
    Ok(Json(AccountBalanceView {
        account_id: balance.account_id,
        currency: currency::to_api(balance.currency),
        balance_minor: balance.balance_minor,
        balance: balance.balance().to_string(),
        entries: balance.entries,
        unresolved: balance.unresolved,
    }))
}
