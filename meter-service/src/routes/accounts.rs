use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use customer_client::db::account_queries;
use serde_json::json;

use super::AppState;
use crate::error::ApiError;
use crate::models::{AccountDto, CreateAccountModel, EditAccountModel};

const NAME_MAX_LEN: usize = 50;

fn check_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::Validation(format!(
            "{field} must be {NAME_MAX_LEN} characters or fewer"
        )));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AccountDto>>, ApiError> {
    let accounts = account_queries::all_accounts(&state.pool).await?;
    Ok(Json(accounts.into_iter().map(AccountDto::from).collect()))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AccountDto>, ApiError> {
    match account_queries::find_account(&state.pool, id).await? {
        Some(account) => Ok(Json(account.into())),
        None => Err(ApiError::NotFound(format!("Account with ID {id} not found"))),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountModel>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    check_name("firstName", &body.first_name)?;
    check_name("lastName", &body.last_name)?;

    let id =
        account_queries::insert_account(&state.pool, &body.first_name, &body.last_name).await?;

    Ok((StatusCode::CREATED, Json(json!({ "accountId": id }))))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EditAccountModel>,
) -> Result<StatusCode, ApiError> {
    if body.account_id != id {
        return Err(ApiError::Validation("The account IDs do not match".to_string()));
    }
    check_name("firstName", &body.first_name)?;
    check_name("lastName", &body.last_name)?;

    let Some(existing) = account_queries::find_account(&state.pool, id).await? else {
        return Err(ApiError::NotFound(format!("Account with ID {id} not found")));
    };

    // Only fields that actually differ are written; an unchanged edit is a
    // no-op against the store.
    let first_name =
        (existing.first_name != body.first_name).then_some(body.first_name.as_str());
    let last_name = (existing.last_name != body.last_name).then_some(body.last_name.as_str());
    account_queries::update_account(&state.pool, id, first_name, last_name).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = account_queries::delete_account(&state.pool, id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound(format!("Account with ID {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
