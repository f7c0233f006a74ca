//! Entity handlers: list and read go through the view composer; writes go through CrudService.

use crate::accessor::Filter;
use crate::error::AppError;
use crate::model::SortSpec;
use crate::response::{success, success_many};
use crate::service::{AdminEntity, CrudService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

pub const SORT_NAME_PARAM: &str = "sortName";
pub const SORT_DIR_PARAM: &str = "sortDir";

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("invalid body: {}", e)))
}

/// Equality filters from query params; a filter column may be given as `tid` or `Tid`.
fn parse_filters<E: AdminEntity>(params: &HashMap<String, String>) -> Result<Vec<Filter>, AppError> {
    let mut filters = Vec::new();
    for col in E::FILTERS {
        let raw = params.get(*col).or_else(|| params.get(&E::field_name(col)));
        if let Some(raw) = raw {
            let value = raw
                .trim()
                .parse()
                .map_err(|_| AppError::BadRequest(format!("invalid {}: {}", col, raw)))?;
            filters.push((*col, value));
        }
    }
    Ok(filters)
}

pub async fn list<E: AdminEntity>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let sort = SortSpec::<E::Sort>::parse(
        params.get(SORT_NAME_PARAM).map(String::as_str),
        params.get(SORT_DIR_PARAM).map(String::as_str),
    );
    let filters = parse_filters::<E>(&params)?;
    let views = E::composer(&state.stores)
        .concurrency(state.config.enrich_concurrency)
        .compose_list(&filters, sort)
        .await?;
    Ok(success_many("Query Success!", views, E::EMPTY_LIST_MSG))
}

pub async fn read<E: AdminEntity>(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = parse_id(&id_str)?;
    let view = E::composer(&state.stores).compose_one(key).await?;
    Ok(success("Query Success!", view))
}

pub async fn create<E: AdminEntity>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let record: E = parse_body(body)?;
    let key = CrudService::create(&state.stores, &state.config.defaults, record).await?;
    Ok(success("Insert Success!", key))
}

pub async fn update<E: AdminEntity>(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let key = parse_id(&id_str)?;
    let record: E = parse_body(body)?;
    let stored = CrudService::update(&state.stores, &state.config.defaults, key, record).await?;
    Ok(success("Edit Success!", stored))
}

pub async fn delete<E: AdminEntity>(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = parse_id(&id_str)?;
    let deleted = CrudService::delete::<E>(&state.stores, key).await?;
    Ok(success("Delete Success!", deleted))
}

/// Replace many records at once; each array item carries its own key.
pub async fn bulk_update<E: AdminEntity>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let items: Vec<E> = match body {
        Value::Array(_) => parse_body(body)?,
        _ => return Err(AppError::BadRequest("body must be a JSON array".into())),
    };
    let rows = CrudService::bulk_update(&state.stores, &state.config.defaults, items).await?;
    Ok(success_many("Edit Success!", rows, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AskQuestion;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn filters_accept_column_or_field_names() {
        let params: HashMap<String, String> = [("Tid", "3"), ("eid", "9"), ("Aqremark", "x")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let filters = parse_filters::<AskQuestion>(&params).unwrap();
        assert_eq!(filters, vec![("tid", 3), ("eid", 9)]);
    }

    #[test]
    fn non_numeric_filter_is_rejected() {
        let params: HashMap<String, String> = [("sid".to_string(), "amy".to_string())].into_iter().collect();
        assert!(parse_filters::<AskQuestion>(&params).is_err());
    }
}
