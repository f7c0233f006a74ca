//! Standard response envelope: `{ code, msg, data }`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Success.
pub const CODE_OK: i32 = 1;
/// Request succeeded but there is nothing to show (used by lists that call out emptiness).
pub const CODE_EMPTY: i32 = 2;
pub const CODE_ERROR: i32 = -1;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(msg: impl Into<String>, data: T) -> Self {
        Envelope {
            code: CODE_OK,
            msg: msg.into(),
            data: Some(data),
        }
    }

    pub fn empty(msg: impl Into<String>, data: T) -> Self {
        Envelope {
            code: CODE_EMPTY,
            msg: msg.into(),
            data: Some(data),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Envelope {
            code: CODE_ERROR,
            msg: msg.into(),
            data: None,
        }
    }
}

pub fn success<T: Serialize>(msg: &str, data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::ok(msg, data)))
}

/// List envelope; `empty_msg` switches an empty list to `CODE_EMPTY`.
pub fn success_many<T: Serialize>(
    msg: &str,
    data: Vec<T>,
    empty_msg: Option<&str>,
) -> (StatusCode, Json<Envelope<Vec<T>>>) {
    let body = match empty_msg {
        Some(empty) if data.is_empty() => Envelope::empty(empty, data),
        _ => Envelope::ok(msg, data),
    };
    (StatusCode::OK, Json(body))
}
