use std::collections::HashMap;

use poem_openapi::{
    types::{ParseFromJSON, ToJSON},
    Object,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Success envelope: `{success, message, code, data}`.
#[derive(Object)]
pub struct SuccessResponse<T: ParseFromJSON + ToJSON + Send + Sync> {
    pub success: bool,
    pub message: String,
    pub code: i32,
    pub data: Option<T>,
}

impl<T: ParseFromJSON + ToJSON + Send + Sync> SuccessResponse<T> {
    pub fn new(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            code: 200,
            data: Some(data),
        }
    }
}

/// Success envelope without a data payload.
#[derive(Object, Deserialize, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            code: 200,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct PaginateMeta {
    pub page: u32,
    pub limit: u32,
    pub total_rows: u32,
}

#[derive(Object)]
pub struct PaginateData<T: ParseFromJSON + ToJSON + Send + Sync> {
    pub meta: PaginateMeta,
    pub rows: Vec<T>,
}

impl<T: ParseFromJSON + ToJSON + Send + Sync> PaginateData<T> {
    pub fn new(page: u32, limit: u32, total_rows: u32, rows: Vec<T>) -> Self {
        Self {
            meta: PaginateMeta {
                page,
                limit,
                total_rows,
            },
            rows,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct BadRequestResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
}

impl BadRequestResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            code: 400,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct UnauthorizedResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            success: false,
            message: "Unauthorized".to_string(),
            code: 401,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ForbiddenResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
}

impl Default for ForbiddenResponse {
    fn default() -> Self {
        Self {
            success: false,
            message: "You do not have sufficient privileges to perform this action.".to_string(),
            code: 403,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotFoundResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
}

impl NotFoundResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            code: 404,
        }
    }
}

/// 422 payload for both business-rule violations (message only) and
/// validation failures (field-level errors).
#[derive(Object, Deserialize, Serialize)]
pub struct UnprocessableEntityResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl UnprocessableEntityResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            code: 422,
            errors: None,
        }
    }

    pub fn validation(errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            success: false,
            message: "Validation errors".to_string(),
            code: 422,
            errors: Some(errors),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct InternalServerErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: i32,
}

impl InternalServerErrorResponse {
    /// Logs the failing step with full detail; the client only sees a
    /// sanitized message.
    pub fn new(module: &str, function: &str, step: &str, err: &str) -> Self {
        error!(module, function, step, err, "internal server error");
        Self {
            success: false,
            message: "Internal server error".to_string(),
            code: 500,
        }
    }
}

/// Minimal user embed for detail payloads.
#[derive(Object, Deserialize, Serialize)]
pub struct UserBrief {
    pub id: String,
    pub name: String,
    pub email: String,
}
