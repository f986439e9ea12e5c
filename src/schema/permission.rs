use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    ForbiddenResponse, InternalServerErrorResponse, PaginateData, SuccessResponse,
    UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct PermissionDetail {
    pub id: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(ApiResponse)]
pub enum PermissionPaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<PermissionDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
