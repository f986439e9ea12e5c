use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
    SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct RolePermissionBrief {
    pub id: String,
    pub code: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_superuser: bool,
    pub permissions: Vec<RolePermissionBrief>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum RolePaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<RoleDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RoleCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_superuser: Option<bool>,
    pub permissions: Option<Vec<String>>,
}

#[derive(ApiResponse)]
pub enum RoleCreateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<RoleDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 422)]
    UnprocessableEntity(Json<UnprocessableEntityResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RoleDetailResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<RoleDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RoleUpdateRequest {
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(ApiResponse)]
pub enum RoleUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<RoleDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 422)]
    UnprocessableEntity(Json<UnprocessableEntityResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RoleDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<RoleDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 422)]
    UnprocessableEntity(Json<UnprocessableEntityResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
