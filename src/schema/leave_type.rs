use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
    SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct LeaveTypeDetail {
    pub id: String,
    pub name: String,
    pub is_paid: bool,
    pub description: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeaveTypePaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<LeaveTypeDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct LeaveTypeCreateRequest {
    pub name: String,
    pub is_paid: bool,
    pub description: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeaveTypeCreateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveTypeDetail>>),

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
pub enum LeaveTypeDetailResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveTypeDetail>>),

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
pub struct LeaveTypeUpdateRequest {
    pub name: String,
    pub is_paid: bool,
    pub description: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeaveTypeUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveTypeDetail>>),

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
pub enum LeaveTypeDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveTypeDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
