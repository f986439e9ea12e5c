use poem_openapi::{payload::Json, ApiResponse, Enum, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
    SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse, UserBrief,
};

#[derive(Object, Deserialize, Serialize)]
pub struct LeaveDetail {
    pub id: String,
    pub user_id: String,
    pub user: Option<UserBrief>,
    pub leave_type_id: String,
    pub from_date: String,
    pub to_date: String,
    pub total_days: i32,
    pub reason: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
    pub approver: Option<UserBrief>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeavePaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<LeaveDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct LeaveCreateRequest {
    pub user_id: String,
    pub leave_type_id: String,
    pub from_date: String,
    pub to_date: String,
    pub reason: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeaveCreateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveDetail>>),

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
pub enum LeaveDetailResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveDetail>>),

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
pub struct LeaveUpdateRequest {
    pub leave_type_id: String,
    pub from_date: String,
    pub to_date: String,
    pub reason: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeaveUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveDetail>>),

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

#[derive(Enum, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[oai(rename_all = "lowercase")]
pub enum LeaveDecideAction {
    Approved,
    Rejected,
}

#[derive(Object, Deserialize)]
pub struct LeaveDecideRequest {
    pub action: LeaveDecideAction,
}

#[derive(ApiResponse)]
pub enum LeaveDecideResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveDetail>>),

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
pub enum LeaveDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeaveDetail>>),

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
