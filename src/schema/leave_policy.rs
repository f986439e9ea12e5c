use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
    SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse, UserBrief,
};

#[derive(Object, Deserialize, Serialize)]
pub struct LeavePolicyTypeBrief {
    pub id: String,
    pub name: String,
    pub is_paid: bool,
}

#[derive(Object, Deserialize, Serialize)]
pub struct LeavePolicyDetail {
    pub id: String,
    pub user_id: String,
    pub user: Option<UserBrief>,
    pub leave_type_id: String,
    pub leave_type: Option<LeavePolicyTypeBrief>,
    pub policy_name: Option<String>,
    pub total_days: i32,
    pub remaining_days: i32,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum LeavePolicyPaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<LeavePolicyDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct LeavePolicyCreateRequest {
    pub user_id: String,
    pub leave_type_id: String,
    pub policy_name: Option<String>,
    pub total_days: i32,
    pub remaining_days: Option<i32>,
}

#[derive(ApiResponse)]
pub enum LeavePolicyCreateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeavePolicyDetail>>),

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
pub enum LeavePolicyDetailResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeavePolicyDetail>>),

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
pub struct LeavePolicyUpdateRequest {
    pub policy_name: Option<String>,
    pub total_days: i32,
    pub remaining_days: Option<i32>,
}

#[derive(ApiResponse)]
pub enum LeavePolicyUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeavePolicyDetail>>),

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
pub enum LeavePolicyDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<LeavePolicyDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
