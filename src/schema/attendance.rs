use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
    SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct AttendanceDetail {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub clock_in: String,
    pub clock_out: Option<String>,
    pub in_note: Option<String>,
    pub out_note: Option<String>,
}

#[derive(ApiResponse)]
pub enum AttendancePaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<AttendanceDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum AttendanceCheckResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<AttendanceDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PunchInRequest {
    pub in_note: Option<String>,
}

#[derive(ApiResponse)]
pub enum PunchInResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<AttendanceDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 422)]
    UnprocessableEntity(Json<UnprocessableEntityResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PunchOutRequest {
    pub out_note: Option<String>,
}

#[derive(ApiResponse)]
pub enum PunchOutResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<AttendanceDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 422)]
    UnprocessableEntity(Json<UnprocessableEntityResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
