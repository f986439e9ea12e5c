use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateData, SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct HolidayDetail {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub status: bool,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum HolidayPaginateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<PaginateData<HolidayDetail>>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct HolidayCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub status: Option<bool>,
}

#[derive(ApiResponse)]
pub enum HolidayCreateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<HolidayDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

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
pub enum HolidayDetailResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<HolidayDetail>>),

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
pub struct HolidayUpdateRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub status: Option<bool>,
}

#[derive(ApiResponse)]
pub enum HolidayUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<HolidayDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

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
pub enum HolidayDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<HolidayDetail>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
