use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, InternalServerErrorResponse, MessageResponse, SuccessResponse,
    UnauthorizedResponse,
};

#[derive(Object, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct TokenPairResponse {
    pub token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub exp: String,
    pub exp_refresh_token: String,
}

#[derive(ApiResponse)]
pub enum LoginResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<TokenPairResponse>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(ApiResponse)]
pub enum RefreshTokenResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<TokenPairResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum LogoutResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct MeRole {
    pub id: String,
    pub name: String,
    pub is_superuser: bool,
}

#[derive(Object, Deserialize, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub email: String,
    pub roles: Vec<MeRole>,
    pub permissions: Vec<String>,
}

#[derive(ApiResponse)]
pub enum MeResponses {
    #[oai(status = 200)]
    Ok(Json<SuccessResponse<MeResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
