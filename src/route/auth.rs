use std::sync::Arc;

use chrono::{Duration, Local};
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::{
        authorize::PermissionGrant,
        security::{
            generate_refresh_token_from_user, generate_token_from_user,
            get_user_from_refresh_token, get_user_from_token, verify_hash_password,
            BearerAuthorization,
        },
        session::{add_session, remove_session},
        utils::datetime_to_string,
    },
    repository::{
        permission::PERMISSION_CATALOG,
        role::{get_permission_grant, get_roles_by_user},
        user::get_user_by_email,
    },
    schema::{
        auth::{
            LoginRequest, LoginResponses, LogoutResponses, MeResponse, MeResponses, MeRole,
            RefreshTokenRequest, RefreshTokenResponses, TokenPairResponse,
        },
        common::{
            BadRequestResponse, InternalServerErrorResponse, MessageResponse, SuccessResponse,
            UnauthorizedResponse,
        },
    },
    settings::get_config,
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        // find account by email
        let user = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "check user on database",
                    &err.to_string(),
                )));
            }
        };
        if user.is_none() {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new("Invalid Credentials")));
        }
        let user = user.unwrap();

        // validate user password
        let is_valid = match verify_hash_password(&json.password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "validate user password",
                    &err.to_string(),
                )))
            }
        };
        if !is_valid {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new("Invalid Credentials")));
        }

        let config = get_config();
        let token = match generate_token_from_user(user.clone(), config.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "generate token",
                    &err.to_string(),
                )))
            }
        };
        let refresh_token = match generate_refresh_token_from_user(user.clone(), config.clone())
            .await
        {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "generate refresh token",
                    &err.to_string(),
                )))
            }
        };

        if let Err(err) = add_session(
            &mut redis_conn,
            &user,
            &config,
            token.clone(),
            refresh_token.clone(),
        ) {
            return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_login",
                "add_session to redis",
                &err.to_string(),
            )));
        }

        let now = Local::now().fixed_offset();
        let exp = now + Duration::minutes(config.jwt_exp as i64);
        let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
        LoginResponses::Ok(Json(SuccessResponse::new(
            "Login successful",
            TokenPairResponse {
                token,
                refresh_token,
                token_type: "Bearer".to_string(),
                exp: datetime_to_string(exp),
                exp_refresh_token: datetime_to_string(exp_refresh_token),
            },
        )))
    }

    #[oai(path = "/auth/refresh", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let config = get_config();
        // An expired or malformed refresh token decodes to an error, a
        // non-refresh token to None; both are an unauthorized refresh.
        let user = match get_user_from_refresh_token(
            &mut tx,
            Some(json.refresh_token.clone()),
            config.clone(),
        )
        .await
        {
            Ok(Some(val)) => val,
            Ok(None) | Err(_) => {
                return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
        };

        let token = match generate_token_from_user(user.clone(), config.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "generate token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let refresh_token = match generate_refresh_token_from_user(user.clone(), config.clone())
            .await
        {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "generate refresh token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = add_session(
            &mut redis_conn,
            &user,
            &config,
            token.clone(),
            refresh_token.clone(),
        ) {
            return RefreshTokenResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "add_session to redis",
                    &err.to_string(),
                ),
            ));
        }

        let now = Local::now().fixed_offset();
        let exp = now + Duration::minutes(config.jwt_exp as i64);
        let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
        RefreshTokenResponses::Ok(Json(SuccessResponse::new(
            "Token refreshed",
            TokenPairResponse {
                token,
                refresh_token,
                token_type: "Bearer".to_string(),
                exp: datetime_to_string(exp),
                exp_refresh_token: datetime_to_string(exp_refresh_token),
            },
        )))
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let request_user =
            match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
                Ok(val) => val,
                Err(err) => {
                    return LogoutResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.auth",
                            "auth_logout",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        if let Err(err) = remove_session(&mut redis_conn, jwt_token.unwrap()) {
            return LogoutResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_logout",
                "remove_session from redis",
                &err.to_string(),
            )));
        }
        LogoutResponses::Ok(Json(MessageResponse::new("User logged out successfully")))
    }

    #[oai(path = "/auth/me", method = "get", tag = "ApiAuthTags::Auth")]
    async fn auth_me(&self, state: Data<&Arc<AppState>>, auth: BearerAuthorization) -> MeResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_me",
                    "begin transaction",
                    &err.to_string(),
                )));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_me",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let request_user =
            match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
                Ok(val) => val,
                Err(err) => {
                    return MeResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.auth",
                            "auth_me",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return MeResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        let roles = match get_roles_by_user(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_me",
                    "get_roles_by_user",
                    &err.to_string(),
                )))
            }
        };
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_me",
                    "get permission grant",
                    &err.to_string(),
                )))
            }
        };
        let mut permissions: Vec<String> = match grant {
            PermissionGrant::All => PERMISSION_CATALOG
                .iter()
                .map(|(code, _)| code.to_string())
                .collect(),
            PermissionGrant::Codes(codes) => codes.into_iter().collect(),
        };
        permissions.sort();

        MeResponses::Ok(Json(SuccessResponse::new(
            "Fetch current user",
            MeResponse {
                id: request_user.id.to_string(),
                first_name: request_user.first_name.clone(),
                middle_name: request_user.middle_name.clone(),
                last_name: request_user.last_name.clone(),
                phone: request_user.phone.clone(),
                avatar: request_user.avatar.clone(),
                email: request_user.email.clone(),
                roles: roles
                    .iter()
                    .map(|val| MeRole {
                        id: val.id.to_string(),
                        name: val.name.clone(),
                        is_superuser: val.is_superuser,
                    })
                    .collect(),
                permissions,
            },
        )))
    }
}
