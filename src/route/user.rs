use std::collections::HashMap;
use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        authorize::RequiredCapabilities,
        security::{get_user_from_token, hash_password, BearerAuthorization},
        utils::datetime_to_string_opt,
    },
    model::user::User,
    repository::{
        role::{count_roles_by_ids, get_permission_grant, get_roles_by_user},
        user::{
            attach_roles, create_user, get_user_by_email, get_user_by_id, paginate_user,
            soft_delete_user, sync_roles, update_user,
        },
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateData, SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
        },
        user::{
            UserCreateRequest, UserCreateResponses, UserDeleteResponses, UserDetail,
            UserDetailResponses, UserPaginateResponses, UserRoleBrief, UserUpdateRequest,
            UserUpdateResponses,
        },
    },
    AppState,
};

const USER_VIEW: RequiredCapabilities = RequiredCapabilities::all(&["users.view"]);
const USER_CREATE: RequiredCapabilities = RequiredCapabilities::all(&["users.create"]);
const USER_UPDATE: RequiredCapabilities = RequiredCapabilities::all(&["users.update"]);
const USER_DELETE: RequiredCapabilities = RequiredCapabilities::all(&["users.delete"]);

async fn user_detail(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<UserDetail> {
    let roles = get_roles_by_user(tx, &user.id).await?;
    Ok(UserDetail {
        id: user.id.to_string(),
        first_name: user.first_name.clone(),
        middle_name: user.middle_name.clone(),
        last_name: user.last_name.clone(),
        phone: user.phone.clone(),
        avatar: user.avatar.clone(),
        email: user.email.clone(),
        roles: roles
            .iter()
            .map(|val| UserRoleBrief {
                id: val.id.to_string(),
                name: val.name.clone(),
            })
            .collect(),
        created_date: datetime_to_string_opt(user.created_date),
        updated_date: datetime_to_string_opt(user.updated_date),
    })
}

fn validate_user_fields(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: Option<&str>,
) -> HashMap<String, Vec<String>> {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    if first_name.trim().is_empty() {
        errors.insert(
            "first_name".to_string(),
            vec!["must not be empty".to_string()],
        );
    }
    if last_name.trim().is_empty() {
        errors.insert(
            "last_name".to_string(),
            vec!["must not be empty".to_string()],
        );
    }
    if !email.contains('@') {
        errors.insert(
            "email".to_string(),
            vec!["must be a valid email address".to_string()],
        );
    }
    if let Some(password) = password {
        if password.chars().count() < 8 {
            errors.insert(
                "password".to_string(),
                vec!["must be at least 8 characters".to_string()],
            );
        }
    }
    errors
}

fn parse_role_ids(roles: &[String]) -> Result<Vec<Uuid>, HashMap<String, Vec<String>>> {
    let mut ids: Vec<Uuid> = vec![];
    for value in roles {
        match Uuid::parse_str(value) {
            Ok(val) => ids.push(val),
            Err(_) => {
                let mut errors = HashMap::new();
                errors.insert("roles".to_string(), vec!["must be a list of uuid".to_string()]);
                return Err(errors);
            }
        }
    }
    Ok(ids)
}

#[derive(Tags)]
enum ApiUserTags {
    User,
}

pub struct ApiUser;

#[OpenApi]
impl ApiUser {
    #[oai(path = "/users", method = "get", tag = "ApiUserTags::User")]
    async fn paginate_user_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserPaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
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
                return UserPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
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
                    return UserPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserPaginateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return UserPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&USER_VIEW) {
            return UserPaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        // The requesting account is not part of its own listing
        let (data, counts) =
            match paginate_user(&mut tx, page, limit, Some(&request_user.id)).await {
                Ok(val) => val,
                Err(err) => {
                    return UserPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "paginate_user",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let mut rows: Vec<UserDetail> = vec![];
        for item in data {
            let detail = match user_detail(&mut tx, &item).await {
                Ok(val) => val,
                Err(err) => {
                    return UserPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "load user roles",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            rows.push(detail);
        }

        UserPaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all users",
            PaginateData::new(page, limit, counts, rows),
        )))
    }

    #[oai(path = "/users", method = "post", tag = "ApiUserTags::User")]
    async fn create_user_api(
        &self,
        Json(json): Json<UserCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
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
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
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
                    return UserCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "create_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&USER_CREATE) {
            return UserCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let mut errors = validate_user_fields(
            &json.first_name,
            &json.last_name,
            &json.email,
            Some(&json.password),
        );
        let role_ids = match parse_role_ids(&json.roles) {
            Ok(val) => val,
            Err(parse_errors) => {
                errors.extend(parse_errors);
                vec![]
            }
        };
        if !errors.is_empty() {
            return UserCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        let roles_found = match count_roles_by_ids(&mut tx, &role_ids).await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "count roles",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if roles_found as usize != role_ids.len() {
            return UserCreateResponses::BadRequest(Json(BadRequestResponse::new("Invalid roles")));
        }

        // Unique email
        match get_user_by_email(&mut tx, &json.email).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                let mut errors = HashMap::new();
                errors.insert(
                    "email".to_string(),
                    vec!["has already been taken".to_string()],
                );
                return UserCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "check existing email",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let password_hash = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "hash password",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let new_user = match create_user(
            &mut tx,
            None,
            json.first_name,
            json.middle_name,
            json.last_name,
            json.phone,
            json.avatar,
            json.email,
            password_hash,
            Some(request_user.id),
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "create_user",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = attach_roles(&mut tx, &new_user.id, &role_ids).await {
            return UserCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "create_user_api",
                    "attach_roles",
                    &err.to_string(),
                ),
            ));
        }

        let detail = match user_detail(&mut tx, &new_user).await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "load user roles",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return UserCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "create_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserCreateResponses::Ok(Json(SuccessResponse::new(
            "User created successfully",
            detail,
        )))
    }

    #[oai(path = "/users/:id", method = "get", tag = "ApiUserTags::User")]
    async fn get_detail_user_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
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
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
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
                    return UserDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "get_detail_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&USER_VIEW) {
            return UserDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return UserDetailResponses::NotFound(Json(NotFoundResponse::new("User not found")))
            }
        };
        let user = match get_user_by_id(&mut tx, &id, None).await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let user = match user {
            Some(val) => val,
            None => {
                return UserDetailResponses::NotFound(Json(NotFoundResponse::new("User not found")))
            }
        };
        let detail = match user_detail(&mut tx, &user).await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
                        "load user roles",
                        &err.to_string(),
                    ),
                ))
            }
        };
        UserDetailResponses::Ok(Json(SuccessResponse::new("Fetch one user", detail)))
    }

    #[oai(path = "/users/:id", method = "put", tag = "ApiUserTags::User")]
    async fn update_user_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<UserUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
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
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
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
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&USER_UPDATE) {
            return UserUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse::new("User not found")))
            }
        };
        let user = match get_user_by_id(&mut tx, &id, None).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut user = match user {
            Some(val) => val,
            None => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse::new("User not found")))
            }
        };

        // Validate payload
        let mut errors = validate_user_fields(
            &json.first_name,
            &json.last_name,
            &json.email,
            json.password.as_deref().filter(|val| !val.trim().is_empty()),
        );
        let role_ids = match &json.roles {
            Some(roles) => match parse_role_ids(roles) {
                Ok(val) => Some(val),
                Err(parse_errors) => {
                    errors.extend(parse_errors);
                    None
                }
            },
            None => None,
        };
        if !errors.is_empty() {
            return UserUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        if let Some(role_ids) = &role_ids {
            let roles_found = match count_roles_by_ids(&mut tx, role_ids).await {
                Ok(val) => val,
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "count roles",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if roles_found as usize != role_ids.len() {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid roles",
                )));
            }
        }

        // Unique email, ignoring this user
        match get_user_by_email(&mut tx, &json.email).await {
            Ok(Some(existing)) if existing.id != user.id => {
                let mut errors = HashMap::new();
                errors.insert(
                    "email".to_string(),
                    vec!["has already been taken".to_string()],
                );
                return UserUpdateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Ok(_) => {}
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "check existing email",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let password_hash = match json
            .password
            .as_deref()
            .filter(|val| !val.trim().is_empty())
        {
            Some(password) => match hash_password(password) {
                Ok(val) => Some(val),
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "hash password",
                            &err.to_string(),
                        ),
                    ))
                }
            },
            None => None,
        };

        if let Err(err) = update_user(
            &mut tx,
            &mut user,
            json.first_name,
            json.middle_name,
            json.last_name,
            json.phone,
            json.avatar,
            json.email,
            password_hash,
            &request_user,
            None,
        )
        .await
        {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_api",
                    "update_user",
                    &err.to_string(),
                ),
            ));
        }
        if let Some(role_ids) = &role_ids {
            if let Err(err) = sync_roles(&mut tx, &user.id, role_ids).await {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "sync_roles",
                        &err.to_string(),
                    ),
                ));
            }
        }

        let detail = match user_detail(&mut tx, &user).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "load user roles",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserUpdateResponses::Ok(Json(SuccessResponse::new(
            "User updated successfully",
            detail,
        )))
    }

    #[oai(path = "/users/:id", method = "delete", tag = "ApiUserTags::User")]
    async fn delete_user_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
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
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
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
                    return UserDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "delete_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&USER_DELETE) {
            return UserDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return UserDeleteResponses::NotFound(Json(NotFoundResponse::new("User not found")))
            }
        };
        let user = match get_user_by_id(&mut tx, &id, None).await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut user = match user {
            Some(val) => val,
            None => {
                return UserDeleteResponses::NotFound(Json(NotFoundResponse::new("User not found")))
            }
        };

        if let Err(err) = soft_delete_user(&mut tx, &mut user, &request_user, None).await {
            return UserDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "delete_user_api",
                    "soft_delete_user",
                    &err.to_string(),
                ),
            ));
        }

        let detail = match user_detail(&mut tx, &user).await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "load user roles",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return UserDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "delete_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserDeleteResponses::Ok(Json(SuccessResponse::new(
            "User deleted successfully",
            detail,
        )))
    }
}
