use std::collections::HashMap;
use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        authorize::RequiredCapabilities,
        security::{get_user_from_token, BearerAuthorization},
        utils::datetime_to_string_opt,
    },
    model::role::Role,
    repository::{
        permission::count_permissions_by_ids,
        role::{
            attach_permissions, count_users_by_role, create_role, delete_role,
            get_permission_grant, get_permissions_by_role, get_role_by_id, paginate_role,
            sync_permissions, update_role,
        },
    },
    schema::{
        common::{
            ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
            SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
        },
        role::{
            RoleCreateRequest, RoleCreateResponses, RoleDeleteResponses, RoleDetail,
            RoleDetailResponses, RolePaginateResponses, RolePermissionBrief, RoleUpdateRequest,
            RoleUpdateResponses,
        },
    },
    AppState,
};

const ROLE_VIEW: RequiredCapabilities = RequiredCapabilities::all(&["roles.view"]);
const ROLE_CREATE: RequiredCapabilities = RequiredCapabilities::all(&["roles.create"]);
const ROLE_UPDATE: RequiredCapabilities = RequiredCapabilities::all(&["roles.update"]);
const ROLE_DELETE: RequiredCapabilities = RequiredCapabilities::all(&["roles.delete"]);

async fn role_detail(tx: &mut Transaction<'_, Postgres>, role: &Role) -> anyhow::Result<RoleDetail> {
    let permissions = get_permissions_by_role(tx, &role.id).await?;
    Ok(RoleDetail {
        id: role.id.to_string(),
        name: role.name.clone(),
        description: role.description.clone(),
        is_superuser: role.is_superuser,
        permissions: permissions
            .iter()
            .map(|val| RolePermissionBrief {
                id: val.id.to_string(),
                code: val.code.clone(),
            })
            .collect(),
        created_date: datetime_to_string_opt(role.created_date),
        updated_date: datetime_to_string_opt(role.updated_date),
    })
}

fn parse_permission_ids(
    permissions: &Option<Vec<String>>,
) -> Result<Vec<Uuid>, HashMap<String, Vec<String>>> {
    let mut ids: Vec<Uuid> = vec![];
    if let Some(values) = permissions {
        for value in values {
            match Uuid::parse_str(value) {
                Ok(val) => ids.push(val),
                Err(_) => {
                    let mut errors = HashMap::new();
                    errors.insert(
                        "permissions".to_string(),
                        vec!["must be a list of uuid".to_string()],
                    );
                    return Err(errors);
                }
            }
        }
    }
    Ok(ids)
}

#[derive(Tags)]
enum ApiRoleTags {
    Role,
}

pub struct ApiRole;

#[OpenApi]
impl ApiRole {
    #[oai(path = "/roles", method = "get", tag = "ApiRoleTags::Role")]
    async fn paginate_role_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RolePaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RolePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
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
                return RolePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
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
                    return RolePaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "paginate_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RolePaginateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return RolePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&ROLE_VIEW) {
            return RolePaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        let (data, counts) = match paginate_role(&mut tx, page, limit).await {
            Ok(val) => val,
            Err(err) => {
                return RolePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
                        "paginate_role",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let mut rows: Vec<RoleDetail> = vec![];
        for item in data {
            let detail = match role_detail(&mut tx, &item).await {
                Ok(val) => val,
                Err(err) => {
                    return RolePaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "paginate_role_api",
                            "load role permissions",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            rows.push(detail);
        }

        RolePaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all roles",
            PaginateData::new(page, limit, counts, rows),
        )))
    }

    #[oai(path = "/roles", method = "post", tag = "ApiRoleTags::Role")]
    async fn create_role_api(
        &self,
        Json(json): Json<RoleCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
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
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
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
                    return RoleCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "create_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&ROLE_CREATE) {
            return RoleCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();
        if json.name.trim().is_empty() {
            errors.insert("name".to_string(), vec!["must not be empty".to_string()]);
        }
        if json.name.chars().count() > 100 {
            errors.insert(
                "name".to_string(),
                vec!["must not exceed 100 characters".to_string()],
            );
        }
        let permission_ids = match parse_permission_ids(&json.permissions) {
            Ok(val) => val,
            Err(parse_errors) => {
                errors.extend(parse_errors);
                vec![]
            }
        };
        if !errors.is_empty() {
            return RoleCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        // Attached permissions must exist
        if !permission_ids.is_empty() {
            let found = match count_permissions_by_ids(&mut tx, &permission_ids).await {
                Ok(val) => val,
                Err(err) => {
                    return RoleCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "create_role_api",
                            "count permissions",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if found as usize != permission_ids.len() {
                let mut errors = HashMap::new();
                errors.insert(
                    "permissions".to_string(),
                    vec!["contains an unknown permission".to_string()],
                );
                return RoleCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
        }

        let new_role = match create_role(
            &mut tx,
            None,
            json.name,
            json.description,
            json.is_superuser.unwrap_or(false),
            &request_user,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "create_role",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !permission_ids.is_empty() {
            if let Err(err) = attach_permissions(&mut tx, &new_role.id, &permission_ids).await {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "attach_permissions",
                        &err.to_string(),
                    ),
                ));
            }
        }

        let detail = match role_detail(&mut tx, &new_role).await {
            Ok(val) => val,
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "load role permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return RoleCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "create_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleCreateResponses::Ok(Json(SuccessResponse::new(
            "Role created successfully",
            detail,
        )))
    }

    #[oai(path = "/roles/:id", method = "get", tag = "ApiRoleTags::Role")]
    async fn get_detail_role_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
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
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
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
                    return RoleDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "get_detail_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&ROLE_VIEW) {
            return RoleDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return RoleDetailResponses::NotFound(Json(NotFoundResponse::new("Role not found")))
            }
        };
        let role = match get_role_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let role = match role {
            Some(val) => val,
            None => {
                return RoleDetailResponses::NotFound(Json(NotFoundResponse::new("Role not found")))
            }
        };
        let detail = match role_detail(&mut tx, &role).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
                        "load role permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };
        RoleDetailResponses::Ok(Json(SuccessResponse::new("Fetch one role", detail)))
    }

    #[oai(path = "/roles/:id", method = "put", tag = "ApiRoleTags::Role")]
    async fn update_role_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<RoleUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
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
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
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
                    return RoleUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "update_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&ROLE_UPDATE) {
            return RoleUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return RoleUpdateResponses::NotFound(Json(NotFoundResponse::new("Role not found")))
            }
        };
        let role = match get_role_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut role = match role {
            Some(val) => val,
            None => {
                return RoleUpdateResponses::NotFound(Json(NotFoundResponse::new("Role not found")))
            }
        };

        let permission_ids = match parse_permission_ids(&json.permissions) {
            Ok(val) => val,
            Err(errors) => {
                return RoleUpdateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ))
            }
        };
        if !permission_ids.is_empty() {
            let found = match count_permissions_by_ids(&mut tx, &permission_ids).await {
                Ok(val) => val,
                Err(err) => {
                    return RoleUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "update_role_api",
                            "count permissions",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if found as usize != permission_ids.len() {
                let mut errors = HashMap::new();
                errors.insert(
                    "permissions".to_string(),
                    vec!["contains an unknown permission".to_string()],
                );
                return RoleUpdateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
        }

        let description = match &json.description {
            Some(val) => Some(val.clone()),
            None => role.description.clone(),
        };
        if let Err(err) = update_role(&mut tx, &mut role, description, &request_user, None).await {
            return RoleUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "update_role_api",
                    "update_role",
                    &err.to_string(),
                ),
            ));
        }
        if json.permissions.is_some() {
            if let Err(err) = sync_permissions(&mut tx, &role.id, &permission_ids).await {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "sync_permissions",
                        &err.to_string(),
                    ),
                ));
            }
        }

        let detail = match role_detail(&mut tx, &role).await {
            Ok(val) => val,
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "load role permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return RoleUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "update_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleUpdateResponses::Ok(Json(SuccessResponse::new(
            "Role updated successfully",
            detail,
        )))
    }

    #[oai(path = "/roles/:id", method = "delete", tag = "ApiRoleTags::Role")]
    async fn delete_role_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
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
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
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
                    return RoleDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "delete_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&ROLE_DELETE) {
            return RoleDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return RoleDeleteResponses::NotFound(Json(NotFoundResponse::new("Role not found")))
            }
        };
        let role = match get_role_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let role = match role {
            Some(val) => val,
            None => {
                return RoleDeleteResponses::NotFound(Json(NotFoundResponse::new("Role not found")))
            }
        };

        let assigned = match count_users_by_role(&mut tx, &role.id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "count_users_by_role",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if assigned > 0 {
            return RoleDeleteResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new(
                    format!(
                        "Cannot delete role because it is assigned to {} user(s).",
                        assigned
                    )
                    .as_str(),
                ),
            ));
        }

        let detail = match role_detail(&mut tx, &role).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "load role permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = delete_role(&mut tx, &role).await {
            return RoleDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "delete_role_api",
                    "delete_role",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return RoleDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "delete_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleDeleteResponses::Ok(Json(SuccessResponse::new(
            "Role deleted successfully",
            detail,
        )))
    }
}
