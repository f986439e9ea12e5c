use std::collections::HashMap;
use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        authorize::RequiredCapabilities,
        security::{get_user_from_token, BearerAuthorization},
        utils::datetime_to_string_opt,
    },
    model::leave_type::LeaveType,
    repository::{
        leave_type::{
            create_leave_type, delete_leave_type, get_leave_type_by_id, get_leave_type_by_name,
            paginate_leave_type, update_leave_type,
        },
        role::get_permission_grant,
    },
    schema::{
        common::{
            ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
            SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
        },
        leave_type::{
            LeaveTypeCreateRequest, LeaveTypeCreateResponses, LeaveTypeDeleteResponses,
            LeaveTypeDetail, LeaveTypeDetailResponses, LeaveTypePaginateResponses,
            LeaveTypeUpdateRequest, LeaveTypeUpdateResponses,
        },
    },
    AppState,
};

const LEAVE_TYPE_VIEW: RequiredCapabilities = RequiredCapabilities::all(&["leaves.view"]);
const LEAVE_TYPE_CREATE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.create"]);
const LEAVE_TYPE_UPDATE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.update"]);
const LEAVE_TYPE_DELETE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.delete"]);

fn leave_type_detail(leave_type: &LeaveType) -> LeaveTypeDetail {
    LeaveTypeDetail {
        id: leave_type.id.to_string(),
        name: leave_type.name.clone(),
        is_paid: leave_type.is_paid,
        description: leave_type.description.clone(),
        created_date: datetime_to_string_opt(leave_type.created_date),
        updated_date: datetime_to_string_opt(leave_type.updated_date),
    }
}

fn validate_leave_type_fields(name: &str, description: &Option<String>) -> HashMap<String, Vec<String>> {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    if name.trim().is_empty() {
        errors.insert("name".to_string(), vec!["must not be empty".to_string()]);
    }
    if name.chars().count() > 100 {
        errors.insert(
            "name".to_string(),
            vec!["must not exceed 100 characters".to_string()],
        );
    }
    if let Some(description) = description {
        if description.chars().count() > 255 {
            errors.insert(
                "description".to_string(),
                vec!["must not exceed 255 characters".to_string()],
            );
        }
    }
    errors
}

#[derive(Tags)]
enum ApiLeaveTypeTags {
    LeaveType,
}

pub struct ApiLeaveType;

#[OpenApi]
impl ApiLeaveType {
    #[oai(
        path = "/leave-types",
        method = "get",
        tag = "ApiLeaveTypeTags::LeaveType"
    )]
    async fn paginate_leave_type_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveTypePaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "paginate_leave_type_api",
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
                return LeaveTypePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "paginate_leave_type_api",
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
                    return LeaveTypePaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_type",
                            "paginate_leave_type_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveTypePaginateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "paginate_leave_type_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_TYPE_VIEW) {
            return LeaveTypePaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        let (data, counts) = match paginate_leave_type(&mut tx, page, limit).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "paginate_leave_type_api",
                        "paginate_leave_type",
                        &err.to_string(),
                    ),
                ))
            }
        };

        LeaveTypePaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all leave types",
            PaginateData::new(
                page,
                limit,
                counts,
                data.iter().map(leave_type_detail).collect(),
            ),
        )))
    }

    #[oai(
        path = "/leave-types",
        method = "post",
        tag = "ApiLeaveTypeTags::LeaveType"
    )]
    async fn create_leave_type_api(
        &self,
        Json(json): Json<LeaveTypeCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveTypeCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "create_leave_type_api",
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
                return LeaveTypeCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "create_leave_type_api",
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
                    return LeaveTypeCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_type",
                            "create_leave_type_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveTypeCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "create_leave_type_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_TYPE_CREATE) {
            return LeaveTypeCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let errors = validate_leave_type_fields(&json.name, &json.description);
        if !errors.is_empty() {
            return LeaveTypeCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        // Unique name
        match get_leave_type_by_name(&mut tx, &json.name).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                let mut errors = HashMap::new();
                errors.insert(
                    "name".to_string(),
                    vec!["has already been taken".to_string()],
                );
                return LeaveTypeCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return LeaveTypeCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "create_leave_type_api",
                        "check existing name",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let new_leave_type = match create_leave_type(
            &mut tx,
            None,
            json.name,
            json.is_paid,
            json.description,
            &request_user,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "create_leave_type_api",
                        "create_leave_type",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return LeaveTypeCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_type",
                    "create_leave_type_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveTypeCreateResponses::Ok(Json(SuccessResponse::new(
            "Leave type created successfully",
            leave_type_detail(&new_leave_type),
        )))
    }

    #[oai(
        path = "/leave-types/:id",
        method = "get",
        tag = "ApiLeaveTypeTags::LeaveType"
    )]
    async fn get_detail_leave_type_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveTypeDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "get_detail_leave_type_api",
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
                return LeaveTypeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "get_detail_leave_type_api",
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
                    return LeaveTypeDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_type",
                            "get_detail_leave_type_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveTypeDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "get_detail_leave_type_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_TYPE_VIEW) {
            return LeaveTypeDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveTypeDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave type not found",
                )))
            }
        };
        let leave_type = match get_leave_type_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "get_detail_leave_type_api",
                        "get_leave_type_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let leave_type = match leave_type {
            Some(val) => val,
            None => {
                return LeaveTypeDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave type not found",
                )))
            }
        };
        LeaveTypeDetailResponses::Ok(Json(SuccessResponse::new(
            "Fetch one leave type",
            leave_type_detail(&leave_type),
        )))
    }

    #[oai(
        path = "/leave-types/:id",
        method = "put",
        tag = "ApiLeaveTypeTags::LeaveType"
    )]
    async fn update_leave_type_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<LeaveTypeUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveTypeUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "update_leave_type_api",
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
                return LeaveTypeUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "update_leave_type_api",
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
                    return LeaveTypeUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_type",
                            "update_leave_type_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveTypeUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "update_leave_type_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_TYPE_UPDATE) {
            return LeaveTypeUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let errors = validate_leave_type_fields(&json.name, &json.description);
        if !errors.is_empty() {
            return LeaveTypeUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveTypeUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave type not found",
                )))
            }
        };
        let leave_type = match get_leave_type_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "update_leave_type_api",
                        "get_leave_type_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut leave_type = match leave_type {
            Some(val) => val,
            None => {
                return LeaveTypeUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave type not found",
                )))
            }
        };

        // Unique name, ignoring this row
        match get_leave_type_by_name(&mut tx, &json.name).await {
            Ok(Some(existing)) if existing.id != leave_type.id => {
                let mut errors = HashMap::new();
                errors.insert(
                    "name".to_string(),
                    vec!["has already been taken".to_string()],
                );
                return LeaveTypeUpdateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Ok(_) => {}
            Err(err) => {
                return LeaveTypeUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "update_leave_type_api",
                        "check existing name",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = update_leave_type(
            &mut tx,
            &mut leave_type,
            json.name,
            json.is_paid,
            json.description,
            &request_user,
            None,
        )
        .await
        {
            return LeaveTypeUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_type",
                    "update_leave_type_api",
                    "update_leave_type",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return LeaveTypeUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_type",
                    "update_leave_type_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveTypeUpdateResponses::Ok(Json(SuccessResponse::new(
            "Leave type updated successfully",
            leave_type_detail(&leave_type),
        )))
    }

    #[oai(
        path = "/leave-types/:id",
        method = "delete",
        tag = "ApiLeaveTypeTags::LeaveType"
    )]
    async fn delete_leave_type_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveTypeDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "delete_leave_type_api",
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
                return LeaveTypeDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "delete_leave_type_api",
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
                    return LeaveTypeDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_type",
                            "delete_leave_type_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveTypeDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "delete_leave_type_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_TYPE_DELETE) {
            return LeaveTypeDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveTypeDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave type not found",
                )))
            }
        };
        let leave_type = match get_leave_type_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveTypeDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_type",
                        "delete_leave_type_api",
                        "get_leave_type_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let leave_type = match leave_type {
            Some(val) => val,
            None => {
                return LeaveTypeDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave type not found",
                )))
            }
        };

        if let Err(err) = delete_leave_type(&mut tx, &leave_type).await {
            return LeaveTypeDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_type",
                    "delete_leave_type_api",
                    "delete_leave_type",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return LeaveTypeDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_type",
                    "delete_leave_type_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveTypeDeleteResponses::Ok(Json(SuccessResponse::new(
            "Leave type deleted successfully",
            leave_type_detail(&leave_type),
        )))
    }
}
