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
    model::leave_policy::LeavePolicy,
    repository::{
        leave_policy::{
            create_leave_policy, delete_leave_policy, get_leave_policy_by_id,
            get_policy_by_user_and_type, paginate_leave_policy, update_leave_policy,
        },
        leave_type::get_leave_type_by_id,
        role::get_permission_grant,
        user::get_user_by_id,
    },
    schema::{
        common::{
            ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
            SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse, UserBrief,
        },
        leave_policy::{
            LeavePolicyCreateRequest, LeavePolicyCreateResponses, LeavePolicyDeleteResponses,
            LeavePolicyDetail, LeavePolicyDetailResponses, LeavePolicyPaginateResponses,
            LeavePolicyTypeBrief, LeavePolicyUpdateRequest, LeavePolicyUpdateResponses,
        },
    },
    AppState,
};

const POLICY_VIEW: RequiredCapabilities = RequiredCapabilities::all(&["leaves.view"]);
const POLICY_CREATE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.create"]);
const POLICY_UPDATE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.update"]);
const POLICY_DELETE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.delete"]);

async fn policy_detail(
    tx: &mut Transaction<'_, Postgres>,
    policy: &LeavePolicy,
) -> anyhow::Result<LeavePolicyDetail> {
    let user = get_user_by_id(tx, &policy.user_id, Some(false)).await?;
    let leave_type = get_leave_type_by_id(tx, &policy.leave_type_id).await?;
    Ok(LeavePolicyDetail {
        id: policy.id.to_string(),
        user_id: policy.user_id.to_string(),
        user: user.map(|val| UserBrief {
            id: val.id.to_string(),
            name: val.full_name(),
            email: val.email,
        }),
        leave_type_id: policy.leave_type_id.to_string(),
        leave_type: leave_type.map(|val| LeavePolicyTypeBrief {
            id: val.id.to_string(),
            name: val.name,
            is_paid: val.is_paid,
        }),
        policy_name: policy.policy_name.clone(),
        total_days: policy.total_days,
        remaining_days: policy.remaining_days,
        created_date: datetime_to_string_opt(policy.created_date),
        updated_date: datetime_to_string_opt(policy.updated_date),
    })
}

#[derive(Tags)]
enum ApiLeavePolicyTags {
    LeavePolicy,
}

pub struct ApiLeavePolicy;

#[OpenApi]
impl ApiLeavePolicy {
    #[oai(
        path = "/leave-policies",
        method = "get",
        tag = "ApiLeavePolicyTags::LeavePolicy"
    )]
    async fn paginate_leave_policy_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeavePolicyPaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "paginate_leave_policy_api",
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
                return LeavePolicyPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "paginate_leave_policy_api",
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
                    return LeavePolicyPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_policy",
                            "paginate_leave_policy_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeavePolicyPaginateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "paginate_leave_policy_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&POLICY_VIEW) {
            return LeavePolicyPaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        let (data, counts) = match paginate_leave_policy(&mut tx, page, limit).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "paginate_leave_policy_api",
                        "paginate_leave_policy",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let mut rows: Vec<LeavePolicyDetail> = vec![];
        for item in data {
            let detail = match policy_detail(&mut tx, &item).await {
                Ok(val) => val,
                Err(err) => {
                    return LeavePolicyPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_policy",
                            "paginate_leave_policy_api",
                            "load policy relations",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            rows.push(detail);
        }

        LeavePolicyPaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all leave policies",
            PaginateData::new(page, limit, counts, rows),
        )))
    }

    #[oai(
        path = "/leave-policies",
        method = "post",
        tag = "ApiLeavePolicyTags::LeavePolicy"
    )]
    async fn create_leave_policy_api(
        &self,
        Json(json): Json<LeavePolicyCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeavePolicyCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
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
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
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
                    return LeavePolicyCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_policy",
                            "create_leave_policy_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeavePolicyCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&POLICY_CREATE) {
            return LeavePolicyCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();
        let user_id = Uuid::parse_str(&json.user_id).ok();
        if user_id.is_none() {
            errors.insert("user_id".to_string(), vec!["must be a uuid".to_string()]);
        }
        let leave_type_id = Uuid::parse_str(&json.leave_type_id).ok();
        if leave_type_id.is_none() {
            errors.insert(
                "leave_type_id".to_string(),
                vec!["must be a uuid".to_string()],
            );
        }
        if json.total_days < 0 {
            errors.insert(
                "total_days".to_string(),
                vec!["must be zero or greater".to_string()],
            );
        }
        if let Some(remaining_days) = json.remaining_days {
            if remaining_days < 0 {
                errors.insert(
                    "remaining_days".to_string(),
                    vec!["must be zero or greater".to_string()],
                );
            }
        }
        if let Some(policy_name) = &json.policy_name {
            if policy_name.chars().count() > 150 {
                errors.insert(
                    "policy_name".to_string(),
                    vec!["must not exceed 150 characters".to_string()],
                );
            }
        }
        if !errors.is_empty() {
            return LeavePolicyCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }
        let (user_id, leave_type_id) = (user_id.unwrap(), leave_type_id.unwrap());

        match get_user_by_id(&mut tx, &user_id, None).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let mut errors = HashMap::new();
                errors.insert("user_id".to_string(), vec!["user does not exist".to_string()]);
                return LeavePolicyCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
                        "get policy user",
                        &err.to_string(),
                    ),
                ))
            }
        }
        match get_leave_type_by_id(&mut tx, &leave_type_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let mut errors = HashMap::new();
                errors.insert(
                    "leave_type_id".to_string(),
                    vec!["leave type does not exist".to_string()],
                );
                return LeavePolicyCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
                        "get leave type",
                        &err.to_string(),
                    ),
                ))
            }
        }

        // One policy per (user, leave type)
        match get_policy_by_user_and_type(&mut tx, &user_id, &leave_type_id).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                return LeavePolicyCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::new(
                        "Policy already exists for this user and leave type",
                    ),
                ))
            }
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
                        "check existing policy",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let remaining_days = json.remaining_days.unwrap_or(json.total_days);
        let new_policy = match create_leave_policy(
            &mut tx,
            None,
            user_id,
            leave_type_id,
            json.policy_name,
            json.total_days,
            remaining_days,
            &request_user,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
                        "create_leave_policy",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let detail = match policy_detail(&mut tx, &new_policy).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "create_leave_policy_api",
                        "load policy relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return LeavePolicyCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_policy",
                    "create_leave_policy_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeavePolicyCreateResponses::Ok(Json(SuccessResponse::new(
            "Leave policy created successfully",
            detail,
        )))
    }

    #[oai(
        path = "/leave-policies/:id",
        method = "get",
        tag = "ApiLeavePolicyTags::LeavePolicy"
    )]
    async fn get_detail_leave_policy_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeavePolicyDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "get_detail_leave_policy_api",
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
                return LeavePolicyDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "get_detail_leave_policy_api",
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
                    return LeavePolicyDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_policy",
                            "get_detail_leave_policy_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeavePolicyDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "get_detail_leave_policy_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&POLICY_VIEW) {
            return LeavePolicyDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeavePolicyDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave policy not found",
                )))
            }
        };
        let policy = match get_leave_policy_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "get_detail_leave_policy_api",
                        "get_leave_policy_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let policy = match policy {
            Some(val) => val,
            None => {
                return LeavePolicyDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave policy not found",
                )))
            }
        };
        let detail = match policy_detail(&mut tx, &policy).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "get_detail_leave_policy_api",
                        "load policy relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        LeavePolicyDetailResponses::Ok(Json(SuccessResponse::new("Fetch one leave policy", detail)))
    }

    #[oai(
        path = "/leave-policies/:id",
        method = "put",
        tag = "ApiLeavePolicyTags::LeavePolicy"
    )]
    async fn update_leave_policy_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<LeavePolicyUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeavePolicyUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "update_leave_policy_api",
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
                return LeavePolicyUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "update_leave_policy_api",
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
                    return LeavePolicyUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_policy",
                            "update_leave_policy_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeavePolicyUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "update_leave_policy_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&POLICY_UPDATE) {
            return LeavePolicyUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();
        if json.total_days < 0 {
            errors.insert(
                "total_days".to_string(),
                vec!["must be zero or greater".to_string()],
            );
        }
        if let Some(remaining_days) = json.remaining_days {
            if remaining_days < 0 {
                errors.insert(
                    "remaining_days".to_string(),
                    vec!["must be zero or greater".to_string()],
                );
            }
        }
        if let Some(policy_name) = &json.policy_name {
            if policy_name.chars().count() > 150 {
                errors.insert(
                    "policy_name".to_string(),
                    vec!["must not exceed 150 characters".to_string()],
                );
            }
        }
        if !errors.is_empty() {
            return LeavePolicyUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeavePolicyUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave policy not found",
                )))
            }
        };
        let policy = match get_leave_policy_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "update_leave_policy_api",
                        "get_leave_policy_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut policy = match policy {
            Some(val) => val,
            None => {
                return LeavePolicyUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave policy not found",
                )))
            }
        };

        // Absent remaining_days resets the balance to the new allotment.
        let remaining_days = json.remaining_days.unwrap_or(json.total_days);
        if let Err(err) = update_leave_policy(
            &mut tx,
            &mut policy,
            json.policy_name,
            json.total_days,
            remaining_days,
            &request_user,
            None,
        )
        .await
        {
            return LeavePolicyUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_policy",
                    "update_leave_policy_api",
                    "update_leave_policy",
                    &err.to_string(),
                ),
            ));
        }

        let detail = match policy_detail(&mut tx, &policy).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "update_leave_policy_api",
                        "load policy relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return LeavePolicyUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_policy",
                    "update_leave_policy_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeavePolicyUpdateResponses::Ok(Json(SuccessResponse::new(
            "Leave policy updated successfully",
            detail,
        )))
    }

    #[oai(
        path = "/leave-policies/:id",
        method = "delete",
        tag = "ApiLeavePolicyTags::LeavePolicy"
    )]
    async fn delete_leave_policy_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeavePolicyDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "delete_leave_policy_api",
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
                return LeavePolicyDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "delete_leave_policy_api",
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
                    return LeavePolicyDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave_policy",
                            "delete_leave_policy_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeavePolicyDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "delete_leave_policy_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&POLICY_DELETE) {
            return LeavePolicyDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeavePolicyDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave policy not found",
                )))
            }
        };
        let policy = match get_leave_policy_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "delete_leave_policy_api",
                        "get_leave_policy_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let policy = match policy {
            Some(val) => val,
            None => {
                return LeavePolicyDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave policy not found",
                )))
            }
        };
        let detail = match policy_detail(&mut tx, &policy).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePolicyDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave_policy",
                        "delete_leave_policy_api",
                        "load policy relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = delete_leave_policy(&mut tx, &policy).await {
            return LeavePolicyDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_policy",
                    "delete_leave_policy_api",
                    "delete_leave_policy",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return LeavePolicyDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave_policy",
                    "delete_leave_policy_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeavePolicyDeleteResponses::Ok(Json(SuccessResponse::new(
            "Leave policy deleted successfully",
            detail,
        )))
    }
}
