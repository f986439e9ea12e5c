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
        utils::{date_to_string, datetime_to_string_opt, inclusive_day_count, parse_date},
    },
    model::leave::{Leave, LeaveStatus},
    repository::{
        leave::{
            create_leave, delete_leave, get_leave_by_id, paginate_leave, set_leave_status,
            update_leave,
        },
        leave_policy::{
            get_policy_by_user_and_type, get_policy_by_user_and_type_for_update, reserve_days,
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
        leave::{
            LeaveCreateRequest, LeaveCreateResponses, LeaveDecideAction, LeaveDecideRequest,
            LeaveDecideResponses, LeaveDeleteResponses, LeaveDetail, LeaveDetailResponses,
            LeavePaginateResponses, LeaveUpdateRequest, LeaveUpdateResponses,
        },
    },
    AppState,
};

const LEAVE_VIEW: RequiredCapabilities = RequiredCapabilities::any(&["leaves.view", "leaves.decide"]);
const LEAVE_CREATE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.create"]);
const LEAVE_UPDATE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.update"]);
const LEAVE_DECIDE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.decide"]);
const LEAVE_DELETE: RequiredCapabilities = RequiredCapabilities::all(&["leaves.delete"]);

async fn leave_detail(
    tx: &mut Transaction<'_, Postgres>,
    leave: &Leave,
) -> anyhow::Result<LeaveDetail> {
    let user = get_user_by_id(tx, &leave.user_id, Some(false)).await?;
    let mut approver: Option<UserBrief> = None;
    if let Some(approved_by) = leave.approved_by {
        approver = get_user_by_id(tx, &approved_by, Some(false))
            .await?
            .map(|val| UserBrief {
                id: val.id.to_string(),
                name: val.full_name(),
                email: val.email,
            });
    }
    Ok(LeaveDetail {
        id: leave.id.to_string(),
        user_id: leave.user_id.to_string(),
        user: user.map(|val| UserBrief {
            id: val.id.to_string(),
            name: val.full_name(),
            email: val.email,
        }),
        leave_type_id: leave.leave_type_id.to_string(),
        from_date: date_to_string(leave.from_date),
        to_date: date_to_string(leave.to_date),
        total_days: leave.total_days,
        reason: leave.reason.clone(),
        status: leave.status.clone(),
        approved_by: leave.approved_by.map(|val| val.to_string()),
        approver,
        created_date: datetime_to_string_opt(leave.created_date),
        updated_date: datetime_to_string_opt(leave.updated_date),
    })
}

#[derive(Tags)]
enum ApiLeaveTags {
    Leave,
}

pub struct ApiLeave;

#[OpenApi]
impl ApiLeave {
    #[oai(path = "/leaves", method = "get", tag = "ApiLeaveTags::Leave")]
    async fn paginate_leave_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        Query(user_id): Query<Option<String>>,
        Query(status): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeavePaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeavePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "paginate_leave_api",
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
                return LeavePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "paginate_leave_api",
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
                    return LeavePaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "paginate_leave_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeavePaginateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "paginate_leave_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_VIEW) {
            return LeavePaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        let user_id = user_id.and_then(|val| Uuid::parse_str(&val).ok());
        let status = status
            .and_then(|val| LeaveStatus::parse(&val))
            .map(|val| val.as_str().to_string());
        let (data, counts) = match paginate_leave(&mut tx, page, limit, user_id, status).await {
            Ok(val) => val,
            Err(err) => {
                return LeavePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "paginate_leave_api",
                        "paginate_leave",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let mut rows: Vec<LeaveDetail> = vec![];
        for item in data {
            let detail = match leave_detail(&mut tx, &item).await {
                Ok(val) => val,
                Err(err) => {
                    return LeavePaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "paginate_leave_api",
                            "load leave relations",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            rows.push(detail);
        }

        LeavePaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all leaves",
            PaginateData::new(page, limit, counts, rows),
        )))
    }

    #[oai(path = "/leaves", method = "post", tag = "ApiLeaveTags::Leave")]
    async fn create_leave_api(
        &self,
        Json(json): Json<LeaveCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
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
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
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
                    return LeaveCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "create_leave_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_CREATE) {
            return LeaveCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
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
        let from_date = parse_date(&json.from_date);
        if from_date.is_none() {
            errors.insert(
                "from_date".to_string(),
                vec!["must be a date in YYYY-MM-DD format".to_string()],
            );
        }
        let to_date = parse_date(&json.to_date);
        if to_date.is_none() {
            errors.insert(
                "to_date".to_string(),
                vec!["must be a date in YYYY-MM-DD format".to_string()],
            );
        }
        if let (Some(from), Some(to)) = (from_date, to_date) {
            if to < from {
                errors.insert(
                    "to_date".to_string(),
                    vec!["must be on or after from_date".to_string()],
                );
            }
        }
        if let Some(reason) = &json.reason {
            if reason.chars().count() > 255 {
                errors.insert(
                    "reason".to_string(),
                    vec!["must not exceed 255 characters".to_string()],
                );
            }
        }
        if !errors.is_empty() {
            return LeaveCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }
        let (user_id, leave_type_id) = (user_id.unwrap(), leave_type_id.unwrap());
        let (from_date, to_date) = (from_date.unwrap(), to_date.unwrap());

        // Referenced rows must exist
        match get_user_by_id(&mut tx, &user_id, None).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let mut errors = HashMap::new();
                errors.insert("user_id".to_string(), vec!["user does not exist".to_string()]);
                return LeaveCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
                        "get leave user",
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
                return LeaveCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
                        "get leave type",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let total_days = inclusive_day_count(from_date, to_date);

        // Feasibility only. The reservation happens at decide time, so two
        // concurrent creates may both pass this check against the same
        // balance.
        let policy = match get_policy_by_user_and_type(&mut tx, &user_id, &leave_type_id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
                        "get leave policy",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let policy = match policy {
            Some(val) => val,
            None => {
                return LeaveCreateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::new("No policy set for this leave type"),
                ))
            }
        };
        if policy.remaining_days < total_days {
            return LeaveCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new("Insufficient remaining days"),
            ));
        }

        let new_leave = match create_leave(
            &mut tx,
            None,
            user_id,
            leave_type_id,
            from_date,
            to_date,
            total_days,
            json.reason,
            &request_user,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
                        "create_leave",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let detail = match leave_detail(&mut tx, &new_leave).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "create_leave_api",
                        "load leave relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return LeaveCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "create_leave_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveCreateResponses::Ok(Json(SuccessResponse::new(
            "Leave created successfully",
            detail,
        )))
    }

    #[oai(path = "/leaves/:id", method = "get", tag = "ApiLeaveTags::Leave")]
    async fn get_detail_leave_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "get_detail_leave_api",
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
                return LeaveDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "get_detail_leave_api",
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
                    return LeaveDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "get_detail_leave_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "get_detail_leave_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_VIEW) {
            return LeaveDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        let leave = match get_leave_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "get_detail_leave_api",
                        "get_leave_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let leave = match leave {
            Some(val) => val,
            None => {
                return LeaveDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        let detail = match leave_detail(&mut tx, &leave).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "get_detail_leave_api",
                        "load leave relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        LeaveDetailResponses::Ok(Json(SuccessResponse::new("Fetch one leave", detail)))
    }

    #[oai(path = "/leaves/:id", method = "put", tag = "ApiLeaveTags::Leave")]
    async fn update_leave_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<LeaveUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "update_leave_api",
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
                return LeaveUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "update_leave_api",
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
                    return LeaveUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "update_leave_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "update_leave_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_UPDATE) {
            return LeaveUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        let leave = match get_leave_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "update_leave_api",
                        "get_leave_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut leave = match leave {
            Some(val) => val,
            None => {
                return LeaveUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        if !leave.is_pending() {
            return LeaveUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new("Only pending leaves can be edited"),
            ));
        }

        // Validate payload
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();
        let leave_type_id = Uuid::parse_str(&json.leave_type_id).ok();
        if leave_type_id.is_none() {
            errors.insert(
                "leave_type_id".to_string(),
                vec!["must be a uuid".to_string()],
            );
        }
        let from_date = parse_date(&json.from_date);
        if from_date.is_none() {
            errors.insert(
                "from_date".to_string(),
                vec!["must be a date in YYYY-MM-DD format".to_string()],
            );
        }
        let to_date = parse_date(&json.to_date);
        if to_date.is_none() {
            errors.insert(
                "to_date".to_string(),
                vec!["must be a date in YYYY-MM-DD format".to_string()],
            );
        }
        if let (Some(from), Some(to)) = (from_date, to_date) {
            if to < from {
                errors.insert(
                    "to_date".to_string(),
                    vec!["must be on or after from_date".to_string()],
                );
            }
        }
        if let Some(reason) = &json.reason {
            if reason.chars().count() > 255 {
                errors.insert(
                    "reason".to_string(),
                    vec!["must not exceed 255 characters".to_string()],
                );
            }
        }
        if !errors.is_empty() {
            return LeaveUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }
        let leave_type_id = leave_type_id.unwrap();
        let (from_date, to_date) = (from_date.unwrap(), to_date.unwrap());

        match get_leave_type_by_id(&mut tx, &leave_type_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let mut errors = HashMap::new();
                errors.insert(
                    "leave_type_id".to_string(),
                    vec!["leave type does not exist".to_string()],
                );
                return LeaveUpdateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::validation(errors),
                ));
            }
            Err(err) => {
                return LeaveUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "update_leave_api",
                        "get leave type",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let total_days = inclusive_day_count(from_date, to_date);

        // A grown range must still fit the remaining balance, same check as
        // create.
        let policy =
            match get_policy_by_user_and_type(&mut tx, &leave.user_id, &leave_type_id).await {
                Ok(val) => val,
                Err(err) => {
                    return LeaveUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "update_leave_api",
                            "get leave policy",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let policy = match policy {
            Some(val) => val,
            None => {
                return LeaveUpdateResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::new("No policy set for this leave type"),
                ))
            }
        };
        if policy.remaining_days < total_days {
            return LeaveUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new("Insufficient remaining days"),
            ));
        }

        if let Err(err) = update_leave(
            &mut tx,
            &mut leave,
            leave_type_id,
            from_date,
            to_date,
            total_days,
            json.reason,
            &request_user,
            None,
        )
        .await
        {
            return LeaveUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "update_leave_api",
                    "update_leave",
                    &err.to_string(),
                ),
            ));
        }

        let detail = match leave_detail(&mut tx, &leave).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "update_leave_api",
                        "load leave relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return LeaveUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "update_leave_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveUpdateResponses::Ok(Json(SuccessResponse::new(
            "Leave updated successfully",
            detail,
        )))
    }

    #[oai(path = "/leaves/:id/decide", method = "post", tag = "ApiLeaveTags::Leave")]
    async fn decide_leave_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<LeaveDecideRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveDecideResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
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
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
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
                    return LeaveDecideResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "decide_leave_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveDecideResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_DECIDE) {
            return LeaveDecideResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveDecideResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        let leave = match get_leave_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
                        "get_leave_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut leave = match leave {
            Some(val) => val,
            None => {
                return LeaveDecideResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        if !leave.is_pending() {
            return LeaveDecideResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new("Already decided"),
            ));
        }

        if json.action == LeaveDecideAction::Rejected {
            if let Err(err) =
                set_leave_status(&mut tx, &mut leave, LeaveStatus::Rejected, &request_user, None)
                    .await
            {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
                        "set_leave_status",
                        &err.to_string(),
                    ),
                ));
            }
            let detail = match leave_detail(&mut tx, &leave).await {
                Ok(val) => val,
                Err(err) => {
                    return LeaveDecideResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "decide_leave_api",
                            "load leave relations",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if let Err(err) = tx.commit().await {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
                        "commit transaction",
                        &err.to_string(),
                    ),
                ));
            }
            return LeaveDecideResponses::Ok(Json(SuccessResponse::new("Leave rejected", detail)));
        }

        // Approval: lock the policy row, then the conditional decrement and
        // the status transition commit together or not at all.
        let policy = match get_policy_by_user_and_type_for_update(
            &mut tx,
            &leave.user_id,
            &leave.leave_type_id,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
                        "lock leave policy",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut policy = match policy {
            Some(val) => val,
            None => {
                return LeaveDecideResponses::UnprocessableEntity(Json(
                    UnprocessableEntityResponse::new("Insufficient remaining days at approval time"),
                ))
            }
        };
        let reserved =
            match reserve_days(&mut tx, &mut policy, leave.total_days, &request_user, None).await {
                Ok(val) => val,
                Err(err) => {
                    return LeaveDecideResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "decide_leave_api",
                            "reserve_days",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if !reserved {
            return LeaveDecideResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new("Insufficient remaining days at approval time"),
            ));
        }
        if let Err(err) =
            set_leave_status(&mut tx, &mut leave, LeaveStatus::Approved, &request_user, None).await
        {
            return LeaveDecideResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "decide_leave_api",
                    "set_leave_status",
                    &err.to_string(),
                ),
            ));
        }
        let detail = match leave_detail(&mut tx, &leave).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDecideResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "decide_leave_api",
                        "load leave relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return LeaveDecideResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "decide_leave_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveDecideResponses::Ok(Json(SuccessResponse::new("Leave approved", detail)))
    }

    #[oai(path = "/leaves/:id", method = "delete", tag = "ApiLeaveTags::Leave")]
    async fn delete_leave_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LeaveDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "delete_leave_api",
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
                return LeaveDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "delete_leave_api",
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
                    return LeaveDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.leave",
                            "delete_leave_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return LeaveDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "delete_leave_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&LEAVE_DELETE) {
            return LeaveDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return LeaveDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        let leave = match get_leave_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "delete_leave_api",
                        "get_leave_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let leave = match leave {
            Some(val) => val,
            None => {
                return LeaveDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Leave not found",
                )))
            }
        };
        // An approved leave already drew down the ledger.
        if leave.status == LeaveStatus::Approved.as_str() {
            return LeaveDeleteResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::new("Cannot delete approved leave"),
            ));
        }

        let detail = match leave_detail(&mut tx, &leave).await {
            Ok(val) => val,
            Err(err) => {
                return LeaveDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.leave",
                        "delete_leave_api",
                        "load leave relations",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = delete_leave(&mut tx, &leave).await {
            return LeaveDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "delete_leave_api",
                    "delete_leave",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return LeaveDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.leave",
                    "delete_leave_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        LeaveDeleteResponses::Ok(Json(SuccessResponse::new(
            "Leave deleted successfully",
            detail,
        )))
    }
}
