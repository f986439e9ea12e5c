use std::collections::HashMap;
use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        authorize::RequiredCapabilities,
        security::{get_user_from_token, BearerAuthorization},
        utils::{date_to_string, datetime_to_string_opt, parse_date},
    },
    model::holiday::Holiday,
    repository::{
        holiday::{
            create_holiday, delete_holiday, get_active_holiday_by_date, get_holiday_by_id,
            paginate_holiday, update_holiday,
        },
        role::get_permission_grant,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateData, SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
        },
        holiday::{
            HolidayCreateRequest, HolidayCreateResponses, HolidayDeleteResponses, HolidayDetail,
            HolidayDetailResponses, HolidayPaginateResponses, HolidayUpdateRequest,
            HolidayUpdateResponses,
        },
    },
    AppState,
};

const HOLIDAY_VIEW: RequiredCapabilities = RequiredCapabilities::all(&["holidays.view"]);
const HOLIDAY_CREATE: RequiredCapabilities = RequiredCapabilities::all(&["holidays.create"]);
const HOLIDAY_UPDATE: RequiredCapabilities = RequiredCapabilities::all(&["holidays.update"]);
const HOLIDAY_DELETE: RequiredCapabilities = RequiredCapabilities::all(&["holidays.delete"]);

fn holiday_detail(holiday: &Holiday) -> HolidayDetail {
    HolidayDetail {
        id: holiday.id.to_string(),
        title: holiday.title.clone(),
        description: holiday.description.clone(),
        date: date_to_string(holiday.date),
        status: holiday.status,
        created_date: datetime_to_string_opt(holiday.created_date),
        updated_date: datetime_to_string_opt(holiday.updated_date),
    }
}

fn validate_holiday_fields(
    title: &str,
    description: &Option<String>,
    date: &str,
) -> (HashMap<String, Vec<String>>, Option<chrono::NaiveDate>) {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    if title.trim().is_empty() {
        errors.insert("title".to_string(), vec!["must not be empty".to_string()]);
    }
    if let Some(description) = description {
        if description.chars().count() > 255 {
            errors.insert(
                "description".to_string(),
                vec!["must not exceed 255 characters".to_string()],
            );
        }
    }
    let parsed = parse_date(date);
    if parsed.is_none() {
        errors.insert(
            "date".to_string(),
            vec!["must be a date in YYYY-MM-DD format".to_string()],
        );
    }
    (errors, parsed)
}

#[derive(Tags)]
enum ApiHolidayTags {
    Holiday,
}

pub struct ApiHoliday;

#[OpenApi]
impl ApiHoliday {
    #[oai(path = "/holidays", method = "get", tag = "ApiHolidayTags::Holiday")]
    async fn paginate_holiday_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> HolidayPaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return HolidayPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "paginate_holiday_api",
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
                return HolidayPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "paginate_holiday_api",
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
                    return HolidayPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.holiday",
                            "paginate_holiday_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return HolidayPaginateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "paginate_holiday_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&HOLIDAY_VIEW) {
            return HolidayPaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        let (data, counts) = match paginate_holiday(&mut tx, page, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "paginate_holiday_api",
                        "paginate_holiday",
                        &err.to_string(),
                    ),
                ))
            }
        };

        HolidayPaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all holidays",
            PaginateData::new(page, limit, counts, data.iter().map(holiday_detail).collect()),
        )))
    }

    #[oai(path = "/holidays", method = "post", tag = "ApiHolidayTags::Holiday")]
    async fn create_holiday_api(
        &self,
        Json(json): Json<HolidayCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> HolidayCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return HolidayCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "create_holiday_api",
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
                return HolidayCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "create_holiday_api",
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
                    return HolidayCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.holiday",
                            "create_holiday_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return HolidayCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "create_holiday_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&HOLIDAY_CREATE) {
            return HolidayCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let (errors, date) = validate_holiday_fields(&json.title, &json.description, &json.date);
        if !errors.is_empty() {
            return HolidayCreateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }
        let date = date.unwrap();

        // One active holiday per date
        match get_active_holiday_by_date(&mut tx, date, None).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                return HolidayCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Date already exists",
                )))
            }
            Err(err) => {
                return HolidayCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "create_holiday_api",
                        "check existing date",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let new_holiday = match create_holiday(
            &mut tx,
            None,
            json.title,
            json.description,
            date,
            json.status.unwrap_or(true),
            &request_user,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return HolidayCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "create_holiday_api",
                        "create_holiday",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return HolidayCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.holiday",
                    "create_holiday_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        HolidayCreateResponses::Ok(Json(SuccessResponse::new(
            "Holiday created successfully",
            holiday_detail(&new_holiday),
        )))
    }

    #[oai(path = "/holidays/:id", method = "get", tag = "ApiHolidayTags::Holiday")]
    async fn get_detail_holiday_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> HolidayDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return HolidayDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "get_detail_holiday_api",
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
                return HolidayDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "get_detail_holiday_api",
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
                    return HolidayDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.holiday",
                            "get_detail_holiday_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return HolidayDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "get_detail_holiday_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&HOLIDAY_VIEW) {
            return HolidayDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return HolidayDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Holiday not found",
                )))
            }
        };
        let holiday = match get_holiday_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "get_detail_holiday_api",
                        "get_holiday_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let holiday = match holiday {
            Some(val) => val,
            None => {
                return HolidayDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Holiday not found",
                )))
            }
        };
        HolidayDetailResponses::Ok(Json(SuccessResponse::new(
            "Fetch one holiday",
            holiday_detail(&holiday),
        )))
    }

    #[oai(path = "/holidays/:id", method = "put", tag = "ApiHolidayTags::Holiday")]
    async fn update_holiday_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<HolidayUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> HolidayUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return HolidayUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "update_holiday_api",
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
                return HolidayUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "update_holiday_api",
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
                    return HolidayUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.holiday",
                            "update_holiday_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return HolidayUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "update_holiday_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&HOLIDAY_UPDATE) {
            return HolidayUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        // Validate payload
        let (errors, date) = validate_holiday_fields(&json.title, &json.description, &json.date);
        if !errors.is_empty() {
            return HolidayUpdateResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }
        let date = date.unwrap();

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return HolidayUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Holiday not found",
                )))
            }
        };
        let holiday = match get_holiday_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "update_holiday_api",
                        "get_holiday_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut holiday = match holiday {
            Some(val) => val,
            None => {
                return HolidayUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Holiday not found",
                )))
            }
        };

        match get_active_holiday_by_date(&mut tx, date, Some(&holiday.id)).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                return HolidayUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Date already exists",
                )))
            }
            Err(err) => {
                return HolidayUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "update_holiday_api",
                        "check existing date",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let status = json.status.unwrap_or(holiday.status);
        if let Err(err) = update_holiday(
            &mut tx,
            &mut holiday,
            json.title,
            json.description,
            date,
            status,
            &request_user,
            None,
        )
        .await
        {
            return HolidayUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.holiday",
                    "update_holiday_api",
                    "update_holiday",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return HolidayUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.holiday",
                    "update_holiday_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        HolidayUpdateResponses::Ok(Json(SuccessResponse::new(
            "Holiday updated successfully",
            holiday_detail(&holiday),
        )))
    }

    #[oai(
        path = "/holidays/:id",
        method = "delete",
        tag = "ApiHolidayTags::Holiday"
    )]
    async fn delete_holiday_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> HolidayDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return HolidayDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "delete_holiday_api",
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
                return HolidayDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "delete_holiday_api",
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
                    return HolidayDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.holiday",
                            "delete_holiday_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return HolidayDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "delete_holiday_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&HOLIDAY_DELETE) {
            return HolidayDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return HolidayDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Holiday not found",
                )))
            }
        };
        let holiday = match get_holiday_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return HolidayDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.holiday",
                        "delete_holiday_api",
                        "get_holiday_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let holiday = match holiday {
            Some(val) => val,
            None => {
                return HolidayDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Holiday not found",
                )))
            }
        };

        if let Err(err) = delete_holiday(&mut tx, &holiday).await {
            return HolidayDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.holiday",
                    "delete_holiday_api",
                    "delete_holiday",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return HolidayDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.holiday",
                    "delete_holiday_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        HolidayDeleteResponses::Ok(Json(SuccessResponse::new(
            "Holiday deleted successfully",
            holiday_detail(&holiday),
        )))
    }
}
