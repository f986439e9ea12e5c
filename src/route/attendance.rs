use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        utils::{date_to_string, datetime_to_string, datetime_to_string_opt, parse_date},
    },
    model::attendance::Attendance,
    repository::attendance::{
        create_attendance, get_attendance_by_user_and_date, paginate_attendance,
        punch_out_attendance,
    },
    schema::{
        attendance::{
            AttendanceCheckResponses, AttendanceDetail, AttendancePaginateResponses,
            PunchInRequest, PunchInResponses, PunchOutRequest, PunchOutResponses,
        },
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, PaginateData,
            SuccessResponse, UnauthorizedResponse, UnprocessableEntityResponse,
        },
    },
    AppState,
};

// Attendance endpoints are self-service: authentication only, no capability
// gate.

fn attendance_detail(attendance: &Attendance) -> AttendanceDetail {
    AttendanceDetail {
        id: attendance.id.to_string(),
        user_id: attendance.user_id.to_string(),
        date: date_to_string(attendance.date),
        clock_in: datetime_to_string(attendance.clock_in),
        clock_out: datetime_to_string_opt(attendance.clock_out),
        in_note: attendance.in_note.clone(),
        out_note: attendance.out_note.clone(),
    }
}

fn validate_note(field: &str, note: &Option<String>) -> HashMap<String, Vec<String>> {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(note) = note {
        if note.chars().count() > 100 {
            errors.insert(
                field.to_string(),
                vec!["must not exceed 100 characters".to_string()],
            );
        }
    }
    errors
}

#[derive(Tags)]
enum ApiAttendanceTags {
    Attendance,
}

pub struct ApiAttendance;

#[OpenApi]
impl ApiAttendance {
    #[oai(
        path = "/attendance",
        method = "get",
        tag = "ApiAttendanceTags::Attendance"
    )]
    async fn paginate_attendance_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        Query(date): Query<Option<String>>,
        Query(user_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> AttendancePaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return AttendancePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "paginate_attendance_api",
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
                return AttendancePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "paginate_attendance_api",
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
                    return AttendancePaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.attendance",
                            "paginate_attendance_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return AttendancePaginateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(20);
        let date = date.and_then(|val| parse_date(&val));
        let user_id = user_id.and_then(|val| Uuid::parse_str(&val).ok());
        let (data, counts) = match paginate_attendance(&mut tx, page, limit, date, user_id).await {
            Ok(val) => val,
            Err(err) => {
                return AttendancePaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "paginate_attendance_api",
                        "paginate_attendance",
                        &err.to_string(),
                    ),
                ))
            }
        };

        AttendancePaginateResponses::Ok(Json(SuccessResponse::new(
            "List of attendances",
            PaginateData::new(
                page,
                limit,
                counts,
                data.iter().map(attendance_detail).collect(),
            ),
        )))
    }

    #[oai(
        path = "/attendance/check-attendance",
        method = "get",
        tag = "ApiAttendanceTags::Attendance"
    )]
    async fn check_attendance_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> AttendanceCheckResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return AttendanceCheckResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "check_attendance_api",
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
                return AttendanceCheckResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "check_attendance_api",
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
                    return AttendanceCheckResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.attendance",
                            "check_attendance_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return AttendanceCheckResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        let today = Local::now().date_naive();
        let attendance =
            match get_attendance_by_user_and_date(&mut tx, &request_user.id, today).await {
                Ok(val) => val,
                Err(err) => {
                    return AttendanceCheckResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.attendance",
                            "check_attendance_api",
                            "get_attendance_by_user_and_date",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let attendance = match attendance {
            Some(val) => val,
            None => {
                return AttendanceCheckResponses::NotFound(Json(NotFoundResponse::new(
                    "Attendance not found for today",
                )))
            }
        };
        AttendanceCheckResponses::Ok(Json(SuccessResponse::new(
            "Attendance check successful",
            attendance_detail(&attendance),
        )))
    }

    #[oai(
        path = "/attendance/punch-in",
        method = "post",
        tag = "ApiAttendanceTags::Attendance"
    )]
    async fn punch_in_api(
        &self,
        Json(json): Json<PunchInRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PunchInResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PunchInResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "punch_in_api",
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
                return PunchInResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "punch_in_api",
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
                    return PunchInResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.attendance",
                            "punch_in_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PunchInResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        let today = Local::now().date_naive();
        let existing = match get_attendance_by_user_and_date(&mut tx, &request_user.id, today).await
        {
            Ok(val) => val,
            Err(err) => {
                return PunchInResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "punch_in_api",
                        "get_attendance_by_user_and_date",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if existing.is_some() {
            return PunchInResponses::BadRequest(Json(BadRequestResponse::new(
                "Attendance already exists",
            )));
        }

        let errors = validate_note("in_note", &json.in_note);
        if !errors.is_empty() {
            return PunchInResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        let now = Local::now().fixed_offset();
        let new_attendance = match create_attendance(
            &mut tx,
            None,
            request_user.id,
            today,
            now,
            json.in_note,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return PunchInResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "punch_in_api",
                        "create_attendance",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return PunchInResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.attendance",
                    "punch_in_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PunchInResponses::Ok(Json(SuccessResponse::new(
            "Attendance recorded successfully",
            attendance_detail(&new_attendance),
        )))
    }

    #[oai(
        path = "/attendance/punch-out",
        method = "post",
        tag = "ApiAttendanceTags::Attendance"
    )]
    async fn punch_out_api(
        &self,
        Json(json): Json<PunchOutRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PunchOutResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PunchOutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "punch_out_api",
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
                return PunchOutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.attendance",
                        "punch_out_api",
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
                    return PunchOutResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.attendance",
                            "punch_out_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PunchOutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        let today = Local::now().date_naive();
        let attendance =
            match get_attendance_by_user_and_date(&mut tx, &request_user.id, today).await {
                Ok(val) => val,
                Err(err) => {
                    return PunchOutResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.attendance",
                            "punch_out_api",
                            "get_attendance_by_user_and_date",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let mut attendance = match attendance {
            Some(val) => val,
            None => {
                return PunchOutResponses::NotFound(Json(NotFoundResponse::new(
                    "Attendance not found for today",
                )))
            }
        };

        let errors = validate_note("out_note", &json.out_note);
        if !errors.is_empty() {
            return PunchOutResponses::UnprocessableEntity(Json(
                UnprocessableEntityResponse::validation(errors),
            ));
        }

        let now = Local::now().fixed_offset();
        if let Err(err) = punch_out_attendance(&mut tx, &mut attendance, now, json.out_note).await {
            return PunchOutResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.attendance",
                    "punch_out_api",
                    "punch_out_attendance",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return PunchOutResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.attendance",
                    "punch_out_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PunchOutResponses::Ok(Json(SuccessResponse::new(
            "Attendance recorded successfully",
            attendance_detail(&attendance),
        )))
    }
}
