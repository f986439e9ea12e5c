use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};

use crate::{
    core::{
        authorize::RequiredCapabilities,
        security::{get_user_from_token, BearerAuthorization},
    },
    repository::{permission::paginate_permission, role::get_permission_grant},
    schema::{
        common::{
            ForbiddenResponse, InternalServerErrorResponse, PaginateData, SuccessResponse,
            UnauthorizedResponse,
        },
        permission::{PermissionDetail, PermissionPaginateResponses},
    },
    AppState,
};

const PERMISSION_VIEW: RequiredCapabilities = RequiredCapabilities::all(&["permissions.view"]);

#[derive(Tags)]
enum ApiPermissionTags {
    Permission,
}

pub struct ApiPermission;

#[OpenApi]
impl ApiPermission {
    #[oai(
        path = "/permissions",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn paginate_permission_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionPaginateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
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
                return PermissionPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
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
                    return PermissionPaginateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.permission",
                            "paginate_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PermissionPaginateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }
        let request_user = request_user.unwrap();

        // Check capability
        let grant = match get_permission_grant(&mut tx, &request_user.id).await {
            Ok(val) => val,
            Err(err) => {
                return PermissionPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
                        "get permission grant",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !grant.allows(&PERMISSION_VIEW) {
            return PermissionPaginateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);
        let (data, counts) = match paginate_permission(&mut tx, page, limit).await {
            Ok(val) => val,
            Err(err) => {
                return PermissionPaginateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
                        "paginate_permission",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let rows: Vec<PermissionDetail> = data
            .iter()
            .map(|val| PermissionDetail {
                id: val.id.to_string(),
                code: val.code.clone(),
                description: val.description.clone(),
            })
            .collect();

        PermissionPaginateResponses::Ok(Json(SuccessResponse::new(
            "Fetch all permissions",
            PaginateData::new(page, limit, counts, rows),
        )))
    }
}
