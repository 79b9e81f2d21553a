//! Bearer token 认证中间件
//!
//! 校验 `Authorization: Bearer <jwt>`，成功后把 [`AuthenticatedUser`] 放进请求扩展，
//! handler 通过 `web::ReqData<AuthenticatedUser>` 取用。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error, trace};

use crate::api::jwt::JwtService;
use crate::api::services::error_code::ErrorCode;
use crate::api::services::helpers::error_response;

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
}

/// 要求请求携带有效 access token
#[derive(Clone, Copy, Default)]
pub struct RequireUser;

impl<S, B> Transform<S, ServiceRequest> for RequireUser
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireUserMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireUserMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireUserMiddleware<S> {
    service: Rc<S>,
}

/// 从 Authorization header 提取 Bearer token
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn reject<B>(req: ServiceRequest, status: StatusCode, message: &str) -> ServiceResponse<EitherBody<B>> {
    let code = if status == StatusCode::UNAUTHORIZED {
        ErrorCode::Unauthorized
    } else {
        ErrorCode::InternalServerError
    };
    let response: HttpResponse = error_response(status, code, message);
    req.into_response(response.map_into_right_body())
}

impl<S, B> Service<ServiceRequest> for RequireUserMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            let Some(jwt) = req.app_data::<web::Data<Arc<JwtService>>>().cloned() else {
                error!("JwtService missing from app data");
                return Ok(reject(
                    req,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication unavailable",
                ));
            };

            let Some(token) = extract_bearer_token(&req) else {
                debug!("Missing bearer token for {}", req.path());
                return Ok(reject(
                    req,
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized: Invalid or missing token",
                ));
            };

            match jwt.validate_access_token(&token) {
                Ok(claims) => {
                    trace!("Authenticated user {}", claims.sub);
                    req.extensions_mut().insert(AuthenticatedUser {
                        id: claims.sub,
                        email: claims.email,
                    });
                    let res = srv.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    debug!("Bearer token rejected: {}", e);
                    Ok(reject(
                        req,
                        StatusCode::UNAUTHORIZED,
                        "Unauthorized: Invalid or missing token",
                    ))
                }
            }
        })
    }
}
