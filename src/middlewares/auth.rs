use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// 无需认证的路径前缀 (API 文档)
const PUBLIC_PREFIXES: [&str; 2] = ["/swagger-ui", "/api-docs/"];

fn is_public_path(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// 校验 Bearer 令牌，并把用户ID (i64) 写入请求扩展
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行 CORS 预检与公开路径
        if req.method() == Method::OPTIONS || is_public_path(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let verified = match bearer_token(&req) {
            Some(token) => self.jwt_service.verify_access_token(token),
            None => Err(AppError::AuthError("Missing access token".to_string())),
        };

        match verified {
            Ok(user_id) => {
                req.extensions_mut().insert(user_id);
                Box::pin(self.service.call(req))
            }
            Err(error) => {
                log::debug!("Rejected request to {}: {error}", req.path());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}
