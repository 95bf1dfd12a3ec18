use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http, web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app_state::AppState;
use crate::config::DEFAULT_JWT_SECRET;
use crate::error::ApiError;
use crate::models::{InsertUser, Role, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// Identity resolved from a validated bearer token, inserted into request
/// extensions by the [`Authentication`] middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string())),
        )
    }
}

pub fn create_jwt(
    user_id: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now() + Duration::hours(24);
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Bearer-token middleware. A valid token stashes an [`AuthUser`] in request
/// extensions; an invalid or expired one is rejected with 403 on the spot.
/// Requests without an Authorization header pass through so the public auth
/// endpoints keep working; protected handlers answer 401 via the extractor.
#[derive(Debug)]
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware { service }))
    }
}

pub struct AuthMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
            if let Ok(auth_str) = auth_header.to_str() {
                if auth_str.starts_with("Bearer ") {
                    let token = auth_str.trim_start_matches("Bearer ").trim().to_string();
                    let secret = req
                        .app_data::<web::Data<AppState>>()
                        .map(|data| data.config.jwt_secret.clone())
                        .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
                    match validate_jwt(&token, &secret) {
                        Ok(claims) => {
                            req.extensions_mut().insert(AuthUser {
                                user_id: claims.sub,
                                role: claims.role,
                            });
                        }
                        Err(e) => {
                            let (req_parts, _payload) = req.into_parts();
                            let resp = HttpResponse::Forbidden()
                                .json(json!({ "message": format!("invalid token: {}", e) }))
                                .map_into_boxed_body();
                            let srv_resp = ServiceResponse::new(req_parts, resp);
                            return Box::pin(async move { Ok(srv_resp) });
                        }
                    }
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    user: User,
    token: String,
}

pub async fn signup(
    data: web::Data<AppState>,
    body: web::Json<InsertUser>,
) -> Result<HttpResponse, ApiError> {
    let mut payload = body.into_inner();
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "email and password are required".to_string(),
        ));
    }

    payload.password = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))?;

    let user = data.store.create_user(payload)?;
    let token = create_jwt(&user.id, user.role, &data.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    info!("new {:?} account: {}", user.role, user.email);
    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

pub async fn signin(
    data: web::Data<AppState>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = data
        .store
        .get_user_by_email(&body.email)
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    if !verify(&body.password, &user.password).unwrap_or(false) {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = create_jwt(&user.id, user.role, &data.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))?;

    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}
