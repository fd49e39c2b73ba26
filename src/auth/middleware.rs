use actix_web::FromRequest;
use actix_web::{HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::jwks::JwksCache;
use crate::auth::jwt::{self, Claims};
use crate::db::users::find_or_create_from_auth;
use crate::error::AppError;
use crate::models::users::{self, CreateUserFromAuth};

/// The caller behind a valid `Authorization: Bearer <token>` header.
///
/// Use `Option<AuthenticatedUser>` on routes that are public but personalise
/// their answer for logged-in users.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    AppError::Unauthorized("You must be logged in to do that".to_string())
                })?;

            let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
                AppError::Unauthorized("Authorization header must be: Bearer <token>".to_string())
            })?;

            // 2. Validate the token: shared secret when configured, JWKS otherwise.
            let claims = verify(&req, token)
                .await
                .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

            // 3. Extract user info from claims.
            let user_id = claims.user_id().map_err(AppError::Unauthorized)?;

            let email = claims
                .user_email()
                .ok_or_else(|| AppError::Unauthorized("No email in token claims".to_string()))?;

            // 4. Get the database connection.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| {
                    AppError::Database(sea_orm::DbErr::Custom(
                        "Database not configured".to_string(),
                    ))
                })?;

            // 5. Find or create the user.
            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    name: claims.name(),
                    picture: claims.picture(),
                },
            )
            .await?;

            Ok(AuthenticatedUser(user))
        })
    }
}

async fn verify(req: &HttpRequest, token: &str) -> Result<Claims, String> {
    if let Some(secret) = req.app_data::<web::Data<JwtSecret>>() {
        return jwt::validate_token_with_secret(token, &secret.0);
    }

    let jwks_cache = req
        .app_data::<web::Data<Arc<JwksCache>>>()
        .ok_or("JWKS cache not configured")?;

    jwt::validate_token(token, jwks_cache.get_ref()).await
}

/// Wrapper type to store the JWT secret in Actix app data.
#[derive(Clone)]
pub struct JwtSecret(pub String);
