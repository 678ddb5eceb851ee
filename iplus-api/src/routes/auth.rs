use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::auth::UserRole;
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{NewAccessToken, NewPasswordResetOtp, NewUser, PasswordResetOtp, User};
use crate::schema::{access_tokens, password_reset_otps, users};
use crate::services::{auth, tokens};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-otp", post(verify_otp))
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 5, max = 255))]
    pub phone: String,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    auth::validate_password(&req.password)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let email = req.email.to_lowercase();

    let email_taken: i64 = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result(&mut conn)?;
    if email_taken > 0 {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    let phone_taken: i64 = users::table
        .filter(users::phone.eq(&req.phone))
        .count()
        .get_result(&mut conn)?;
    if phone_taken > 0 {
        return Err(AppError::new(ErrorCode::PhoneAlreadyExists, "phone number already registered"));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let new_user = NewUser {
        first_name: req.first_name,
        last_name: req.last_name,
        email,
        phone: Some(req.phone),
        password_hash,
    };

    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)?;

    let token = issue_and_store_token(&state, &mut conn, &user)?;

    tracing::info!(user_id = %user.id, email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            AuthResponse { user, token },
            "User successfully registered",
        )),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username.
    pub login: String,
    pub password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // An "@" means the credential is an email; anything else is a username.
    let user: User = if req.login.contains('@') {
        users::table
            .filter(users::email.eq(req.login.to_lowercase()))
            .first(&mut conn)
    } else {
        users::table
            .filter(users::username.eq(&req.login))
            .first(&mut conn)
    }
    .map_err(|_| AppError::new(ErrorCode::InvalidCredentials, "the provided credentials are incorrect"))?;

    if !auth::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::new(ErrorCode::InvalidCredentials, "the provided credentials are incorrect"));
    }

    let token = issue_and_store_token(&state, &mut conn, &user)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok(AuthResponse { user, token })))
}

async fn logout(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let revoked = diesel::delete(access_tokens::table.filter(access_tokens::user_id.eq(principal.id)))
        .execute(&mut conn)?;

    tracing::info!(user_id = %principal.id, revoked, "user logged out");

    Ok(Json(ApiResponse::message("Successfully logged out")))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let email = req.email.to_lowercase();

    let known: i64 = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result(&mut conn)?;
    if known == 0 {
        return Err(AppError::new(ErrorCode::EmailNotFound, "email not found"));
    }

    let code = auth::generate_otp();
    let otp = NewPasswordResetOtp {
        email: email.clone(),
        code: code.clone(),
        created_at: chrono::Utc::now(),
    };

    // One live code per email; a new request replaces the old one.
    diesel::insert_into(password_reset_otps::table)
        .values(&otp)
        .on_conflict(password_reset_otps::email)
        .do_update()
        .set((
            password_reset_otps::code.eq(&code),
            password_reset_otps::created_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    if let Err(e) = state.email.send_password_reset_otp(&email, &code).await {
        tracing::error!(error = %e, "failed to send reset OTP email");
    }

    Ok(Json(ApiResponse::message("OTP sent successfully")))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    check_otp(&mut conn, &req.email.to_lowercase(), &req.otp)?;

    Ok(Json(ApiResponse::message("OTP verified successfully")))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub password: String,
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth::validate_password(&req.password)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let email = req.email.to_lowercase();

    let record = check_otp(&mut conn, &email, &req.otp)?;

    let user: User = users::table
        .filter(users::email.eq(&email))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let new_hash = auth::hash_password(&req.password)?;
    diesel::update(users::table.find(user.id))
        .set((
            users::password_hash.eq(new_hash),
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    // The code is single-use, and every live session is revoked.
    diesel::delete(password_reset_otps::table.find(record.id)).execute(&mut conn)?;
    diesel::delete(access_tokens::table.filter(access_tokens::user_id.eq(user.id)))
        .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, "password reset via OTP");

    Ok(Json(ApiResponse::message("Password reset successfully")))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

async fn change_password(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth::validate_password(&req.new_password)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user: User = users::table
        .find(principal.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    if !auth::verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::new(
            ErrorCode::WrongCurrentPassword,
            "the provided password does not match your current password",
        ));
    }

    let new_hash = auth::hash_password(&req.new_password)?;
    diesel::update(users::table.find(user.id))
        .set((
            users::password_hash.eq(new_hash),
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    // Drop every other session; the token used for this call stays valid.
    diesel::delete(
        access_tokens::table
            .filter(access_tokens::user_id.eq(user.id))
            .filter(access_tokens::id.ne(principal.token_id)),
    )
    .execute(&mut conn)?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// Issue a bearer token and persist its `jti` so it can be revoked.
fn issue_and_store_token(
    state: &AppState,
    conn: &mut PgConnection,
    user: &User,
) -> AppResult<String> {
    let role = user.role.parse::<UserRole>().unwrap_or(UserRole::User);
    let (token, claims) = tokens::issue_token(
        user.id,
        role,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    let record = NewAccessToken {
        id: claims.jti,
        user_id: user.id,
        expires_at: chrono::DateTime::from_timestamp(claims.exp, 0)
            .unwrap_or_else(chrono::Utc::now),
    };
    diesel::insert_into(access_tokens::table)
        .values(&record)
        .execute(conn)?;

    Ok(token)
}

/// Look up an OTP by (email, code) and enforce the 15-minute window.
fn check_otp(conn: &mut PgConnection, email: &str, otp: &str) -> AppResult<PasswordResetOtp> {
    let record: PasswordResetOtp = password_reset_otps::table
        .filter(password_reset_otps::email.eq(email))
        .filter(password_reset_otps::code.eq(otp))
        .first(conn)
        .map_err(|_| AppError::new(ErrorCode::OtpInvalid, "invalid OTP"))?;

    if auth::otp_expired(record.created_at, chrono::Utc::now()) {
        return Err(AppError::new(ErrorCode::OtpExpired, "OTP has expired"));
    }

    Ok(record)
}
