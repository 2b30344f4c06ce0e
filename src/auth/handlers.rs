use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{
            AuthenticatedUser, LoginRequest, LoginResponse, MessageResponse, PublicUser,
            SignupRequest, UploadAvatarRequest, UserResponse,
        },
        extractors::AuthUser,
        services::{log_in, sign_up},
    },
    config::FeatureFlags,
    error::AppError,
    state::AppState,
};

pub fn auth_routes(features: &FeatureFlags) -> Router<AppState> {
    let router = Router::new().route("/auth", post(login));
    if features.signup {
        router.route("/signup", post(signup))
    } else {
        router
    }
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/getUser", get(get_user))
        .route("/upload", post(upload_avatar))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    sign_up(state.users.as_ref(), payload).await?;
    Ok(Json(MessageResponse {
        message: "user created".into(),
    }))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let time_token = payload.time_token.clone();
    let session = log_in(state.users.as_ref(), &state.keys, payload).await?;

    let jar = if state.config.features.login_cookie {
        jar.add(
            Cookie::build((state.config.jwt.cookie_name.clone(), session.token.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(session.ttl.duration()),
        )
    } else {
        jar
    };

    Ok((
        jar,
        Json(LoginResponse {
            user: AuthenticatedUser {
                user: PublicUser::from(session.user),
                time_token,
                token: session.token,
            },
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        error!(user_id, "token refers to a missing user");
        AppError::Unauthenticated
    })?;
    Ok(Json(UserResponse { user: user.into() }))
}

#[instrument(skip(state, payload))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<UploadAvatarRequest>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    if state.config.features.enforce_ownership && payload.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    let user = state
        .users
        .set_avatar(payload.user_id, &payload.url, &payload.delete_url)
        .await?;
    info!(user_id = user.id, "avatar updated");
    Ok(Json(UserResponse { user: user.into() }))
}
