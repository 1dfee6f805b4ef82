//! Authentication route handlers.
//!
//! Login and registration re-render their form with a single error line on
//! failure, keeping what the user typed (except passwords). On success the
//! browser is sent to the dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;

use portal_core::SessionUser;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{LOGIN_PATH, OptionalAuth};
use crate::services::auth::{LOGIN_FAILED, REGISTRATION_FAILED};
use crate::services::{AuthError, AuthService, Registration};
use crate::session::SessionStorage;
use crate::state::AppState;
use crate::views::HeaderView;

const DASHBOARD_PATH: &str = "/dashboard";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub header: HeaderView,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub header: HeaderView,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in browsers go to the dashboard.
pub async fn login_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    LoginTemplate {
        header: HeaderView::guest(),
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    storage: SessionStorage,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.api(), &storage);

    match auth.login(&form.email, SecretString::from(form.password)).await {
        Ok(user) => signed_in(&user),
        Err(err) => {
            log_failure("login", &err);
            LoginTemplate {
                header: HeaderView::guest(),
                error: Some(err.user_message(LOGIN_FAILED)),
                email: form.email,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page. Signed-in browsers go to the dashboard.
pub async fn register_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    RegisterTemplate {
        header: HeaderView::guest(),
        error: None,
        name: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    storage: SessionStorage,
    Form(form): Form<RegisterForm>,
) -> Response {
    let auth = AuthService::new(state.api(), &storage);
    let registration = Registration {
        name: form.name.clone(),
        email: form.email.clone(),
        password: SecretString::from(form.password),
        confirm_password: SecretString::from(form.password_confirm),
    };

    match auth.register(registration).await {
        Ok(user) => signed_in(&user),
        Err(err) => {
            log_failure("registration", &err);
            RegisterTemplate {
                header: HeaderView::guest(),
                error: Some(err.user_message(REGISTRATION_FAILED)),
                name: form.name,
                email: form.email,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout: clear the session and return to the login page.
pub async fn logout(State(state): State<AppState>, storage: SessionStorage) -> Result<Redirect, AppError> {
    AuthService::new(state.api(), &storage).logout().await?;
    clear_sentry_user();
    Ok(Redirect::to(LOGIN_PATH))
}

fn signed_in(user: &SessionUser) -> Response {
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Redirect::to(DASHBOARD_PATH).into_response()
}

fn log_failure(action: &str, err: &AuthError) {
    if err.is_internal() {
        tracing::error!(error = %err, "{action} failed");
    } else {
        tracing::warn!(error = %err, "{action} rejected");
    }
}
