//! Authentication route handlers.
//!
//! Login, registration, and logout against the identity gateway. Form
//! failures redirect back with an `?error=` code the page template turns
//! into a message; only success establishes a session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;

use dispatch_core::Gender;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::{AuthError, Registration};
use crate::state::AppState;

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
    pub phone: String,
    pub gender: Gender,
    pub age: u8,
    pub address: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
///
/// Sign-in and the admin role check both happen inside the gateway; a
/// valid credential with the wrong role never reaches the session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.identity().sign_in(&form.email, &form.password).await {
        Ok((auth, current)) => {
            if let Err(e) =
                set_current_admin(&session, &current, auth.id_token.expose_secret()).await
            {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            set_sentry_user(&current.uid, Some(current.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            let code = match e {
                AuthError::InvalidCredentials => "credentials",
                AuthError::NotAdmin => "not_admin",
                AuthError::ProfileMissing => "no_profile",
                AuthError::Validation(_) => "invalid",
                _ => "failed",
            };
            Redirect::to(&format!("/login?error={code}")).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate { error: query.error }
}

/// Handle registration form submission.
///
/// Creates the account and its administrator profile, then signs the new
/// administrator straight in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/register?error=password_mismatch").into_response();
    }

    let registration = Registration {
        name: form.name,
        email: form.email,
        password: form.password,
        phone: form.phone,
        gender: form.gender,
        age: form.age,
        address: form.address,
    };

    match state.identity().register(registration).await {
        Ok((auth, current)) => {
            if let Err(e) =
                set_current_admin(&session, &current, auth.id_token.expose_secret()).await
            {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            set_sentry_user(&current.uid, Some(current.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            let code = match e {
                AuthError::DuplicateEmail => "email_taken",
                AuthError::Validation(_) => "invalid",
                AuthError::Partial { .. } => {
                    tracing::error!("Registration left an account without a profile");
                    "failed"
                }
                _ => "failed",
            };
            Redirect::to(&format!("/register?error={code}")).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout form submission.
///
/// Destroys the local session regardless of whether the provider
/// sign-out succeeds.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let admin: Option<CurrentAdmin> = session
        .get(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten();

    match clear_current_admin(&session).await {
        Ok(token) => {
            if let (Some(admin), Some(token)) = (admin, token) {
                state
                    .identity()
                    .sign_out(&admin.uid, &SecretString::from(token))
                    .await;
            }
        }
        Err(e) => tracing::error!("Failed to clear session: {}", e),
    }

    clear_sentry_user();
    Redirect::to("/login?success=signed_out").into_response()
}
