//! Delivery personnel route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use dispatch_core::Gender;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, DeliveryPerson};
use crate::routes::orders::redirect_with_error;
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Personnel creation form data.
#[derive(Debug, Deserialize)]
pub struct CreatePersonForm {
    pub name: String,
    pub phone_number: String,
    pub gender: Gender,
    #[serde(default)]
    pub profile_image: String,
}

/// Query parameters for the roster page.
#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    /// Case-insensitive name filter.
    pub q: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Roster page template.
#[derive(Template, WebTemplate)]
#[template(path = "personnel.html")]
pub struct PersonnelTemplate {
    pub admin: CurrentAdmin,
    pub personnel: Vec<DeliveryPerson>,
    pub q: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the delivery roster, optionally filtered by name.
///
/// The roster is small enough that filtering happens here after a full
/// list rather than in the store.
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<RosterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut personnel = state.personnel().list().await?;

    let q = query.q.unwrap_or_default();
    let needle = q.trim().to_lowercase();
    if !needle.is_empty() {
        personnel.retain(|p| p.name.to_lowercase().contains(&needle));
    }

    Ok(PersonnelTemplate {
        admin,
        personnel,
        q,
        error: query.error,
        success: query.success,
    })
}

/// Handle personnel creation form submission.
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Form(form): Form<CreatePersonForm>,
) -> Response {
    match state
        .personnel()
        .add(&form.name, &form.phone_number, form.gender, &form.profile_image)
        .await
    {
        Ok(_) => Redirect::to("/personnel?success=added").into_response(),
        Err(e) => redirect_with_error("/personnel", &e),
    }
}

/// Handle personnel deletion form submission.
///
/// Orders assigned to the removed person keep their stale reference; the
/// order list shows them as assigned to an unknown person until they are
/// reassigned or deleted.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(key): Path<String>,
) -> Response {
    match state.personnel().remove(&key).await {
        Ok(()) => Redirect::to("/personnel?success=removed").into_response(),
        Err(e) => redirect_with_error("/personnel", &e),
    }
}
