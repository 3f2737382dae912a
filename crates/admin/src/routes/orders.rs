//! Order route handlers.
//!
//! Listing, creation, assignment, and deletion. Mutations redirect back to
//! the order list with an `?error=` or `?success=` code; a partial store
//! failure gets its own code so it is never mistaken for a clean failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use dispatch_core::PersonId;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{Address, Coordinates, CurrentAdmin, DeliveryPerson, Order};
use crate::routes::auth::MessageQuery;
use crate::services::{NewOrder, RegistryError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Order creation form data.
///
/// `amount` and `delivery_boy_id` arrive as strings so an empty select or
/// input can be told apart from a malformed one.
#[derive(Debug, Deserialize)]
pub struct CreateOrderForm {
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub category: String,
    pub amount: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub delivery_boy_id: Option<String>,
}

/// Assignment form data.
#[derive(Debug, Deserialize)]
pub struct AssignForm {
    pub delivery_boy_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Order list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub admin: CurrentAdmin,
    pub orders: Vec<Order>,
    pub personnel: Vec<DeliveryPerson>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order list with assignment controls.
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut orders = state.orders().list().await?;
    let personnel = state.personnel().list().await?;

    // Newest orders at the top of the table.
    orders.reverse();

    Ok(OrdersTemplate {
        admin,
        orders,
        personnel,
        error: query.error,
        success: query.success,
    })
}

/// Handle order creation form submission.
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Form(form): Form<CreateOrderForm>,
) -> Response {
    let Ok(amount) = form.amount.trim().parse::<Decimal>() else {
        return Redirect::to("/orders?error=invalid").into_response();
    };
    let delivery_boy_id = match parse_optional_id(form.delivery_boy_id.as_deref()) {
        Ok(id) => id,
        Err(()) => return Redirect::to("/orders?error=invalid").into_response(),
    };

    let new = NewOrder {
        product_name: form.product_name,
        product_description: form.product_description,
        category: form.category,
        amount,
        address: Address {
            street: form.street,
            city: form.city,
            state: form.state,
            pincode: form.pincode,
            coordinates: Coordinates {
                latitude: form.latitude.unwrap_or(0.0),
                longitude: form.longitude.unwrap_or(0.0),
            },
        },
        image: form.image,
        delivery_boy_id,
    };

    match state.orders().create(new).await {
        Ok(_) => Redirect::to("/orders?success=created").into_response(),
        Err(e) => redirect_with_error("/orders", &e),
    }
}

/// Handle assignment form submission.
pub async fn assign(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(key): Path<String>,
    Form(form): Form<AssignForm>,
) -> Response {
    match state
        .orders()
        .assign(&key, PersonId::new(form.delivery_boy_id))
        .await
    {
        Ok(_) => Redirect::to("/orders?success=assigned").into_response(),
        Err(e) => redirect_with_error("/orders", &e),
    }
}

/// Handle order deletion form submission.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(key): Path<String>,
) -> Response {
    match state.orders().delete(&key).await {
        Ok(()) => Redirect::to("/orders?success=deleted").into_response(),
        Err(e) => redirect_with_error("/orders", &e),
    }
}

/// Parse an optional select value: absent or blank means unassigned.
fn parse_optional_id(raw: Option<&str>) -> Result<Option<PersonId>, ()> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<i32>().map(|id| Some(PersonId::new(id))).map_err(|_| ()),
    }
}

/// Translate a registry error into a redirect code, logging the ones that
/// mean the store is in a degraded or inconsistent state.
pub(crate) fn redirect_with_error(base: &str, e: &RegistryError) -> Response {
    let code = match e {
        RegistryError::Validation(_) => "invalid",
        RegistryError::NotFound(_) => "not_found",
        RegistryError::Partial { step, .. } => {
            tracing::error!(error = %e, step, "partial write sequence");
            sentry::capture_error(e);
            "partial"
        }
        RegistryError::Store(_) | RegistryError::Corrupt(_) => {
            tracing::error!(error = %e, "registry operation failed");
            sentry::capture_error(e);
            "failed"
        }
    };
    Redirect::to(&format!("{base}?error={code}")).into_response()
}
