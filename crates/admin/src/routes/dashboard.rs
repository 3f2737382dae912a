//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use chrono::Timelike;

use dispatch_core::OrderStatus;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{AdminProfile, CurrentAdmin};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub greeting: &'static str,
    pub admin: CurrentAdmin,
    pub profile: AdminProfile,
    pub order_count: usize,
    pub pending_count: usize,
    pub assigned_count: usize,
    pub personnel_count: usize,
}

/// Display the dashboard: profile card plus order and roster counts.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.identity().profile(&admin.uid).await?;
    let orders = state.orders().list().await?;
    let personnel = state.personnel().list().await?;

    let pending_count = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .count();

    Ok(DashboardTemplate {
        greeting: greeting_for_hour(chrono::Local::now().hour()),
        admin,
        profile,
        order_count: orders.len(),
        pending_count,
        assigned_count: orders.len() - pending_count,
        personnel_count: personnel.len(),
    })
}

fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}
