//! Back office dashboard figures.

use serde::Serialize;
use utoipa::ToSchema;

use crate::registrations::RegistrationRequest;

/// Number of pending requests shown on the dashboard.
pub const RECENT_REGISTRATIONS_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub active_students: i64,
    pub active_teachers: i64,
    pub pending_registrations: i64,
    /// Most recently submitted pending requests, newest first
    pub recent_registrations: Vec<RegistrationRequest>,
}
