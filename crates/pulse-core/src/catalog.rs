//! Built-in endpoint catalog.
//!
//! Order matters: results are reported at index parity with this list.

use crate::types::{EndpointDescriptor, SamplePayload};

/// The application's REST surface, grouped by category.
pub fn default_catalog() -> Vec<EndpointDescriptor> {
    use SamplePayload::{Chat, Search, Validation};

    vec![
        // Core
        EndpointDescriptor::get("/api/health", "Core"),
        EndpointDescriptor::get("/api/version", "Core"),
        EndpointDescriptor::get("/api/config/public", "Core"),
        // Auth
        EndpointDescriptor::get("/api/auth/session", "Auth"),
        EndpointDescriptor::get("/api/auth/me", "Auth"),
        EndpointDescriptor::post("/api/auth/refresh", "Auth", SamplePayload::Empty),
        EndpointDescriptor::post("/api/auth/validate", "Auth", Validation),
        // Themes
        EndpointDescriptor::get("/api/themes", "Themes"),
        EndpointDescriptor::get("/api/themes?featured=true&limit=5", "Themes"),
        EndpointDescriptor::get("/api/themes/default", "Themes"),
        EndpointDescriptor::post("/api/themes/validate", "Themes", Validation),
        // Content
        EndpointDescriptor::get("/api/content/pages", "Content"),
        EndpointDescriptor::get("/api/content/navigation", "Content"),
        EndpointDescriptor::get("/api/content/testimonials", "Content"),
        // Bookings
        EndpointDescriptor::get("/api/bookings/availability?days=7", "Bookings"),
        EndpointDescriptor::post("/api/bookings/validate", "Bookings", Validation),
        EndpointDescriptor::get("/api/bookings", "Bookings").with_auth(),
        // Payments
        EndpointDescriptor::get("/api/payments/plans", "Payments"),
        EndpointDescriptor::post("/api/payments/checkout-session", "Payments", SamplePayload::Empty),
        EndpointDescriptor::get("/api/payments/history", "Payments").with_auth(),
        // Admin
        EndpointDescriptor::get("/api/admin/stats", "Admin").with_auth(),
        EndpointDescriptor::get("/api/admin/team", "Admin").with_auth(),
        EndpointDescriptor::get("/api/admin/audit-log?limit=10", "Admin").with_auth(),
        // AI
        EndpointDescriptor::post("/api/ai/chat", "AI", Chat),
        EndpointDescriptor::post("/api/ai/suggest-theme", "AI", Chat),
        // Search
        EndpointDescriptor::post("/api/search", "Search", Search),
        EndpointDescriptor::get("/api/search/suggestions?q=test", "Search"),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::HttpMethod;

    #[test]
    fn catalog_is_non_empty_and_unique() {
        let catalog = default_catalog();
        assert!(!catalog.is_empty());

        let paths: HashSet<_> = catalog.iter().map(|d| (&d.path, d.method)).collect();
        assert_eq!(paths.len(), catalog.len());
    }

    #[test]
    fn only_post_endpoints_carry_payloads() {
        for desc in default_catalog() {
            if desc.method == HttpMethod::Get {
                assert_eq!(desc.payload, SamplePayload::Empty, "{}", desc.path);
            }
        }
    }
}
