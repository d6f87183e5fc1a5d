//! Widget configuration endpoint.

use axum::{extract::RawQuery, Json};
use botel_widget::WidgetConfig;

/// Handler for `GET /api/widget/config`.
///
/// Normalizes the embed parameters the standalone iframe was loaded with.
/// Unknown keys are ignored and invalid values fall back to defaults, so
/// this never fails. Tokens passed on the query string are not echoed.
pub async fn widget_config_handler(RawQuery(query): RawQuery) -> Json<WidgetConfig> {
    let config = WidgetConfig::from_query(query.as_deref().unwrap_or_default());
    tracing::debug!(
        position = config.position.as_str(),
        company = %config.company_name,
        "resolved widget config"
    );
    Json(config)
}
