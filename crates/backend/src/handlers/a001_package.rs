use axum::Json;
use contracts::domain::a001_package::{catalog, Package};
use serde::Serialize;

use crate::shared::format::format_rupiah;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    #[serde(flatten)]
    pub package: Package,
    /// e.g. "Rp 100.000"
    pub price_label: String,
}

/// GET /api/packages
pub async fn list_all() -> Json<Vec<PackageView>> {
    Json(
        catalog()
            .iter()
            .map(|p| PackageView {
                package: p.clone(),
                price_label: format_rupiah(p.price),
            })
            .collect(),
    )
}
