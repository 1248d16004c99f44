use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    error::GatewayError,
    extract::ComparisonResult,
    gateway::{ComparisonGateway, ImageUpload, WEBPAGE_FIELD, WIREFRAME_FIELD},
    model::VisionModel,
};

/// Path of the comparison endpoint.
pub const COMPARE_ROUTE: &str = "/compare-wireframe-webpage";

/// Body of a successful comparison.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub comparison_results: ComparisonResult,
}

/// Builds the HTTP application around a shared gateway.
pub fn router<M: VisionModel>(gateway: Arc<ComparisonGateway<M>>) -> Router {
    let body_limit = gateway.config().max_upload_bytes;

    Router::new()
        .route("/", get(|| async { "Wireframe comparison gateway" }))
        .route(COMPARE_ROUTE, post(post_compare::<M>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(gateway)
}

async fn post_compare<M: VisionModel>(
    State(gateway): State<Arc<ComparisonGateway<M>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CompareResponse>, GatewayError> {
    // a body that is not multipart carries no files at all
    let multipart = multipart.map_err(|rejection| {
        log::warn!("Rejected non-multipart body: {rejection}");
        GatewayError::MissingFiles
    })?;

    let (wireframe, webpage) = read_uploads(multipart).await?;

    let comparison_results = gateway
        .handle(wireframe, webpage)
        .await
        .inspect_err(|e| log::warn!("Comparison failed: {e}"))?;

    log::info!("Comparison completed successfully");

    Ok(Json(CompareResponse {
        success: true,
        comparison_results,
    }))
}

/// Collects the first file part of each image field.
///
/// Parts without a filename are plain form values, not uploads, and are
/// skipped like any unknown field.
async fn read_uploads(
    mut multipart: Multipart,
) -> Result<(Option<ImageUpload>, Option<ImageUpload>), GatewayError> {
    let mut wireframe = None;
    let mut webpage = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let slot = match field.name() {
            Some(WIREFRAME_FIELD) => &mut wireframe,
            Some(WEBPAGE_FIELD) => &mut webpage,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(ImageUpload::new(filename, field.bytes().await?));
        }
    }

    Ok((wireframe, webpage))
}
