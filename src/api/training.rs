//! Training job commands.
//!
//! The usual flow: [`create_model`], [`create_training_job`] for it, upload
//! the images (see [`super::upload::upload_files`]), then [`start_training`]
//! with their download URLs. Progress arrives over
//! [`crate::stream::Channel::Training`].

use super::client::{ApiClient, Query};
use super::error::ApiError;
use super::types::{
    Empty, Envelope, FailJobRequest, LoraModel, StartTrainingRequest, TrainingJob,
    TrainingModelRequest,
};

/// Reason reported when the user cancels a job.
pub const CANCEL_REASON: &str = "User cancelled";

/// POST /api/models: create the model record a job will train.
pub async fn create_model(
    client: &ApiClient,
    request: &TrainingModelRequest,
) -> Result<Envelope<LoraModel>, ApiError> {
    client.post("/api/models", request).await
}

pub async fn create_training_job(
    client: &ApiClient,
    model_id: i64,
) -> Result<Envelope<TrainingJob>, ApiError> {
    client
        .post_empty(&format!("/api/training/models/{}", model_id))
        .await
}

pub async fn start_training(
    client: &ApiClient,
    job_id: i64,
    request: &StartTrainingRequest,
) -> Result<Envelope<serde_json::Value>, ApiError> {
    log::info!(
        "Starting training job {} ({} epochs, {} images)",
        job_id,
        request.total_epochs,
        request.training_image_urls.len()
    );
    client
        .post(&format!("/api/training/jobs/{}/start", job_id), request)
        .await
}

pub async fn get_training_job(
    client: &ApiClient,
    job_id: i64,
) -> Result<Envelope<TrainingJob>, ApiError> {
    client
        .get(&format!("/api/training/jobs/{}", job_id), &Query::new())
        .await
}

pub async fn get_my_training_jobs(client: &ApiClient) -> Result<Envelope<Vec<TrainingJob>>, ApiError> {
    client.get("/api/training/my", &Query::new()).await
}

/// Cancel by reporting the job as failed; there is no cancel endpoint.
pub async fn cancel_training_job(client: &ApiClient, job_id: i64) -> Result<Envelope<Empty>, ApiError> {
    let body = FailJobRequest {
        error: CANCEL_REASON.to_string(),
    };
    client
        .post(&format!("/api/training/jobs/{}/fail", job_id), &body)
        .await
}
