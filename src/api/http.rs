//! REST client for the annotation service.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use super::{AnnotationApi, AnnotationPayload, AnnotationRecord, ApiError};
use crate::model::{ImageId, ServerId};

/// Talks to the annotation service over HTTP with blocking requests.
///
/// Meant to run inside a [`SyncWorker`](super::SyncWorker) so the caller's
/// thread never waits on the network.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the service at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn image_annotations_url(&self, image_id: ImageId) -> String {
        format!("{}/api/images/{}/annotations", self.base_url, image_id)
    }

    fn annotation_url(&self, annotation_id: ServerId) -> String {
        format!("{}/api/annotations/{}", self.base_url, annotation_id)
    }

    /// Map non-success responses to errors, keeping the body as the message.
    fn check_status(response: Response, not_found: ApiError) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(not_found);
        }
        let message = response
            .text()
            .ok()
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json().map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl AnnotationApi for HttpApi {
    fn list_annotations(&mut self, image_id: ImageId) -> Result<Vec<AnnotationRecord>, ApiError> {
        let response = self
            .client
            .get(self.image_annotations_url(image_id))
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let response = Self::check_status(response, ApiError::ImageNotFound { id: image_id })?;
        Self::decode(response)
    }

    fn create_annotation(
        &mut self,
        image_id: ImageId,
        payload: &AnnotationPayload,
    ) -> Result<AnnotationRecord, ApiError> {
        let response = self
            .client
            .post(self.image_annotations_url(image_id))
            .json(payload)
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let response = Self::check_status(response, ApiError::ImageNotFound { id: image_id })?;
        Self::decode(response)
    }

    fn update_annotation(
        &mut self,
        annotation_id: ServerId,
        payload: &AnnotationPayload,
    ) -> Result<AnnotationRecord, ApiError> {
        let response = self
            .client
            .put(self.annotation_url(annotation_id))
            .json(payload)
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let response =
            Self::check_status(response, ApiError::AnnotationNotFound { id: annotation_id })?;
        Self::decode(response)
    }

    fn delete_annotation(&mut self, annotation_id: ServerId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.annotation_url(annotation_id))
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Self::check_status(response, ApiError::AnnotationNotFound { id: annotation_id })?;
        Ok(())
    }
}
