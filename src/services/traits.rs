use crate::error::ServiceError;
use crate::models::{CreateProductPayload, CreatedProduct, Model, PartNumber, UploadedPicture};
use async_trait::async_trait;

/// Source of sellable device models
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_models(&self) -> Result<Vec<Model>, ServiceError>;
}

/// Stores one image and hands back a durable reference
#[async_trait]
pub trait PictureUploadService: Send + Sync {
    async fn upload(
        &self,
        file_bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<UploadedPicture, ServiceError>;
}

/// Factory part numbers for Apple devices
#[async_trait]
pub trait PartNumberService: Send + Sync {
    async fn list(&self) -> Result<Vec<PartNumber>, ServiceError>;
}

#[async_trait]
pub trait ProductCreateService: Send + Sync {
    async fn create(&self, payload: &CreateProductPayload) -> Result<CreatedProduct, ServiceError>;
}
