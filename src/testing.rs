//! In-memory collaborators shared by unit tests.

use crate::error::ServiceError;
use crate::models::{
    Color, CreateProductPayload, CreatedProduct, Model, PartNumber, UploadedPicture,
};
use crate::notify::{Notice, NoticeLevel, Notifier};
use crate::services::{CatalogService, PartNumberService, PictureUploadService, ProductCreateService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

fn color(id: i64, name: &str, hex_code: &str) -> Color {
    Color {
        id,
        name: name.to_string(),
        hex_code: hex_code.to_string(),
    }
}

/// Two Apple models and one non-Apple model
pub fn sample_models() -> Vec<Model> {
    vec![
        Model {
            id: 1,
            model_name: "iPhone 13".to_string(),
            brand: "Apple".to_string(),
            colors: vec![color(10, "Midnight", "#1C1C1E"), color(11, "Starlight", "#F5F5DC")],
            pictures: vec![],
            is_apple: true,
            part_number: Some("MLPF3".to_string()),
            link: None,
        },
        Model {
            id: 2,
            model_name: "Galaxy S22".to_string(),
            brand: "Samsung".to_string(),
            colors: vec![color(20, "Phantom Black", "#000000")],
            pictures: vec![],
            is_apple: false,
            part_number: None,
            link: None,
        },
        Model {
            id: 3,
            model_name: "iPhone 11".to_string(),
            brand: "Apple".to_string(),
            colors: vec![color(30, "Purple", "#D1CDDA")],
            pictures: vec![],
            is_apple: true,
            part_number: None,
            link: None,
        },
    ]
}

pub struct FakeCatalog {
    result: Result<Vec<Model>, ServiceError>,
    calls: Mutex<u32>,
}

impl FakeCatalog {
    pub fn new(models: Vec<Model>) -> Self {
        Self {
            result: Ok(models),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(ServiceError::Transport(reason.to_string())),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn list_models(&self) -> Result<Vec<Model>, ServiceError> {
        *self.calls.lock().unwrap() += 1;
        self.result.clone()
    }
}

#[derive(Default)]
pub struct FakePartNumbers {
    calls: Mutex<u32>,
}

impl FakePartNumbers {
    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PartNumberService for FakePartNumbers {
    async fn list(&self) -> Result<Vec<PartNumber>, ServiceError> {
        *self.calls.lock().unwrap() += 1;
        Ok(vec![
            PartNumber {
                id: 1,
                value: "MLPF3".to_string(),
            },
            PartNumber {
                id: 2,
                value: "MLPG3".to_string(),
            },
        ])
    }
}

/// Answers uploads from a script, in order; runs past the script succeed
#[derive(Default)]
pub struct FakeUploader {
    script: Mutex<VecDeque<Result<i64, ServiceError>>>,
    uploaded: Mutex<Vec<String>>,
}

impl FakeUploader {
    pub fn scripted(script: Vec<Result<i64, ServiceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    /// File names in the order they were sent
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl PictureUploadService for FakeUploader {
    async fn upload(
        &self,
        _file_bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<UploadedPicture, ServiceError> {
        let next = {
            self.uploaded.lock().unwrap().push(file_name.to_string());
            self.script.lock().unwrap().pop_front()
        };
        let id = next.unwrap_or(Ok(100))?;
        Ok(UploadedPicture {
            id,
            url: format!("https://cdn.example/{}", file_name),
        })
    }
}

pub struct FakeProducts {
    result: Result<i64, ServiceError>,
    payloads: Mutex<Vec<CreateProductPayload>>,
}

impl FakeProducts {
    pub fn accepting(id: i64) -> Self {
        Self {
            result: Ok(id),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(err: ServiceError) -> Self {
        Self {
            result: Err(err),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(&self) -> Vec<CreateProductPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductCreateService for FakeProducts {
    async fn create(&self, payload: &CreateProductPayload) -> Result<CreatedProduct, ServiceError> {
        self.payloads.lock().unwrap().push(payload.clone());
        let id = self.result.clone()?;
        Ok(CreatedProduct {
            id,
            created_at: None,
            raw_data: serde_json::Map::new(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> usize {
        self.notices()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Catalog provider backed by `sample_models`, already loaded
pub async fn loaded_catalog() -> crate::catalog::CatalogProvider {
    let mut provider = crate::catalog::CatalogProvider::new(
        Arc::new(FakeCatalog::new(sample_models())),
        Arc::new(FakePartNumbers::default()),
    );
    provider.load().await.expect("catalog");
    provider
}
