use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A color option offered by exactly one device model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub hex_code: String,
}

/// Reference image attached to a catalog model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelPicture {
    pub id: i64,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub name: String,
}

/// Sellable device model from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Model {
    pub id: i64,
    pub model_name: String,
    pub brand: String,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub pictures: Vec<ModelPicture>,
    #[serde(default)]
    pub is_apple: bool,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Model {
    /// Label shown in the model search box once a model is picked
    pub fn label(&self) -> String {
        format!("{} - {}", self.model_name, self.brand)
    }

    pub fn has_color(&self, color_id: i64) -> bool {
        self.colors.iter().any(|c| c.id == color_id)
    }
}

/// Part number option, offered only for Apple devices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartNumber {
    pub id: i64,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ProductType {
    #[default]
    #[serde(rename = "new")]
    New,
    #[serde(rename = "as new")]
    AsNew,
    #[serde(rename = "used")]
    Used,
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "new" => Ok(ProductType::New),
            "as new" | "as-new" | "as_new" => Ok(ProductType::AsNew),
            "used" => Ok(ProductType::Used),
            other => Err(format!("unknown product type '{}'", other)),
        }
    }
}

/// Cosmetic condition grade of a non-new device
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            other => Err(format!("unknown grade '{}'", other)),
        }
    }
}

/// Whether the device ships in its factory box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Carton {
    #[serde(rename = "orginal")]
    Original,
    #[serde(rename = "repacked")]
    Repacked,
}

impl Carton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Carton::Original => "orginal",
            Carton::Repacked => "repacked",
        }
    }
}

impl FromStr for Carton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "orginal" | "original" => Ok(Carton::Original),
            "repacked" => Ok(Carton::Repacked),
            other => Err(format!("unknown carton state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusProduct {
    #[default]
    Open,
    Saled,
    Canseled,
    Reserved,
}

impl FromStr for StatusProduct {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(StatusProduct::Open),
            "saled" => Ok(StatusProduct::Saled),
            "canseled" => Ok(StatusProduct::Canseled),
            "reserved" => Ok(StatusProduct::Reserved),
            other => Err(format!("unknown product status '{}'", other)),
        }
    }
}

/// Editable listing fields, named as they appear on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Description,
    DescriptionAppearance,
    TechnicalProblem,
    Price,
    CustomerPrice,
    Color,
    BattryHealth,
    BattryChange,
    TypeProduct,
    Auction,
    Guarantor,
    Repaired,
    PartNum,
    StatusProduct,
    Carton,
    Grade,
    ModelMobile,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Description,
        Field::DescriptionAppearance,
        Field::TechnicalProblem,
        Field::Price,
        Field::CustomerPrice,
        Field::Color,
        Field::BattryHealth,
        Field::BattryChange,
        Field::TypeProduct,
        Field::Auction,
        Field::Guarantor,
        Field::Repaired,
        Field::PartNum,
        Field::StatusProduct,
        Field::Carton,
        Field::Grade,
        Field::ModelMobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::DescriptionAppearance => "description_appearance",
            Field::TechnicalProblem => "technical_problem",
            Field::Price => "price",
            Field::CustomerPrice => "customer_price",
            Field::Color => "color",
            Field::BattryHealth => "battry_health",
            Field::BattryChange => "battry_change",
            Field::TypeProduct => "type_product",
            Field::Auction => "auction",
            Field::Guarantor => "guarantor",
            Field::Repaired => "repaired",
            Field::PartNum => "part_num",
            Field::StatusProduct => "status_product",
            Field::Carton => "carton",
            Field::Grade => "grade",
            Field::ModelMobile => "model_mobile",
        }
    }

    /// Checkbox-backed fields
    pub fn is_flag(&self) -> bool {
        matches!(self, Field::BattryChange | Field::Auction | Field::Repaired)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttachmentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A locally selected image waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    source: AttachmentSource,
}

impl Attachment {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            file_name,
            source: AttachmentSource::Path(path),
        }
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source: AttachmentSource::Bytes(bytes),
        }
    }

    /// Load the file contents
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            AttachmentSource::Path(path) => tokio::fs::read(path).await,
            AttachmentSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Durable reference returned once an attachment is stored remotely
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedPicture {
    pub id: i64,
    #[serde(default, alias = "file")]
    pub url: String,
}

/// The in-progress listing edited by the wizard
///
/// Numeric fields stay as entered text until the payload is built, so a
/// half-typed value never gets silently coerced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    pub description: String,
    pub description_appearance: String,
    pub technical_problem: String,
    pub price: String,
    pub customer_price: String,
    pub color: Option<i64>,
    pub battry_health: String,
    pub battry_change: bool,
    pub type_product: ProductType,
    pub auction: bool,
    pub guarantor: String,
    pub repaired: bool,
    pub part_num: String,
    pub status_product: StatusProduct,
    pub carton: Option<Carton>,
    pub grade: Option<Grade>,
    pub model_mobile: Option<i64>,
    pub pictures: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRef {
    pub id: i64,
}

/// Normalized body sent to the product creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProductPayload {
    pub description: String,
    pub description_appearance: String,
    pub technical_problem: String,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_price: Option<i64>,
    pub battry_health: i64,
    pub battry_change: bool,
    pub type_product: ProductType,
    pub auction: bool,
    pub guarantor: i64,
    pub repaired: bool,
    pub part_num: String,
    pub status_product: StatusProduct,
    pub carton: String,
    pub grade: String,
    pub model_mobile: IdRef,
    pub color: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<Vec<IdRef>>,
}

/// Record returned by the backend after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedProduct {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub raw_data: serde_json::Map<String, serde_json::Value>,
}
