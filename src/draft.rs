use crate::error::WizardError;
use crate::models::Field;
use crate::wizard::{FieldValue, WizardController};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Fields whose side effects reset others; they go in first
const LEADING_FIELDS: [Field; 4] = [
    Field::ModelMobile,
    Field::Color,
    Field::TypeProduct,
    Field::Grade,
];

/// Listing values read from a JSON file, keyed by wire field name
#[derive(Debug, Default)]
pub struct Draft {
    fields: BTreeMap<Field, Value>,
}

impl Draft {
    pub fn from_json(raw: &str) -> Result<Self> {
        let fields = serde_json::from_str(raw).context("Draft must be a JSON object of listing fields")?;
        Ok(Self { fields })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read draft {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Feed every value through the wizard as if typed by the user
    pub fn apply(&self, wizard: &mut WizardController) -> Result<(), WizardError> {
        let rest = self
            .fields
            .keys()
            .copied()
            .filter(|field| !LEADING_FIELDS.contains(field));

        for field in LEADING_FIELDS.into_iter().chain(rest) {
            if let Some(value) = self.fields.get(&field) {
                debug!("Draft sets {}", field);
                wizard.set_field(field, to_field_value(field, value)?)?;
            }
        }
        Ok(())
    }
}

fn to_field_value(field: Field, value: &Value) -> Result<FieldValue, WizardError> {
    match value {
        Value::Bool(checked) => Ok(FieldValue::Checked(*checked)),
        Value::String(text) => Ok(FieldValue::Text(text.clone())),
        Value::Number(number) => Ok(FieldValue::Text(number.to_string())),
        Value::Null => Ok(FieldValue::Text(String::new())),
        _ => Err(WizardError::InvalidValue {
            field: field.to_string(),
            reason: "expected a string, number or boolean".to_string(),
        }),
    }
}
