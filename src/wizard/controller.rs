use crate::catalog::{filter_colors, CatalogProvider, ModelFilter};
use crate::error::WizardError;
use crate::models::{
    Attachment, Carton, Color, Field, Grade, Listing, Model, PartNumber, ProductType,
    StatusProduct,
};
use crate::wizard::rules;
use crate::wizard::session::SessionHandle;
use crate::wizard::validator::{validate_form, validate_step};
use crate::wizard::{Step, ValidationErrors};
use std::str::FromStr;
use tracing::{debug, info};

/// Raw input for `set_field`: typed text or a checkbox state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Checked(value)
    }
}

/// Which pickers are open; purely presentational
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dropdowns {
    pub models_open: bool,
    pub colors_open: bool,
}

/// Owns one listing draft and walks it through the wizard steps
pub struct WizardController {
    listing: Listing,
    step: Step,
    errors: ValidationErrors,
    selected_model: Option<Model>,
    available_colors: Vec<Color>,
    dropdowns: Dropdowns,
    search_term: String,
    color_search: String,
    catalog: CatalogProvider,
    session: SessionHandle,
}

impl WizardController {
    pub fn new(catalog: CatalogProvider) -> Self {
        Self {
            listing: Listing::default(),
            step: Step::default(),
            errors: ValidationErrors::new(),
            selected_model: None,
            available_colors: Vec::new(),
            dropdowns: Dropdowns::default(),
            search_term: String::new(),
            color_search: String::new(),
            catalog,
            session: SessionHandle::new(),
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn selected_model(&self) -> Option<&Model> {
        self.selected_model.as_ref()
    }

    pub fn available_colors(&self) -> &[Color] {
        &self.available_colors
    }

    pub fn dropdowns(&self) -> Dropdowns {
        self.dropdowns
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn catalog(&self) -> &CatalogProvider {
        &self.catalog
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Make sure the catalog is available; returns how many models it holds
    pub async fn load_catalog(&mut self) -> Result<usize, WizardError> {
        self.catalog
            .load()
            .await
            .map(|models| models.len())
            .map_err(|err| WizardError::CatalogUnavailable(err.to_string()))
    }

    /// Part number options; only fetched when an Apple model is selected
    pub async fn part_number_options(&mut self) -> Result<Vec<PartNumber>, WizardError> {
        if !rules::apple_fields_offered(self.selected_model.as_ref()) {
            return Ok(Vec::new());
        }
        self.catalog
            .part_numbers()
            .await
            .map(|list| list.to_vec())
            .map_err(|err| WizardError::CatalogUnavailable(err.to_string()))
    }

    pub fn filtered_models(&self) -> ModelFilter<'_> {
        self.catalog.filter(&self.search_term)
    }

    pub fn filtered_colors(&self) -> impl Iterator<Item = &Color> + Clone + '_ {
        filter_colors(&self.available_colors, &self.color_search)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.dropdowns.models_open = !self.search_term.is_empty();
        if self.search_term.is_empty() {
            self.clear_model();
        }
    }

    pub fn set_color_search(&mut self, term: impl Into<String>) {
        self.color_search = term.into();
    }

    pub fn show_color_dropdown(&mut self, open: bool) {
        self.dropdowns.colors_open = open;
    }

    /// Pick a model; its palette replaces the color options in one step
    pub fn select_model(&mut self, model: Model) {
        debug!("Selected model {} ({})", model.id, model.label());

        self.listing.model_mobile = Some(model.id);
        self.listing.color = None;
        if model.is_apple {
            self.listing.part_num = model.part_number.clone().unwrap_or_default();
            if self.listing.battry_health.trim().is_empty() {
                self.listing.battry_health = "100".to_string();
            }
            self.listing.carton = self.listing.carton.or(Some(Carton::Original));
        } else {
            self.listing.part_num.clear();
            self.listing.carton = None;
            self.listing.battry_health = match self.listing.type_product {
                ProductType::New => "100".to_string(),
                _ => String::new(),
            };
        }

        self.search_term = model.label();
        self.available_colors = model.colors.clone();
        self.selected_model = Some(model);
        self.color_search.clear();
        self.dropdowns = Dropdowns::default();
        self.errors.remove(Field::ModelMobile);
    }

    pub fn select_model_by_id(&mut self, id: i64) -> Result<(), WizardError> {
        let model = self
            .catalog
            .find(id)
            .cloned()
            .ok_or(WizardError::UnknownModel(id))?;
        self.select_model(model);
        Ok(())
    }

    pub fn clear_model(&mut self) {
        self.selected_model = None;
        self.available_colors.clear();
        self.listing.model_mobile = None;
        self.listing.color = None;
        self.listing.part_num.clear();
        self.color_search.clear();
        self.dropdowns.colors_open = false;
    }

    pub fn select_color(&mut self, color_id: i64) -> Result<(), WizardError> {
        if self.selected_model.is_none() {
            return Err(WizardError::NoModelSelected);
        }
        if !self.available_colors.iter().any(|c| c.id == color_id) {
            return Err(WizardError::ColorNotInPalette(color_id));
        }

        self.listing.color = Some(color_id);
        self.dropdowns.colors_open = false;
        self.errors.remove(Field::Color);
        Ok(())
    }

    /// Replace the pending attachments
    pub fn attach(&mut self, attachments: Vec<Attachment>) {
        self.listing.pictures = attachments;
    }

    /// Generic form input. Values are coerced per field; the dependent
    /// fields of `grade`, `type_product`, `model_mobile` and `color` are
    /// updated in the same call.
    pub fn set_field(
        &mut self,
        field: Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        let value = value.into();

        if field.is_flag() {
            let checked = match &value {
                FieldValue::Checked(checked) => *checked,
                FieldValue::Text(text) => parse_flag(field, text)?,
            };
            match field {
                Field::BattryChange => self.listing.battry_change = checked,
                Field::Auction => self.listing.auction = checked,
                _ => self.listing.repaired = checked,
            }
            self.errors.remove(field);
            return Ok(());
        }

        let text = match value {
            FieldValue::Text(text) => text,
            FieldValue::Checked(_) => {
                return Err(WizardError::InvalidValue {
                    field: field.to_string(),
                    reason: "expected text, got a checkbox value".to_string(),
                })
            }
        };

        match field {
            Field::ModelMobile => match parse_id(&text) {
                Some(id) => self.select_model_by_id(id)?,
                None => self.clear_model(),
            },
            Field::Color => match parse_id(&text) {
                Some(id) => self.select_color(id)?,
                None => self.listing.color = None,
            },
            Field::TypeProduct => self.set_type_product(parse_choice(field, &text)?),
            Field::Grade => {
                let grade = if text.trim().is_empty() {
                    None
                } else if !rules::grade_applicable(&self.listing) {
                    return Err(WizardError::InvalidValue {
                        field: field.to_string(),
                        reason: "new devices are not graded".to_string(),
                    });
                } else {
                    Some(parse_choice::<Grade>(field, &text)?)
                };
                self.set_grade(grade);
            }
            Field::Carton => {
                self.listing.carton = if text.trim().is_empty() {
                    None
                } else {
                    Some(parse_choice(field, &text)?)
                };
            }
            Field::StatusProduct => {
                self.listing.status_product = parse_choice::<StatusProduct>(field, &text)?
            }
            Field::Description => self.listing.description = text,
            Field::DescriptionAppearance => self.listing.description_appearance = text,
            Field::TechnicalProblem => self.listing.technical_problem = text,
            Field::Price => self.listing.price = text,
            Field::CustomerPrice => self.listing.customer_price = text,
            Field::BattryHealth => self.listing.battry_health = text,
            Field::Guarantor => self.listing.guarantor = text,
            Field::PartNum => self.listing.part_num = text,
            Field::BattryChange | Field::Auction | Field::Repaired => {}
        }

        self.errors.remove(field);
        Ok(())
    }

    fn set_type_product(&mut self, type_product: ProductType) {
        self.listing.type_product = type_product;
        match type_product {
            ProductType::New => {
                self.listing.battry_change = false;
                self.listing.repaired = false;
                self.listing.battry_health = "100".to_string();
                self.set_grade(None);
            }
            ProductType::Used => {
                let grade = self.listing.grade.or(Some(Grade::A));
                self.set_grade(grade);
            }
            ProductType::AsNew => self.set_grade(None),
        }
    }

    fn set_grade(&mut self, grade: Option<Grade>) {
        self.listing.grade = grade;
        if !rules::appearance_solicited(&self.listing) {
            self.listing.description_appearance.clear();
        }
        if !rules::technical_problem_solicited(&self.listing) {
            self.listing.technical_problem.clear();
        }
    }

    /// Move forward if the current step validates; errors stay visible otherwise
    pub fn advance(&mut self) -> bool {
        self.errors = validate_step(self.step, &self.listing, self.selected_model.as_ref());
        if !self.errors.is_empty() {
            debug!(
                "Step {} blocked by {} error(s)",
                self.step.index(),
                self.errors.len()
            );
            return false;
        }

        if let Some(next) = self.step.next() {
            self.step = next;
        }
        true
    }

    pub fn retreat(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Whole-form check run before submitting; stores the errors it finds
    pub fn validate_all(&mut self) -> bool {
        self.errors = validate_form(&self.listing, self.selected_model.as_ref());
        self.errors.is_empty()
    }

    /// Surface errors found outside the per-step checks
    pub fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    /// Back to the empty draft. The catalog cache and session survive.
    pub fn reset(&mut self) {
        self.listing = Listing::default();
        self.step = Step::default();
        self.errors = ValidationErrors::new();
        self.selected_model = None;
        self.available_colors.clear();
        self.dropdowns = Dropdowns::default();
        self.search_term.clear();
        self.color_search.clear();
    }

    /// Drop the draft and detach anything still in flight for it
    pub fn abandon(&mut self) {
        info!("Abandoning listing draft");
        self.session.dispose();
        self.session = SessionHandle::new();
        self.reset();
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_flag(field: Field, raw: &str) -> Result<bool, WizardError> {
    match raw.trim() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" | "" => Ok(false),
        other => Err(WizardError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not a checkbox value", other),
        }),
    }
}

fn parse_choice<T>(field: Field, raw: &str) -> Result<T, WizardError>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(|reason| WizardError::InvalidValue {
        field: field.to_string(),
        reason,
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
