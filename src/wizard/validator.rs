//! Pure validation of the listing snapshot, per step and for the whole form.

use crate::models::{Field, Listing, Model};
use crate::wizard::rules;
use crate::wizard::{Step, ValidationErrors};

const BATTERY_RANGE: &str = "Battery health must be a number between 0 and 100";

/// Errors for the fields owned by `step`
pub fn validate_step(step: Step, listing: &Listing, model: Option<&Model>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    match step {
        Step::Selection => check_selection(listing, model, &mut errors),
        Step::Condition => check_condition(listing, model, &mut errors),
        Step::Pricing => check_pricing(listing, &mut errors),
    }
    errors
}

/// Every step's rules plus the checks that catch values left stale by
/// back-navigation.
pub fn validate_form(listing: &Listing, model: Option<&Model>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for step in Step::ALL {
        errors.merge(validate_step(step, listing, model));
    }

    if !errors.contains(Field::BattryHealth) && !listing.battry_health.trim().is_empty() {
        match parse_whole(&listing.battry_health) {
            Some(value) if value <= 100 => {}
            _ => errors.insert(Field::BattryHealth, BATTERY_RANGE),
        }
    }
    errors
}

/// Digits only, like the form inputs accept, within the range the
/// creation payload carries
fn parse_whole(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

fn check_selection(listing: &Listing, model: Option<&Model>, errors: &mut ValidationErrors) {
    let model = match (listing.model_mobile, model) {
        (Some(id), Some(model)) if model.id == id => model,
        _ => {
            errors.insert(Field::ModelMobile, "Select a phone model");
            if listing.color.is_none() {
                errors.insert(Field::Color, "Select a color");
            }
            return;
        }
    };

    match listing.color {
        None => errors.insert(Field::Color, "Select a color"),
        Some(color) if !model.has_color(color) => {
            errors.insert(Field::Color, "Selected color is not offered for this model")
        }
        Some(_) => {}
    }
}

fn check_condition(listing: &Listing, model: Option<&Model>, errors: &mut ValidationErrors) {
    if rules::battery_required(listing, model) {
        if is_blank(&listing.battry_health) {
            errors.insert(Field::BattryHealth, "Battery health is required");
        } else if !matches!(parse_whole(&listing.battry_health), Some(v) if v <= 100) {
            errors.insert(Field::BattryHealth, BATTERY_RANGE);
        }
        if is_blank(&listing.part_num) {
            errors.insert(Field::PartNum, "Part number is required");
        }
    }

    if is_blank(&listing.guarantor) {
        errors.insert(Field::Guarantor, "Remaining warranty is required");
    } else if parse_whole(&listing.guarantor).is_none() {
        errors.insert(Field::Guarantor, "Warranty must be a non-negative whole number of months");
    }

    if rules::apple_fields_offered(model) && listing.carton.is_none() {
        errors.insert(Field::Carton, "Select the box condition");
    }

    if rules::description_required(listing) && is_blank(&listing.description) {
        errors.insert(Field::Description, "Describe the repair");
    }

    if rules::grade_required(listing) && listing.grade.is_none() {
        errors.insert(Field::Grade, "Select a condition grade");
    } else if !rules::grade_applicable(listing) && listing.grade.is_some() {
        errors.insert(Field::Grade, "New devices are not graded");
    }

    if rules::appearance_solicited(listing) && is_blank(&listing.description_appearance) {
        errors.insert(Field::DescriptionAppearance, "Describe the cosmetic wear");
    }

    if rules::technical_problem_solicited(listing) && is_blank(&listing.technical_problem) {
        errors.insert(Field::TechnicalProblem, "Describe the technical problem");
    }
}

fn check_pricing(listing: &Listing, errors: &mut ValidationErrors) {
    check_positive(&listing.price, Field::Price, "Dealer price", errors);
    check_positive(&listing.customer_price, Field::CustomerPrice, "Customer price", errors);
}

fn check_positive(raw: &str, field: Field, label: &str, errors: &mut ValidationErrors) {
    if is_blank(raw) {
        errors.insert(field, format!("{} is required", label));
    } else if !matches!(parse_whole(raw), Some(v) if v > 0) {
        errors.insert(field, format!("{} must be a positive number", label));
    }
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
