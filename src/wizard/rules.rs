//! Which fields are shown and required, derived from the snapshot alone.

use crate::models::{Grade, Listing, Model, ProductType};

/// Condition grading only applies to devices that are not new
pub fn grade_applicable(listing: &Listing) -> bool {
    listing.type_product != ProductType::New
}

pub fn grade_required(listing: &Listing) -> bool {
    listing.type_product == ProductType::Used
}

pub fn appearance_solicited(listing: &Listing) -> bool {
    grade_applicable(listing) && matches!(listing.grade, Some(Grade::C) | Some(Grade::D))
}

pub fn technical_problem_solicited(listing: &Listing) -> bool {
    grade_applicable(listing) && listing.grade == Some(Grade::D)
}

/// Part number and carton are only asked for Apple devices
pub fn apple_fields_offered(model: Option<&Model>) -> bool {
    model.map(|m| m.is_apple).unwrap_or(false)
}

pub fn battery_required(listing: &Listing, model: Option<&Model>) -> bool {
    apple_fields_offered(model) && listing.type_product != ProductType::New
}

pub fn description_required(listing: &Listing) -> bool {
    listing.repaired
}
