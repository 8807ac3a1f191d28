use crate::error::{AttachmentUploadError, SubmissionError};
use crate::models::{CreateProductPayload, CreatedProduct, Field, IdRef, Listing, UploadedPicture};
use crate::notify::{Notice, Notifier};
use crate::services::{PictureUploadService, ProductCreateService};
use crate::uploader::AttachmentUploader;
use crate::wizard::{rules, ValidationErrors, WizardController};
use std::sync::Arc;
use tracing::{info, warn};

/// What a successful submission produced
#[derive(Debug)]
pub struct SubmissionReceipt {
    pub product: CreatedProduct,
    pub pictures: Vec<UploadedPicture>,
    pub failed_pictures: Vec<AttachmentUploadError>,
}

/// Final step of the wizard: validate, upload, create.
///
/// Every failure leaves the wizard's draft as it was. Only a created record
/// resets it.
pub struct SubmissionOrchestrator {
    uploader: AttachmentUploader,
    products: Arc<dyn ProductCreateService>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionOrchestrator {
    pub fn new(
        pictures: Arc<dyn PictureUploadService>,
        products: Arc<dyn ProductCreateService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            uploader: AttachmentUploader::new(pictures),
            products,
            notifier,
        }
    }

    pub async fn submit(
        &self,
        wizard: &mut WizardController,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let session = wizard.session().clone();

        if !wizard.validate_all() {
            self.notifier
                .notify(Notice::error("Please fill in all required fields"));
            return Err(SubmissionError::Validation(wizard.errors().clone()));
        }

        let mut payload = match build_payload(wizard.listing(), &[]) {
            Ok(payload) => payload,
            Err(errors) => {
                self.notifier
                    .notify(Notice::error("Please fill in all required fields"));
                wizard.set_errors(errors.clone());
                return Err(SubmissionError::Validation(errors));
            }
        };

        let attachments = wizard.listing().pictures.clone();
        info!("Submitting listing with {} attachment(s)", attachments.len());

        let notifier = &self.notifier;
        let report = self
            .uploader
            .upload_all(&attachments, |err| notifier.notify(Notice::error(err.to_string())))
            .await;

        if !session.is_active() {
            warn!("Session disposed during upload, dropping results");
            return Err(SubmissionError::Abandoned);
        }

        if report.all_failed() {
            self.notifier.notify(Notice::error("Failed to upload images"));
            return Err(SubmissionError::Aborted {
                requested: report.requested(),
                failures: report.failed,
            });
        }

        let references = report.references();
        payload.picture = (!references.is_empty()).then_some(references);

        let created = self.products.create(&payload).await;

        if !session.is_active() {
            warn!("Session disposed before creation finished, dropping result");
            return Err(SubmissionError::Abandoned);
        }

        match created {
            Ok(product) => {
                info!("Created product {}", product.id);
                wizard.reset();
                self.notifier
                    .notify(Notice::success("Product created successfully"));
                Ok(SubmissionReceipt {
                    product,
                    pictures: report.uploaded,
                    failed_pictures: report.failed,
                })
            }
            Err(err) => {
                warn!("Product creation failed: {}", err);
                self.notifier
                    .notify(Notice::error(format!("Failed to create product: {}", err)));
                Err(err.into())
            }
        }
    }
}

/// Normalize the draft into the creation body.
///
/// Blank battery and warranty become 0, a blank customer price is left out
/// and pictures are only included when at least one was stored.
pub fn build_payload(
    listing: &Listing,
    pictures: &[IdRef],
) -> Result<CreateProductPayload, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let price = parse_number(&listing.price, Field::Price, &mut errors).unwrap_or_default();
    let customer_price = if listing.customer_price.trim().is_empty() {
        None
    } else {
        parse_number(&listing.customer_price, Field::CustomerPrice, &mut errors)
    };
    let battry_health = parse_or_zero(&listing.battry_health, Field::BattryHealth, &mut errors);
    let guarantor = parse_or_zero(&listing.guarantor, Field::Guarantor, &mut errors);

    if listing.price.trim().is_empty() {
        errors.insert(Field::Price, "Dealer price is required");
    }
    if listing.model_mobile.is_none() {
        errors.insert(Field::ModelMobile, "Select a phone model");
    }
    if listing.color.is_none() {
        errors.insert(Field::Color, "Select a color");
    }

    let (Some(model_id), Some(color), true) = (listing.model_mobile, listing.color, errors.is_empty())
    else {
        return Err(errors);
    };

    Ok(CreateProductPayload {
        description: listing.description.clone(),
        description_appearance: listing.description_appearance.clone(),
        technical_problem: listing.technical_problem.clone(),
        price,
        customer_price,
        battry_health,
        battry_change: listing.battry_change,
        type_product: listing.type_product,
        auction: listing.auction,
        guarantor,
        repaired: listing.repaired,
        part_num: listing.part_num.clone(),
        status_product: listing.status_product,
        carton: listing.carton.map(|c| c.as_str()).unwrap_or_default().to_string(),
        grade: listing
            .grade
            .filter(|_| rules::grade_applicable(listing))
            .map(|g| g.as_str())
            .unwrap_or_default()
            .to_string(),
        model_mobile: IdRef { id: model_id },
        color,
        picture: (!pictures.is_empty()).then(|| pictures.to_vec()),
    })
}

fn parse_number(raw: &str, field: Field, errors: &mut ValidationErrors) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            if !raw.trim().is_empty() {
                errors.insert(field, format!("{} must be a whole number", field));
            }
            None
        }
    }
}

fn parse_or_zero(raw: &str, field: Field, errors: &mut ValidationErrors) -> i64 {
    if raw.trim().is_empty() {
        return 0;
    }
    parse_number(raw, field, errors).unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
