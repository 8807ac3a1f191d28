use crate::error::ServiceError;
use crate::models::{Color, Model, PartNumber};
use crate::services::{CatalogService, PartNumberService};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Load state of the model catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Idle,
    Loading,
    Ready(Vec<Model>),
    Failed(ServiceError),
}

/// Session-scoped cache over the catalog and part-number services
///
/// A failed load is kept as `Failed` and only re-attempted when the caller
/// asks again.
pub struct CatalogProvider {
    models: Arc<dyn CatalogService>,
    part_numbers: Arc<dyn PartNumberService>,
    state: CatalogState,
    part_number_cache: Option<Vec<PartNumber>>,
}

impl CatalogProvider {
    pub fn new(models: Arc<dyn CatalogService>, part_numbers: Arc<dyn PartNumberService>) -> Self {
        Self {
            models,
            part_numbers,
            state: CatalogState::Idle,
            part_number_cache: None,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Fetch the catalog unless it is already cached
    pub async fn load(&mut self) -> Result<&[Model], ServiceError> {
        if !matches!(self.state, CatalogState::Ready(_)) {
            self.state = CatalogState::Loading;
            debug!("Loading model catalog");
            self.state = match self.models.list_models().await {
                Ok(models) => {
                    info!("Loaded {} device models", models.len());
                    CatalogState::Ready(models)
                }
                Err(err) => {
                    warn!("Catalog load failed: {}", err);
                    CatalogState::Failed(err)
                }
            };
        }

        match &self.state {
            CatalogState::Failed(err) => Err(err.clone()),
            _ => Ok(self.models()),
        }
    }

    /// Cached models; empty until a load succeeds
    pub fn models(&self) -> &[Model] {
        match &self.state {
            CatalogState::Ready(models) => models,
            _ => &[],
        }
    }

    pub fn find(&self, id: i64) -> Option<&Model> {
        self.models().iter().find(|model| model.id == id)
    }

    /// Models whose name or brand contains `term`, ignoring case
    pub fn filter(&self, term: &str) -> ModelFilter<'_> {
        ModelFilter {
            models: self.models().iter(),
            needle: term.trim().to_lowercase(),
        }
    }

    pub async fn part_numbers(&mut self) -> Result<&[PartNumber], ServiceError> {
        if self.part_number_cache.is_none() {
            let list = self.part_numbers.list().await?;
            debug!("Loaded {} part numbers", list.len());
            self.part_number_cache = Some(list);
        }
        Ok(self.part_number_cache.as_deref().unwrap_or_default())
    }
}

/// Lazy filtered view over the catalog; clone it to restart
#[derive(Debug, Clone)]
pub struct ModelFilter<'a> {
    models: std::slice::Iter<'a, Model>,
    needle: String,
}

impl<'a> Iterator for ModelFilter<'a> {
    type Item = &'a Model;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.models.by_ref().find(|model| {
            needle.is_empty()
                || model.model_name.to_lowercase().contains(needle.as_str())
                || model.brand.to_lowercase().contains(needle.as_str())
        })
    }
}

/// Colors whose name or hex code contains `term`, ignoring case
pub fn filter_colors<'a>(
    colors: &'a [Color],
    term: &str,
) -> impl Iterator<Item = &'a Color> + Clone + 'a {
    let needle = term.trim().to_lowercase();
    colors.iter().filter(move |color| {
        needle.is_empty()
            || color.name.to_lowercase().contains(&needle)
            || color.hex_code.to_lowercase().contains(&needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_models, FakeCatalog, FakePartNumbers};

    fn provider(catalog: Arc<FakeCatalog>) -> CatalogProvider {
        CatalogProvider::new(catalog, Arc::new(FakePartNumbers::default()))
    }

    #[tokio::test]
    async fn load_is_cached_for_the_session() {
        let catalog = Arc::new(FakeCatalog::new(sample_models()));
        let mut provider = provider(catalog.clone());

        assert_eq!(provider.load().await.expect("load").len(), 3);
        assert_eq!(provider.load().await.expect("load").len(), 3);
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn failure_surfaces_as_state_until_asked_again() {
        let catalog = Arc::new(FakeCatalog::failing("offline"));
        let mut provider = provider(catalog.clone());

        let err = provider.load().await.expect_err("must fail");
        assert_eq!(err, ServiceError::Transport("offline".to_string()));
        assert!(matches!(provider.state(), CatalogState::Failed(_)));
        assert!(provider.models().is_empty());
        assert_eq!(catalog.calls(), 1);

        let _ = provider.load().await;
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn filter_matches_name_or_brand_case_insensitively() {
        let mut provider = provider(Arc::new(FakeCatalog::new(sample_models())));
        provider.load().await.expect("load");

        let names = |term: &str| -> Vec<String> {
            provider
                .filter(term)
                .map(|m| m.model_name.clone())
                .collect()
        };

        assert_eq!(names("IPHONE"), vec!["iPhone 13", "iPhone 11"]);
        assert_eq!(names("samsung"), vec!["Galaxy S22"]);
        assert_eq!(names("  ").len(), 3);
        assert!(names("pixel").is_empty());
    }

    #[tokio::test]
    async fn filter_view_is_restartable() {
        let mut provider = provider(Arc::new(FakeCatalog::new(sample_models())));
        provider.load().await.expect("load");

        let view = provider.filter("apple");
        assert_eq!(view.clone().count(), 2);
        assert_eq!(view.count(), 2);
    }

    #[test]
    fn colors_filter_by_name_or_hex() {
        let colors = sample_models()[0].colors.clone();
        let by_name: Vec<i64> = filter_colors(&colors, "mid").map(|c| c.id).collect();
        assert_eq!(by_name, vec![10]);
        let by_hex: Vec<i64> = filter_colors(&colors, "#F5").map(|c| c.id).collect();
        assert_eq!(by_hex, vec![11]);
        assert_eq!(filter_colors(&colors, "").count(), colors.len());
    }

    #[tokio::test]
    async fn part_numbers_are_fetched_once() {
        let part_numbers = Arc::new(FakePartNumbers::default());
        let mut provider = CatalogProvider::new(
            Arc::new(FakeCatalog::new(sample_models())),
            part_numbers.clone(),
        );

        assert_eq!(provider.part_numbers().await.expect("parts").len(), 2);
        assert_eq!(provider.part_numbers().await.expect("parts").len(), 2);
        assert_eq!(part_numbers.calls(), 1);
    }
}
