pub mod http;
pub mod traits;
pub mod types;

pub use http::ApiClient;
pub use traits::{CatalogService, PartNumberService, PictureUploadService, ProductCreateService};
