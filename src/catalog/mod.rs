//! Catalog module
//!
//! Product catalog: brands, categories, products with their variants,
//! images, nutrition facts and per-variant supplement facts. Initial product
//! creation goes through the all-or-nothing `writer`; later edits to
//! variants, images and supplement facts use their own repositories.
//! Everything is read/CRUD with soft-delete filtering.

pub mod brands;
pub mod categories;
pub mod images;
pub mod products;
pub mod variants;
pub mod writer;

pub use brands::BrandRepository;
pub use categories::CategoryRepository;
pub use images::ImageRepository;
pub use products::ProductQuery;
pub use variants::VariantRepository;
pub use writer::{
    CreateProductResult, NewNutritionFact, NewProductAggregate, NewProductImage,
    NewProductVariant, ProductAggregateWriter, UpdateProduct,
};
