//! Product categories.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/categories?name=` | List categories, filtered by name substring |
//! | GET | `/categories/{id}` | Get a category |
//! | POST | `/categories` | Create a category |
//! | PUT | `/categories/{id}` | Rename a category |
//! | DELETE | `/categories/{id}` | Delete a category without products |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{CategoryRepository, PgCategoryRepository};
pub use services::CategoryService;
