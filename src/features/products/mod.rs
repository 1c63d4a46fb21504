//! Products and their images.
//!
//! Every product owns an uploaded image stored in the local image store under
//! `<sha256 of content><original extension>`. Rows and files are written in an
//! order that never leaves a row pointing at a missing file: the new file is
//! stored before the row is committed, and an old file is removed only after
//! the row stops referencing it.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/products?name=&page=&limit=` | Paginated list with category |
//! | GET | `/products/{id}` | Get a product with category |
//! | POST | `/products` | Create a product (multipart, `image` required) |
//! | PUT | `/products/{id}` | Update a product (multipart, JSON or form) |
//! | DELETE | `/products/{id}` | Delete a product and its image |
//! | GET | `/maintenance/images` | Orphan files and dangling image references |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{PgProductRepository, ProductRepository};
pub use services::{ImageReconciler, ProductService};
