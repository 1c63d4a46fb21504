mod product_handler;
mod product_payload;

pub use product_handler::*;
pub use product_payload::ProductPayload;
