pub mod health;
pub mod products;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use products::{
    create_product, delete_all_products, delete_product, get_product, get_products_by_exact_name,
    list_products, search_products_by_name, update_product,
};
