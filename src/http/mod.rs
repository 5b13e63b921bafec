// ============================================================================
// HTTP Layer - actix-web routes under /api
// ============================================================================
//
// Handlers authenticate through the extractors, run a domain command or a
// read query, and answer with JSON. Static segments are registered before
// `/{id}` so they are matched first.
//
// ============================================================================

pub mod client_config;
pub mod discounts;
pub mod extractors;
pub mod health;
pub mod instagram;
pub mod interests;
pub mod invoices;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod state;
pub mod users;

use actix_web::web;
use serde::{Deserialize, Deserializer};

pub use middleware::{cors_headers, observe, preflight};
pub use state::AppState;

use crate::error::AppError;

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`)
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Malformed bodies and query strings become JSON 400s
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(1 << 20)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default().error_handler(|_err, _req| AppError::NotFound("Resource").into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health))
            .service(
                web::scope("/users")
                    .route("/register", web::post().to(users::register))
                    .route("/signin", web::post().to(users::signin))
                    .route("/profile", web::put().to(users::update_profile))
                    .route("/brands", web::get().to(users::list_brands))
                    .route("", web::get().to(users::list_users))
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::put().to(users::admin_update_user))
                    .route("/{id}", web::delete().to(users::delete_user))
                    .route("/{id}/approve-brand", web::put().to(users::approve_brand))
                    .route("/{id}/revoke-brand", web::put().to(users::revoke_brand)),
            )
            .service(
                web::scope("/interests")
                    .route("", web::post().to(interests::submit))
                    .route("", web::get().to(interests::list))
                    .route("/{id}/approve", web::put().to(interests::approve))
                    .route("/{id}/reject", web::put().to(interests::reject)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(products::search))
                    .route("", web::post().to(products::create_product))
                    .route("/search", web::get().to(products::search))
                    .route("/categories", web::get().to(products::categories))
                    .route("/mine", web::get().to(products::mine))
                    .route("/{id}", web::get().to(products::get_product))
                    .route("/{id}", web::put().to(products::update_product))
                    .route("/{id}", web::delete().to(products::delete_product))
                    .route("/{id}/reviews", web::post().to(products::add_review)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(orders::place_order))
                    .route("", web::get().to(orders::list_orders))
                    .route("/mine", web::get().to(orders::mine))
                    .route("/brand", web::get().to(orders::brand_orders))
                    .route("/summary", web::get().to(orders::summary))
                    .route("/brand-summary", web::get().to(orders::brand_summary))
                    .route("/{id}", web::get().to(orders::get_order))
                    .route("/{id}", web::delete().to(orders::delete_order))
                    .route("/{id}/pay", web::put().to(orders::pay_order))
                    .route("/{id}/dispatch", web::put().to(orders::dispatch_brand))
                    .route("/{id}/deliver-brand", web::put().to(orders::deliver_brand))
                    .route("/{id}/deliver", web::put().to(orders::deliver_order))
                    .route("/{id}/invoices", web::get().to(orders::order_invoices)),
            )
            .service(
                web::scope("/invoices")
                    .route("", web::get().to(invoices::list))
                    .route("/mine", web::get().to(invoices::mine))
                    .route("/{id}/settle", web::put().to(invoices::settle)),
            )
            .service(
                web::scope("/discounts")
                    .route("", web::post().to(discounts::create))
                    .route("", web::get().to(discounts::list))
                    .route("/validate", web::post().to(discounts::validate))
                    .route("/{id}", web::put().to(discounts::update))
                    .route("/{id}", web::delete().to(discounts::delete)),
            )
            .service(
                web::scope("/instagram")
                    .route("", web::get().to(instagram::feed))
                    .route("/all", web::get().to(instagram::list_all))
                    .route("/sync", web::post().to(instagram::sync))
                    .route("/{id}", web::put().to(instagram::curate)),
            )
            .service(
                web::scope("/config")
                    .route("/paypal", web::get().to(client_config::paypal))
                    .route("/stripe", web::get().to(client_config::stripe))
                    .route("/google", web::get().to(client_config::google)),
            ),
    );
}
