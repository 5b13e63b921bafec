use actix::Addr;
use sqlx::PgPool;
use std::sync::Arc;

use crate::actors::OutboxRelay;
use crate::config::AppConfig;
use crate::domain::discount::DiscountAggregate;
use crate::domain::instagram::{InstagramSyncHandler, MediaSource};
use crate::domain::interest::InterestCommandHandler;
use crate::domain::invoice::InvoiceAggregate;
use crate::domain::order::OrderCommandHandler;
use crate::domain::product::ProductAggregate;
use crate::domain::user::UserAggregate;
use crate::metrics::Metrics;
use crate::persistence::{CommandHandler, DocumentStore};

/// Shared by every route handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub metrics: Arc<Metrics>,

    pub users: CommandHandler<UserAggregate>,
    pub products: CommandHandler<ProductAggregate>,
    pub discounts: CommandHandler<DiscountAggregate>,
    pub invoices: CommandHandler<InvoiceAggregate>,
    pub orders: OrderCommandHandler,
    pub interests: InterestCommandHandler,
    pub instagram: InstagramSyncHandler,

    pub relay: Option<Addr<OutboxRelay>>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: Arc<AppConfig>,
        metrics: Arc<Metrics>,
        media_source: Arc<dyn MediaSource>,
        relay: Option<Addr<OutboxRelay>>,
    ) -> Self {
        Self {
            users: CommandHandler::new(DocumentStore::new(pool.clone())),
            products: CommandHandler::new(DocumentStore::new(pool.clone())),
            discounts: CommandHandler::new(DocumentStore::new(pool.clone())),
            invoices: CommandHandler::new(DocumentStore::new(pool.clone())),
            orders: OrderCommandHandler::new(pool.clone(), config.pricing.clone()),
            interests: InterestCommandHandler::new(pool.clone()),
            instagram: InstagramSyncHandler::new(pool.clone(), media_source),
            pool,
            config,
            metrics,
            relay,
        }
    }
}
