//! Engagement and relationship engine: tri-state reactions, subscriptions,
//! and enriched, paginated views over both.

pub mod aggregate;
pub mod channel;
pub mod config;
pub mod engagement;
pub mod error;
pub mod paginate;
pub mod relationship;
pub mod resolver;

use std::sync::Arc;

use vidora_db::Database;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use paginate::{PageRequest, paginate};

use aggregate::Aggregator;
use channel::ChannelViews;
use engagement::EngagementStore;
use relationship::RelationshipStore;
use resolver::Resolver;

/// Shared handle over the store plus engine settings. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    db: Arc<Database>,
    config: Arc<CoreConfig>,
}

impl Engine {
    pub fn new(db: Arc<Database>, config: CoreConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.db)
    }

    pub fn engagement(&self) -> EngagementStore<'_> {
        EngagementStore::new(&self.db)
    }

    pub fn relationships(&self) -> RelationshipStore<'_> {
        RelationshipStore::new(&self.db, &self.config)
    }

    pub fn aggregator(&self) -> Aggregator<'_> {
        Aggregator::new(&self.db)
    }

    pub fn channels(&self) -> ChannelViews<'_> {
        ChannelViews::new(&self.db)
    }

    pub fn page_request(&self, page: Option<i64>, limit: Option<i64>) -> PageRequest {
        PageRequest::new(page, limit, &self.config)
    }
}
