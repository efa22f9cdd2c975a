mod inmemory;

pub use inmemory::InMemorySubscriptionRepo;
use subtrack_domain::{Subscription, ID};

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn bulk_insert(&self, subscriptions: &[Subscription]) -> anyhow::Result<()>;
    async fn find(&self, subscription_id: &ID) -> Option<Subscription>;
    async fn find_all(&self) -> Vec<Subscription>;
}
