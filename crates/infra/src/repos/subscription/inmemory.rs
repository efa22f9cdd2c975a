use super::ISubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use subtrack_domain::{Subscription, ID};

pub struct InMemorySubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        insert(subscription, &self.subscriptions);
        Ok(())
    }

    async fn bulk_insert(&self, subscriptions: &[Subscription]) -> anyhow::Result<()> {
        insert_many(subscriptions, &self.subscriptions);
        Ok(())
    }

    async fn find(&self, subscription_id: &ID) -> Option<Subscription> {
        find(subscription_id, &self.subscriptions)
    }

    async fn find_all(&self) -> Vec<Subscription> {
        find_by(&self.subscriptions, |_| true)
    }
}
