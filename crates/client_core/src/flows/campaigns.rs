use shared::{
    domain::{CampaignId, Resource},
    protocol::Campaign,
};

use super::open_query_list;
use crate::{
    events::Collaborators,
    forms::{settle, Outcome},
    list_loader::{ListLoader, LoaderError},
    routes::campaign_route,
    OmsClient,
};

/// Recruitment campaigns as seen by administrators.
pub struct CampaignList {
    pub list: ListLoader<Campaign>,
}

impl CampaignList {
    pub async fn open(client: &OmsClient, ui: &Collaborators) -> Result<Self, LoaderError> {
        Ok(Self {
            list: open_query_list(client, ui, Resource::Campaigns).await?,
        })
    }
}

pub struct CampaignDetail {
    client: OmsClient,
    ui: Collaborators,
    campaign_id: CampaignId,
    pub campaign: Option<Campaign>,
}

impl CampaignDetail {
    pub async fn open(client: &OmsClient, ui: &Collaborators, campaign_id: CampaignId) -> Self {
        let mut detail = Self {
            client: client.clone(),
            ui: ui.clone(),
            campaign_id,
            campaign: None,
        };
        detail.load().await;
        detail
    }

    pub async fn load(&mut self) -> Outcome<()> {
        let result = self
            .client
            .fetch::<Campaign>(&campaign_route(self.campaign_id))
            .await;
        settle(result, self.ui.notifier.as_ref()).map(|campaign| self.campaign = Some(campaign))
    }
}
