use shared::{domain::Resource, protocol::Permission};

use super::open_query_list;
use crate::{
    events::Collaborators,
    list_loader::{ListLoader, LoaderError},
    OmsClient,
};

pub struct PermissionList {
    pub list: ListLoader<Permission>,
}

impl PermissionList {
    pub async fn open(client: &OmsClient, ui: &Collaborators) -> Result<Self, LoaderError> {
        Ok(Self {
            list: open_query_list(client, ui, Resource::Permissions).await?,
        })
    }
}
