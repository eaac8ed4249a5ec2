//! Screen controllers. Each one owns its view state, talks to the API
//! through [`OmsClient`] and reports through [`Collaborators`].

use serde::de::DeserializeOwned;
use shared::domain::Resource;

use crate::{
    events::Collaborators,
    list_loader::{inject_query, ListLoader, LoaderError},
    OmsClient,
};

pub mod bodies;
pub mod campaigns;
pub mod circles;
pub mod members;
pub mod password_reset;
pub mod permissions;
pub mod signup;

/// Attaches a query-filtered loader to `resource` with its usual page size.
pub(crate) async fn open_query_list<T>(
    client: &OmsClient,
    ui: &Collaborators,
    resource: Resource,
) -> Result<ListLoader<T>, LoaderError>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    ListLoader::attach(
        client.clone(),
        resource.path(),
        inject_query(),
        resource.default_page_size(),
        ui.notifier.clone(),
    )
    .await
}

#[cfg(test)]
#[path = "../tests/flows_tests.rs"]
mod tests;
