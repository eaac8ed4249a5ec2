use shared::{
    domain::{MemberId, Resource},
    error::FieldErrors,
    protocol::{Body, Member, MemberUpdateRequest},
};
use tracing::info;

use super::open_query_list;
use crate::{
    events::{Collaborators, ModalId, Route},
    forms::{settle, settle_form, Outcome},
    list_loader::{ListLoader, LoaderError},
    routes::member_route,
    OmsClient,
};

pub struct MemberList {
    pub list: ListLoader<Member>,
}

impl MemberList {
    pub async fn open(client: &OmsClient, ui: &Collaborators) -> Result<Self, LoaderError> {
        Ok(Self {
            list: open_query_list(client, ui, Resource::Members).await?,
        })
    }
}

/// Inline member card resolved from an id.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberPreview {
    Fetching,
    Loaded(Member),
    Unavailable,
}

impl MemberPreview {
    pub fn message(&self) -> &'static str {
        match self {
            MemberPreview::Fetching => "Fetching user",
            MemberPreview::Loaded(_) => "",
            MemberPreview::Unavailable => "Could not fetch",
        }
    }
}

/// Resolves a member card. Failures stay on the card, no toast.
pub async fn preview_member(client: &OmsClient, member_id: MemberId) -> MemberPreview {
    match client.fetch::<Member>(&member_route(member_id)).await {
        Ok(member) => MemberPreview::Loaded(member),
        Err(_) => MemberPreview::Unavailable,
    }
}

pub struct Profile {
    client: OmsClient,
    ui: Collaborators,
    member_id: MemberId,
    pub member: Option<Member>,
    pub errors: FieldErrors,
}

impl Profile {
    pub async fn open(client: &OmsClient, ui: &Collaborators, member_id: MemberId) -> Self {
        let mut profile = Self {
            client: client.clone(),
            ui: ui.clone(),
            member_id,
            member: None,
            errors: FieldErrors::new(),
        };
        profile.load().await;
        profile
    }

    pub async fn load(&mut self) -> Outcome<()> {
        let result = self.client.fetch::<Member>(&member_route(self.member_id)).await;
        settle(result, self.ui.notifier.as_ref()).map(|member| self.member = Some(member))
    }

    pub fn show_edit_modal(&self) {
        self.ui.modal.open(ModalId::EditProfile);
    }

    pub async fn save(&mut self) -> Outcome<()> {
        let Some(member) = &self.member else {
            return Outcome::Skipped;
        };
        let result = self
            .client
            .update::<_, Member>(&member_route(self.member_id), &MemberUpdateRequest { member })
            .await;
        match settle_form(result, &mut self.errors, self.ui.notifier.as_ref()) {
            Outcome::Done(_) => {
                self.ui.modal.close(ModalId::EditProfile);
                self.ui.notifier.show_success("Successfully edited profile");
                self.load().await;
                Outcome::Done(())
            }
            other => other.map(|_| ()),
        }
    }

    /// Applies a typeahead pick; `None` clears the primary body.
    pub fn set_primary_body(&mut self, body: Option<Body>) {
        let Some(member) = self.member.as_mut() else {
            return;
        };
        member.primary_body_id = body.as_ref().and_then(|body| body.id);
        member.primary_body = body.map(Box::new);
    }

    pub async fn delete(&mut self) -> Outcome<()> {
        let result = self.client.delete(&member_route(self.member_id)).await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            info!(member_id = %self.member_id, "member deleted");
            self.ui.notifier.show_success(
                "Member deleted successfully. It might take some time until the login is deactivated",
            );
            self.ui.navigator.go(Route::Dashboard);
        }
        outcome
    }
}
