use shared::{
    domain::{BodyId, Resource},
    error::FieldErrors,
    protocol::{
        Body, BodyMembership, BodyMembershipUpdateRequest, BodyWriteRequest, Circle,
        CircleWriteRequest, JoinBodyRequest, JoinRequest, JoinRequestPayload, ProcessJoinRequest,
    },
};
use tracing::info;

use super::open_query_list;
use crate::{
    events::{Collaborators, ModalId, Route},
    forms::{settle, settle_form, Outcome},
    list_loader::{inject_query, ListLoader, LoaderError, DEFAULT_PAGE_SIZE},
    routes::{
        body_circles_route, body_members_route, body_membership_route, body_route,
        join_request_route,
    },
    OmsClient,
};

pub struct BodyListing {
    client: OmsClient,
    ui: Collaborators,
    pub list: ListLoader<Body>,
    pub draft: Body,
    pub errors: FieldErrors,
}

impl BodyListing {
    pub async fn open(client: &OmsClient, ui: &Collaborators) -> Result<Self, LoaderError> {
        Ok(Self {
            client: client.clone(),
            ui: ui.clone(),
            list: open_query_list(client, ui, Resource::Bodies).await?,
            draft: Body::default(),
            errors: FieldErrors::new(),
        })
    }

    pub fn show_create_modal(&self) {
        self.ui.modal.open(ModalId::EditBody);
    }

    /// Creates `draft` and reloads the listing so the new body shows up.
    pub async fn save(&mut self) -> Outcome<Body> {
        let result = self
            .client
            .create::<_, Body>(
                &Resource::Bodies.path(),
                &BodyWriteRequest { body: &self.draft },
            )
            .await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.modal.close(ModalId::EditBody);
            self.ui.notifier.show_success("Successfully added body");
            self.draft = Body::default();
            self.list.reset_data().await;
        }
        outcome
    }
}

pub struct BodyDetail {
    client: OmsClient,
    ui: Collaborators,
    body_id: BodyId,
    pub body: Option<Body>,
    pub edited_circle: Circle,
    pub errors: FieldErrors,
}

impl BodyDetail {
    pub async fn open(client: &OmsClient, ui: &Collaborators, body_id: BodyId) -> Self {
        let mut detail = Self {
            client: client.clone(),
            ui: ui.clone(),
            body_id,
            body: None,
            edited_circle: Circle::default(),
            errors: FieldErrors::new(),
        };
        detail.load().await;
        detail
    }

    pub fn body_id(&self) -> BodyId {
        self.body_id
    }

    pub async fn load(&mut self) -> Outcome<()> {
        let result = self.client.fetch::<Body>(&body_route(self.body_id)).await;
        settle(result, self.ui.notifier.as_ref()).map(|body| self.body = Some(body))
    }

    pub fn show_edit_modal(&self) {
        self.ui.modal.open(ModalId::EditBody);
    }

    pub async fn save(&mut self) -> Outcome<()> {
        let Some(body) = &self.body else {
            return Outcome::Skipped;
        };
        let result = self
            .client
            .update::<_, Body>(&body_route(self.body_id), &BodyWriteRequest { body })
            .await;
        match settle_form(result, &mut self.errors, self.ui.notifier.as_ref()) {
            Outcome::Done(_) => {
                self.ui.modal.close(ModalId::EditBody);
                self.ui.notifier.show_success("Successfully updated body");
                self.load().await;
                Outcome::Done(())
            }
            other => other.map(|_| ()),
        }
    }

    pub async fn delete(&mut self) -> Outcome<()> {
        let result = self.client.delete(&body_route(self.body_id)).await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            info!(body_id = %self.body_id, "body deleted");
            self.ui
                .notifier
                .show_success("Body and all bound circles were deleted successfully");
            self.ui.navigator.go(Route::Bodies);
        }
        outcome
    }

    pub fn create_circle(&mut self) {
        self.edited_circle = Circle::default();
        self.ui.modal.open(ModalId::EditCircle);
    }

    /// Creates `edited_circle` as a circle bound to this body.
    pub async fn save_circle(&mut self) -> Outcome<Circle> {
        let result = self
            .client
            .create::<_, Circle>(
                &body_circles_route(self.body_id),
                &CircleWriteRequest {
                    circle: &self.edited_circle,
                },
            )
            .await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.notifier.show_success("Circle successfully created");
            self.ui.modal.close(ModalId::EditCircle);
        }
        outcome
    }

    pub fn show_join_modal(&self) {
        self.ui.modal.open(ModalId::JoinRequest);
    }

    pub async fn send_join_request(&mut self, motivation: &str) -> Outcome<()> {
        let result = self
            .client
            .post_action(
                &body_members_route(self.body_id),
                Some(&JoinBodyRequest {
                    join_request: JoinRequestPayload { motivation },
                }),
            )
            .await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.notifier.show_success("Join request sent");
            self.ui.modal.close(ModalId::JoinRequest);
        }
        outcome
    }
}

/// Pending membership applications of one body.
pub struct JoinRequests {
    client: OmsClient,
    ui: Collaborators,
    body_id: BodyId,
    pub list: ListLoader<JoinRequest>,
}

impl JoinRequests {
    pub async fn open(
        client: &OmsClient,
        ui: &Collaborators,
        body_id: BodyId,
    ) -> Result<Self, LoaderError> {
        let list = ListLoader::attach(
            client.clone(),
            Resource::JoinRequests(body_id).path(),
            inject_query(),
            DEFAULT_PAGE_SIZE,
            ui.notifier.clone(),
        )
        .await?;
        Ok(Self {
            client: client.clone(),
            ui: ui.clone(),
            body_id,
            list,
        })
    }

    /// Approves or rejects a request; either way it leaves the pending list.
    pub async fn process(&self, request: &JoinRequest, approved: bool) -> Outcome<()> {
        let result = self
            .client
            .post_action(
                &join_request_route(self.body_id, request.id),
                Some(&ProcessJoinRequest { approved }),
            )
            .await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            info!(body_id = %self.body_id, request_id = %request.id, approved, "join request processed");
            self.ui
                .notifier
                .show_success("Join request processed successfully");
            self.list.reset_data().await;
        }
        outcome
    }
}

pub struct BodyMembers {
    client: OmsClient,
    ui: Collaborators,
    body_id: BodyId,
    pub list: ListLoader<BodyMembership>,
    pub edited: Option<BodyMembership>,
    pub errors: FieldErrors,
}

impl BodyMembers {
    pub async fn open(
        client: &OmsClient,
        ui: &Collaborators,
        body_id: BodyId,
    ) -> Result<Self, LoaderError> {
        let list = ListLoader::attach(
            client.clone(),
            Resource::BodyMembers(body_id).path(),
            inject_query(),
            DEFAULT_PAGE_SIZE,
            ui.notifier.clone(),
        )
        .await?;
        Ok(Self {
            client: client.clone(),
            ui: ui.clone(),
            body_id,
            list,
            edited: None,
            errors: FieldErrors::new(),
        })
    }

    pub fn edit(&mut self, membership: BodyMembership) {
        self.edited = Some(membership);
        self.ui.modal.open(ModalId::EditBodyMembership);
    }

    pub async fn save(&mut self) -> Outcome<()> {
        let Some(membership) = &self.edited else {
            return Outcome::Skipped;
        };
        let result = self
            .client
            .update::<_, BodyMembership>(
                &body_membership_route(self.body_id, membership.id),
                &BodyMembershipUpdateRequest {
                    body_membership: membership,
                },
            )
            .await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.list.reset_data().await;
            self.ui.notifier.show_success("Membership edited successfully");
            self.ui.modal.close(ModalId::EditBodyMembership);
            self.edited = None;
        }
        outcome.map(|_| ())
    }

    pub async fn delete(&self, membership: &BodyMembership) -> Outcome<()> {
        let result = self
            .client
            .delete(&body_membership_route(self.body_id, membership.id))
            .await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.notifier.show_success("Member successfully deleted");
            self.list.reset_data().await;
        }
        outcome
    }
}
