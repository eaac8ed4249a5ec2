use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::{CircleId, Resource},
    error::FieldErrors,
    protocol::{
        Circle, CircleMembership, CircleMembershipUpdateRequest, CircleWriteRequest, Permission,
        PermissionsUpdateRequest, SetParentCircleRequest,
    },
};
use tracing::info;

use crate::{
    error::RequestError,
    events::{Collaborators, ModalId, Route},
    forms::{settle, settle_form, Outcome},
    list_loader::{ListLoader, LoaderError, PageParams, ParamInjector, DEFAULT_PAGE_SIZE},
    routes::{
        circle_members_route, circle_membership_route, circle_parent_route,
        circle_permissions_route, circle_route,
    },
    OmsClient,
};

/// Circles below some url (`/circles`, `/bodies/{id}/circles`, ...) with an
/// `all` switch that widens the scope.
pub struct CircleList {
    all: Arc<AtomicBool>,
    pub list: ListLoader<Circle>,
}

impl CircleList {
    pub async fn open(
        client: &OmsClient,
        ui: &Collaborators,
        endpoint: impl Into<String>,
        all: bool,
    ) -> Result<Self, LoaderError> {
        let flag = Arc::new(AtomicBool::new(all));
        let injected = Arc::clone(&flag);
        let injector: ParamInjector = Arc::new(move |params: PageParams, query: &str| {
            params
                .with("query", query)
                .with("all", injected.load(Ordering::SeqCst))
        });
        let list = ListLoader::attach(
            client.clone(),
            endpoint,
            injector,
            DEFAULT_PAGE_SIZE,
            ui.notifier.clone(),
        )
        .await?;
        Ok(Self { all: flag, list })
    }

    pub fn all(&self) -> bool {
        self.all.load(Ordering::SeqCst)
    }

    /// Flipping the switch reloads the list from the first page.
    pub async fn set_all(&self, all: bool) {
        if self.all.swap(all, Ordering::SeqCst) != all {
            self.list.reset_data().await;
        }
    }
}

/// Circle overview with the create dialog.
pub struct CirclesPage {
    client: OmsClient,
    ui: Collaborators,
    pub list: CircleList,
    pub edited_circle: Circle,
    pub errors: FieldErrors,
}

impl CirclesPage {
    pub async fn open(client: &OmsClient, ui: &Collaborators) -> Result<Self, LoaderError> {
        Ok(Self {
            client: client.clone(),
            ui: ui.clone(),
            list: CircleList::open(client, ui, Resource::Circles.path(), false).await?,
            edited_circle: Circle::default(),
            errors: FieldErrors::new(),
        })
    }

    pub fn create_circle(&mut self) {
        self.edited_circle = Circle::default();
        self.ui.modal.open(ModalId::EditCircle);
    }

    pub async fn save(&mut self) -> Outcome<Circle> {
        let result = self
            .client
            .create::<_, Circle>(
                &Resource::Circles.path(),
                &CircleWriteRequest {
                    circle: &self.edited_circle,
                },
            )
            .await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.notifier.show_success("Circle successfully created");
            self.ui.modal.close(ModalId::EditCircle);
            self.list.list.reset_data().await;
        }
        outcome
    }
}

pub struct CircleDetail {
    client: OmsClient,
    ui: Collaborators,
    circle_id: CircleId,
    pub circle: Option<Circle>,
    /// Permissions granted through this circle and its ancestors.
    pub inherited_permissions: Vec<Permission>,
    pub edited_circle: Option<Circle>,
    pub errors: FieldErrors,
}

impl CircleDetail {
    pub async fn open(client: &OmsClient, ui: &Collaborators, circle_id: CircleId) -> Self {
        let mut detail = Self {
            client: client.clone(),
            ui: ui.clone(),
            circle_id,
            circle: None,
            inherited_permissions: Vec::new(),
            edited_circle: None,
            errors: FieldErrors::new(),
        };
        detail.load().await;
        detail.load_inherited_permissions().await;
        detail
    }

    pub fn members_url(&self) -> String {
        circle_members_route(self.circle_id)
    }

    pub async fn load(&mut self) -> Outcome<()> {
        let result = self
            .client
            .fetch::<Circle>(&circle_route(self.circle_id))
            .await;
        settle(result, self.ui.notifier.as_ref()).map(|circle| self.circle = Some(circle))
    }

    pub async fn load_inherited_permissions(&mut self) -> Outcome<()> {
        let result = self
            .client
            .fetch::<Vec<Permission>>(&circle_permissions_route(self.circle_id))
            .await;
        settle(result, self.ui.notifier.as_ref())
            .map(|permissions| self.inherited_permissions = permissions)
    }

    pub async fn join(&self) -> Outcome<()> {
        let result = self
            .client
            .post_empty(&circle_members_route(self.circle_id))
            .await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.notifier.show_success("Joined circle");
        }
        outcome
    }

    pub async fn delete(&self) -> Outcome<()> {
        let result = self.client.delete(&circle_route(self.circle_id)).await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            info!(circle_id = %self.circle_id, "circle deleted");
            self.ui.notifier.show_success("Successfully deleted circle");
            self.ui.navigator.go(Route::Circles);
        }
        outcome
    }

    pub fn edit(&mut self) {
        self.edited_circle = self.circle.clone();
        self.ui.modal.open(ModalId::EditCircle);
    }

    pub async fn save(&mut self) -> Outcome<()> {
        let Some(edited) = &self.edited_circle else {
            return Outcome::Skipped;
        };
        let result = self
            .client
            .update::<_, Circle>(
                &circle_route(self.circle_id),
                &CircleWriteRequest { circle: edited },
            )
            .await;
        match settle_form(result, &mut self.errors, self.ui.notifier.as_ref()) {
            Outcome::Done(circle) => {
                self.ui.notifier.show_success("Circle successfully updated");
                self.ui.modal.close(ModalId::EditCircle);
                self.circle = Some(circle);
                self.edited_circle = None;
                Outcome::Done(())
            }
            other => other.map(|_| ()),
        }
    }

    /// Replaces the circle's own permissions.
    pub async fn update_permissions(&mut self, permissions: &[Permission]) -> Outcome<()> {
        let result = self
            .client
            .update::<_, Circle>(
                &circle_permissions_route(self.circle_id),
                &PermissionsUpdateRequest { permissions },
            )
            .await;
        self.apply_circle_change(result, "Permissions successfully updated")
            .await
    }

    pub async fn delete_permission(&mut self, permission: &Permission) -> Outcome<()> {
        let Some(circle) = &self.circle else {
            return Outcome::Skipped;
        };
        let remaining: Vec<Permission> = circle
            .permissions
            .iter()
            .filter(|existing| existing.id != permission.id)
            .cloned()
            .collect();
        self.update_permissions(&remaining).await
    }

    pub async fn add_permission(&mut self, permission: Permission) -> Outcome<()> {
        let Some(circle) = &self.circle else {
            return Outcome::Skipped;
        };
        let mut permissions = circle.permissions.clone();
        permissions.push(permission);
        self.update_permissions(&permissions).await
    }

    pub async fn set_parent_circle(&mut self, parent: &Circle) -> Outcome<()> {
        let result = self
            .client
            .update::<_, Circle>(
                &circle_parent_route(self.circle_id),
                &SetParentCircleRequest {
                    parent_circle_id: parent.id,
                },
            )
            .await;
        self.apply_circle_change(result, "Parent circle modified successfully")
            .await
    }

    async fn apply_circle_change(
        &mut self,
        result: Result<Circle, RequestError>,
        success: &str,
    ) -> Outcome<()> {
        match settle(result, self.ui.notifier.as_ref()) {
            Outcome::Done(circle) => {
                self.ui.notifier.show_success(success);
                self.circle = Some(circle);
                self.load_inherited_permissions().await;
                Outcome::Done(())
            }
            other => other.map(|_| ()),
        }
    }
}

/// Every membership below a url, loaded in one request.
pub struct CircleMemberships {
    client: OmsClient,
    ui: Collaborators,
    url: String,
    pub members: Vec<CircleMembership>,
    pub edited: Option<CircleMembership>,
    pub errors: FieldErrors,
}

impl CircleMemberships {
    pub async fn open(client: &OmsClient, ui: &Collaborators, url: impl Into<String>) -> Self {
        let mut memberships = Self {
            client: client.clone(),
            ui: ui.clone(),
            url: url.into(),
            members: Vec::new(),
            edited: None,
            errors: FieldErrors::new(),
        };
        memberships.load().await;
        memberships
    }

    pub async fn load(&mut self) -> Outcome<()> {
        let result = self
            .client
            .fetch_page::<CircleMembership>(&self.url, Vec::new(), None)
            .await;
        settle(result, self.ui.notifier.as_ref()).map(|members| self.members = members)
    }

    pub async fn delete(&mut self, membership: &CircleMembership) -> Outcome<()> {
        let result = self
            .client
            .delete(&circle_membership_route(membership.circle_id, membership.id))
            .await;
        let outcome = settle(result, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui.notifier.show_success("Membership deleted successfully");
            self.load().await;
        }
        outcome
    }

    pub fn edit(&mut self, membership: CircleMembership) {
        self.edited = Some(membership);
        self.ui.modal.open(ModalId::EditCircleMembership);
    }

    pub async fn save(&mut self) -> Outcome<()> {
        let Some(membership) = &self.edited else {
            return Outcome::Skipped;
        };
        let result = self
            .client
            .update::<_, CircleMembership>(
                &circle_membership_route(membership.circle_id, membership.id),
                &CircleMembershipUpdateRequest {
                    circle_membership: membership,
                },
            )
            .await;
        match settle_form(result, &mut self.errors, self.ui.notifier.as_ref()) {
            Outcome::Done(_) => {
                self.ui.notifier.show_success("Membership updated successfully");
                self.load().await;
                self.ui.modal.close(ModalId::EditCircleMembership);
                self.edited = None;
                Outcome::Done(())
            }
            other => other.map(|_| ()),
        }
    }
}
