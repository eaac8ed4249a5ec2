//! UI collaborators: toasts, navigation and modal dialogs.

use std::sync::Arc;

use shared::domain::{BodyId, CampaignId, CircleId, MemberId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::RequestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Welcome,
    Members,
    Profile(MemberId),
    Bodies,
    Body(BodyId),
    Circles,
    Circle(CircleId),
    Campaigns,
    ConfirmSignup { campaign_id: Option<CampaignId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalId {
    EditProfile,
    EditBody,
    EditCircle,
    JoinRequest,
    EditBodyMembership,
    EditCircleMembership,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Success(String),
    Error(String),
    Navigated(Route),
    ModalOpened(ModalId),
    ModalClosed(ModalId),
}

pub trait Notifier: Send + Sync {
    fn show_success(&self, message: &str);
    fn show_error(&self, error: &RequestError);
}

pub trait Navigator: Send + Sync {
    fn go(&self, route: Route);
}

pub trait Modal: Send + Sync {
    fn open(&self, id: ModalId);
    fn close(&self, id: ModalId);
}

/// Broadcasts every collaborator call as a [`ClientEvent`].
pub struct EventBus {
    events: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self { events })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ClientEvent) {
        // No subscribers is fine; the log line still records the event.
        let _ = self.events.send(event);
    }
}

impl Notifier for EventBus {
    fn show_success(&self, message: &str) {
        info!("{message}");
        self.emit(ClientEvent::Success(message.to_string()));
    }

    fn show_error(&self, error: &RequestError) {
        warn!(error = %error, "request failed");
        self.emit(ClientEvent::Error(error.user_message()));
    }
}

impl Navigator for EventBus {
    fn go(&self, route: Route) {
        debug!(?route, "navigate");
        self.emit(ClientEvent::Navigated(route));
    }
}

impl Modal for EventBus {
    fn open(&self, id: ModalId) {
        self.emit(ClientEvent::ModalOpened(id));
    }

    fn close(&self, id: ModalId) {
        self.emit(ClientEvent::ModalClosed(id));
    }
}

/// The collaborator set handed to every screen controller.
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub modal: Arc<dyn Modal>,
}

impl Collaborators {
    pub fn from_bus(bus: Arc<EventBus>) -> Self {
        Self {
            notifier: bus.clone(),
            navigator: bus.clone(),
            modal: bus,
        }
    }
}
