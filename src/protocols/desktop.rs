//! Notifications sent to desktop clients listening for application state.

use std::fmt;

use crate::surface::{ClientId, RoleKind};

/// Application state carried by `state_app`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Started,
    Destroyed,
    Activated,
    Deactivated,
}

impl AppState {
    pub fn wire_value(self) -> u32 {
        match self {
            AppState::Started => 0,
            AppState::Destroyed => 1,
            AppState::Activated => 2,
            AppState::Deactivated => 3,
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppState::Started => "started",
            AppState::Destroyed => "destroyed",
            AppState::Activated => "activated",
            AppState::Deactivated => "deactivated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Application {
        app_id: String,
    },
    StateApp {
        app_id: String,
        data: String,
        state: AppState,
        role: RoleKind,
    },
}

impl Notification {
    pub fn app_id(&self) -> &str {
        match self {
            Notification::Application { app_id } | Notification::StateApp { app_id, .. } => app_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: ClientId,
    pub notification: Notification,
}

/// Desktop clients bound to the notification interface, in bind order.
#[derive(Debug, Default)]
pub struct DesktopShellState {
    clients: Vec<ClientId>,
}

impl DesktopShellState {
    /// Registers `client` and replays `application` for every app id
    /// advertised so far, to that client only.
    pub fn bind<'a>(
        &mut self,
        client: ClientId,
        advertised: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Delivery> {
        if !self.clients.contains(&client) {
            self.clients.push(client);
        }
        advertised
            .into_iter()
            .map(|app_id| Delivery {
                recipient: client,
                notification: Notification::Application {
                    app_id: app_id.to_owned(),
                },
            })
            .collect()
    }

    pub fn unbind(&mut self, client: ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|candidate| *candidate != client);
        before != self.clients.len()
    }

    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    pub fn application(&self, app_id: &str) -> Vec<Delivery> {
        self.broadcast(Notification::Application {
            app_id: app_id.to_owned(),
        })
    }

    pub fn state_app(&self, app_id: &str, state: AppState, role: RoleKind) -> Vec<Delivery> {
        self.broadcast(Notification::StateApp {
            app_id: app_id.to_owned(),
            data: String::new(),
            state,
            role,
        })
    }

    fn broadcast(&self, notification: Notification) -> Vec<Delivery> {
        self.clients
            .iter()
            .map(|client| Delivery {
                recipient: *client,
                notification: notification.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_replays_only_to_the_new_client() {
        let mut state = DesktopShellState::default();
        assert!(state.bind(ClientId(1), []).is_empty());

        let replay = state.bind(ClientId(2), ["nav", "media"]);
        assert_eq!(replay.len(), 2);
        assert!(replay.iter().all(|delivery| delivery.recipient == ClientId(2)));
        assert_eq!(replay[1].notification.app_id(), "media");
    }

    #[test]
    fn broadcasts_reach_every_bound_client() {
        let mut state = DesktopShellState::default();
        state.bind(ClientId(1), []);
        state.bind(ClientId(2), []);
        state.bind(ClientId(2), []);

        let deliveries = state.state_app("nav", AppState::Activated, RoleKind::Desktop);
        assert_eq!(deliveries.len(), 2);

        assert!(state.unbind(ClientId(1)));
        assert!(!state.unbind(ClientId(1)));
        assert_eq!(state.application("nav").len(), 1);
    }

    #[test]
    fn app_state_wire_values() {
        assert_eq!(AppState::Started.wire_value(), 0);
        assert_eq!(AppState::Destroyed.wire_value(), 1);
        assert_eq!(AppState::Activated.wire_value(), 2);
        assert_eq!(AppState::Deactivated.wire_value(), 3);
    }
}
