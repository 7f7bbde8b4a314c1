use crate::{Shell, action::Action, surface::ClientId};

impl Shell {
    pub(super) fn bind_desktop_client(&mut self, client: ClientId) {
        let advertised = self.advertised_app_ids();
        let replay = self
            .desktop_shell
            .bind(client, advertised.iter().map(String::as_str));
        tracing::debug!(%client, replayed = replay.len(), "desktop client bound");
        for delivery in replay {
            self.push_action(Action::from(delivery));
        }
    }

    pub(super) fn desktop_client_gone(&mut self, client: ClientId) {
        if self.desktop_shell.unbind(client) {
            tracing::debug!(%client, "desktop client gone");
        }
    }
}
