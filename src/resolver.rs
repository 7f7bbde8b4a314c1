//! Role resolution for surfaces that appear without an explicit role request.

use crate::{
    Shell,
    pending::PendingHint,
    protocols::desktop::AppState,
    surface::{
        DesktopRole, FullscreenRole, PopupRole, PopupState, RemoteRole, Role, SplitRole, Stage,
        SurfaceFlags, SurfaceId,
    },
};

impl Shell {
    /// Gives an unrooted surface its role: the first pending registration
    /// for its app id in priority order, desktop otherwise. Returns whether
    /// a role was assigned.
    pub(crate) fn resolve_role(&mut self, id: SurfaceId) -> bool {
        let Some(surface) = self.surfaces.get(id) else {
            return false;
        };
        if !matches!(surface.role(), Role::None) || !self.ready {
            return false;
        }
        // The shell client roots its own surfaces with set_background/set_panel.
        if self.shell_client == Some(surface.client) {
            return false;
        }
        let Some(app_id) = surface.app_id.clone() else {
            tracing::trace!(handle = %surface.handle, "no app id yet, surface stays unrooted");
            return false;
        };

        let role = match self.pending.take(&app_id) {
            Some(registration) => {
                let output = registration.output;
                match registration.hint {
                    PendingHint::Popup { anchor, clip } => Role::Popup(PopupRole {
                        output,
                        anchor,
                        clip,
                        state: PopupState::NotShown,
                    }),
                    PendingHint::Split(orientation) => Role::Split(SplitRole {
                        output,
                        orientation,
                        stage: Stage::Unstaged,
                        rect: None,
                    }),
                    PendingHint::Fullscreen => Role::Fullscreen(FullscreenRole {
                        output,
                        stage: Stage::Unstaged,
                    }),
                    PendingHint::Remote => Role::Remote(RemoteRole {
                        output,
                        desktop: DesktopRole::default(),
                    }),
                }
            }
            None => Role::Desktop(DesktopRole::default()),
        };

        let kind = role.kind();
        if let Err(err) = self.surfaces.assign_role(id, role) {
            tracing::warn!(%app_id, ?err, "role resolution failed");
            return false;
        }
        tracing::debug!(%app_id, role = %kind, "role resolved");

        self.advertise(id);
        if let Some(surface) = self.surfaces.get_mut(id)
            && !surface.flags.contains(SurfaceFlags::STARTED)
        {
            surface.flags.insert(SurfaceFlags::STARTED);
            self.notify_state(id, AppState::Started);
        }
        true
    }

    /// Resolves and lays out every held surface that already committed
    /// content. The others wait for their first commit.
    pub(crate) fn flush_unrooted(&mut self) {
        for id in self.surfaces.unrooted().to_vec() {
            let committed = self.surfaces.get(id).is_some_and(|surface| surface.committed);
            if !committed || !self.resolve_role(id) {
                continue;
            }
            if let Err(err) = self.layout_commit(id) {
                tracing::warn!(?err, "layout after role resolution failed");
            }
        }
    }
}
