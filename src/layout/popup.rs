use smithay::utils::Point;

use crate::{
    Shell,
    scene::Layer,
    surface::{PopupState, SurfaceId},
};

impl Shell {
    /// Maps a popup at its anchor, or at its own geometry origin when no
    /// anchor was given. Mapping again re-adds it on top of the popup layer.
    pub(crate) fn show_popup(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let Some(popup) = surface.role().popup() else {
            return;
        };
        let view = surface.view;
        let geometry = surface.state.geometry;
        let Some(output) = self.outputs.get(popup.output) else {
            tracing::debug!(app_id = surface.app_id_or_default(), "popup output is gone");
            return;
        };

        let origin = if popup.anchor != Point::from((0, 0)) {
            popup.anchor
        } else {
            geometry.loc
        };
        let position = output.geometry.loc + origin;

        self.scene.remove(view);
        self.scene.set_output(view, Some(popup.output));
        self.scene.set_position(view, position);
        self.scene.set_size(view, geometry.size);
        self.scene.set_clip(view, popup.clip);
        self.scene.insert(Layer::Popup, view);

        if let Some(popup) = self.surfaces.get_mut(id).and_then(|s| s.popup_mut()) {
            popup.state = PopupState::Shown;
        }
        tracing::debug!(x = position.x, y = position.y, clip = ?popup.clip, "popup mapped");
    }

    /// Only the first commit shows a popup; a deactivated popup waits for
    /// an explicit activation.
    pub(super) fn popup_committed(&mut self, id: SurfaceId) {
        let Some(popup) = self.surfaces.get(id).and_then(|s| s.role().popup()) else {
            return;
        };
        match popup.state {
            PopupState::NotShown => self.show_popup(id),
            PopupState::Shown => {
                if let Some(surface) = self.surfaces.get(id) {
                    self.scene.set_size(surface.view, surface.state.geometry.size);
                }
            }
            PopupState::Hidden => {}
        }
    }
}
