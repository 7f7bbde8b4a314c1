use crate::{
    Shell,
    output::{Edge, OutputId},
    scene::Layer,
    surface::SurfaceId,
};

impl Shell {
    /// Docks a panel to its edge and reserves its extent.
    ///
    /// A panel without content yet, or a non-top panel reporting an all-zero
    /// geometry (some toolkits do for their first commits), is left unmapped
    /// and marked deferred; its next commit places it.
    pub(crate) fn place_panel(&mut self, output_id: OutputId, edge: Edge, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let geometry = surface.state.geometry;
        let view = surface.view;
        let no_geometry = geometry.is_empty() && geometry.loc.x == 0 && geometry.loc.y == 0;

        self.scene.remove(view);
        if !surface.committed || (no_geometry && edge != Edge::Top) {
            if let Some(panel) = self.surfaces.get_mut(id).and_then(|s| s.panel_mut()) {
                panel.deferred = true;
            }
            tracing::debug!(%edge, "panel has no geometry yet, deferring");
            return;
        }

        let Some(output) = self.outputs.get_mut(output_id) else {
            return;
        };
        if let Err(err) = output.reserve_edge(edge, id, geometry.size) {
            tracing::warn!(%err, "panel reservation failed");
            return;
        }
        let position = output.panel_position(edge, geometry);

        self.scene.set_output(view, Some(output_id));
        self.scene.set_position(view, position);
        self.scene.set_size(view, geometry.size);
        self.scene.insert(Layer::Panel, view);
        if let Some(panel) = self.surfaces.get_mut(id).and_then(|s| s.panel_mut()) {
            panel.deferred = false;
        }
        tracing::debug!(%edge, x = position.x, y = position.y, "panel mapped");
    }

    pub(super) fn panel_committed(&mut self, id: SurfaceId) {
        if !self.ready || self.is_mapped(id) {
            return;
        }
        let Some(panel) = self.surfaces.get(id).and_then(|s| s.role().panel()) else {
            return;
        };
        let registered = self
            .outputs
            .get(panel.output)
            .is_some_and(|output| output.edge(panel.edge).is_some_and(|slot| slot.surface == id));
        if !registered {
            return;
        }

        self.place_panel(panel.output, panel.edge, id);
        if self.is_mapped(id) {
            // The usable area changed under the active surface.
            self.refresh_area(panel.output);
            self.resize_active(panel.output);
        }
    }
}
