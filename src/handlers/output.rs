use smithay::utils::{Logical, Rectangle};

use crate::{Shell, errors::Result, output::OutputId};

impl Shell {
    /// Creates the outputs listed in the configuration.
    pub fn add_configured_outputs(&mut self) -> Result<()> {
        let configured: Vec<_> = self
            .config
            .outputs
            .iter()
            .filter(|output| output.enabled)
            .map(|output| (output.name.clone(), output.geometry()))
            .collect();
        for (name, geometry) in configured {
            self.output_added(&name, geometry)?;
        }
        Ok(())
    }

    pub(crate) fn output_added(
        &mut self,
        name: &str,
        geometry: Rectangle<i32, Logical>,
    ) -> Result<OutputId> {
        let id = self
            .outputs
            .add(&mut self.scene, name, geometry, self.config.curtain_color)?;
        if self.ready {
            self.compute_initial_layout(id);
        }
        Ok(id)
    }

    /// Removes an output. Views shown on it are unmapped; surfaces bound to
    /// it keep a handle that no longer resolves.
    pub(crate) fn output_removed(&mut self, name: &str) {
        let Some(id) = self.outputs.by_name(name) else {
            tracing::debug!(output = %name, "removal of unknown output");
            return;
        };
        self.outputs.remove(&mut self.scene, name);
        self.pending.purge_output(id);

        for surface_id in self.surfaces.ids() {
            let Some(surface) = self.surfaces.get_mut(surface_id) else {
                continue;
            };
            if let Some(desktop) = surface.desktop_mut()
                && desktop.pending_output == Some(id)
            {
                desktop.pending_output = None;
            }
        }
        self.damage_all_outputs();
    }
}
