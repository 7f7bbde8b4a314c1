//! Fullscreen and split placement, both behind a resize handshake: the
//! surface is asked for its target size while parked on the hidden layer,
//! and only mapped once it commits that size.

use smithay::utils::{Logical, Rectangle};

use crate::{
    Shell, ShellError,
    action::ConfigureStates,
    errors::Result,
    output::OutputId,
    scene::Layer,
    surface::{Orientation, Stage, SurfaceId},
};

/// Splits `area` in two. Returns the half taken by the split surface and
/// what is left for everything else.
pub(crate) fn split_area(
    area: Rectangle<i32, Logical>,
    orientation: Orientation,
) -> (Rectangle<i32, Logical>, Rectangle<i32, Logical>) {
    let mut rest = area;
    let mut half = area;
    match orientation {
        Orientation::Vertical => {
            let width = area.size.w / 2;
            half.size.w = width;
            half.loc.x = area.loc.x + area.size.w - width;
            rest.size.w = area.size.w - width;
        }
        Orientation::Horizontal => {
            let height = area.size.h / 2;
            half.size.h = height;
            half.loc.y = area.loc.y + area.size.h - height;
            rest.size.h = area.size.h - height;
        }
    }
    (half, rest)
}

impl Shell {
    pub(super) fn fullscreen_committed(&mut self, id: SurfaceId) -> Result<()> {
        let Some(surface) = self.surfaces.get(id) else {
            return Ok(());
        };
        let Some(fullscreen) = surface.role().fullscreen() else {
            return Ok(());
        };
        let Some(output) = self.outputs.get(fullscreen.output) else {
            return Ok(());
        };
        let target = output.geometry;
        let view = surface.view;
        let state = surface.state;

        match fullscreen.stage {
            Stage::Unstaged => {
                if let Some(other) = output.fullscreen
                    && other != id
                {
                    tracing::warn!(
                        app_id = surface.app_id_or_default(),
                        output = %output.name,
                        "output already shows a fullscreen surface"
                    );
                    return Ok(());
                }
                if let Some(output) = self.outputs.get_mut(fullscreen.output) {
                    output.fullscreen = Some(id);
                }
                self.send_configure(id, target.size, ConfigureStates::FULLSCREEN);
                self.scene.set_output(view, Some(fullscreen.output));
                if state.geometry.size == target.size {
                    self.map_fullscreen(id, target);
                    return Ok(());
                }
                self.scene.insert(Layer::Hidden, view);
                self.set_fullscreen_stage(id, Stage::Resizing);
                Ok(())
            }
            Stage::Resizing if state.geometry.size == target.size => {
                self.map_fullscreen(id, target);
                Ok(())
            }
            Stage::Resizing if state.fullscreen => {
                let err = ShellError::GeometryViolation {
                    app_id: surface.app_id.clone(),
                    expected: (target.size.w, target.size.h),
                    got: (state.geometry.size.w, state.geometry.size.h),
                };
                let client = surface.client;
                self.kill_client(client, err.to_string());
                Err(err)
            }
            Stage::Resizing | Stage::HiddenStaged | Stage::Committed => Ok(()),
        }
    }

    fn map_fullscreen(&mut self, id: SurfaceId, target: Rectangle<i32, Logical>) {
        let Some(view) = self.surfaces.get(id).map(|surface| surface.view) else {
            return;
        };
        self.scene.set_position(view, target.loc);
        self.scene.set_size(view, target.size);
        self.scene.insert(Layer::Fullscreen, view);
        self.set_fullscreen_stage(id, Stage::Committed);
        tracing::debug!(x = target.loc.x, y = target.loc.y, "fullscreen surface mapped");
    }

    fn set_fullscreen_stage(&mut self, id: SurfaceId, stage: Stage) {
        if let Some(fullscreen) = self.surfaces.get_mut(id).and_then(|s| s.fullscreen_mut()) {
            fullscreen.stage = stage;
        }
    }

    pub(super) fn split_committed(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let Some(split) = surface.role().split() else {
            return;
        };
        let view = surface.view;
        let size = surface.state.geometry.size;
        let Some(output) = self.outputs.get_mut(split.output) else {
            return;
        };

        match split.stage {
            Stage::Unstaged => {
                if let Some(other) = output.split
                    && other != id
                {
                    tracing::warn!(
                        app_id = surface.app_id_or_default(),
                        output = %output.name,
                        "output is already split"
                    );
                    return;
                }
                let (half, rest) = split_area(output.area, split.orientation);
                output.area = rest;
                output.split = Some(id);
                tracing::debug!(?half, ?rest, "usable area split");

                if let Some(split) = self.surfaces.get_mut(id).and_then(|s| s.split_mut()) {
                    split.rect = Some(half);
                    split.stage = Stage::Resizing;
                }
                self.send_configure(id, half.size, ConfigureStates::empty());
                self.scene.set_output(view, Some(split.output));
                self.scene.insert(Layer::Hidden, view);
            }
            Stage::Resizing => {
                let Some(half) = split.rect else {
                    return;
                };
                if size != half.size {
                    return;
                }
                let position = output.geometry.loc + half.loc;
                self.scene.set_position(view, position);
                self.scene.set_size(view, half.size);
                self.scene.insert(Layer::Normal, view);
                if let Some(split) = self.surfaces.get_mut(id).and_then(|s| s.split_mut()) {
                    split.stage = Stage::Committed;
                }
                self.resize_active(split.output);
                tracing::debug!(x = position.x, y = position.y, "split surface mapped");
            }
            Stage::HiddenStaged | Stage::Committed => {}
        }
    }

    /// Gives the half taken by a split surface back to the usable area.
    pub(crate) fn teardown_split(&mut self, output_id: OutputId, id: SurfaceId) {
        let Some(output) = self.outputs.get_mut(output_id) else {
            return;
        };
        if output.split != Some(id) {
            return;
        }
        output.split = None;
        self.refresh_area(output_id);
        if let Some(output) = self.outputs.get(output_id) {
            tracing::debug!(area = ?output.area, "usable area restored");
        }
        self.resize_active(output_id);
        self.damage_all_outputs();
    }

    /// Rebuilds the usable area of an output from its size, its reserved
    /// panel edges and its split. A split whose half moved or changed size
    /// follows it, through a new handshake when the size changed.
    pub(crate) fn refresh_area(&mut self, output_id: OutputId) {
        let Some(output) = self.outputs.get_mut(output_id) else {
            return;
        };
        output.area = output.reserved_area();
        let Some(id) = output.split else {
            return;
        };
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let Some(split) = surface.role().split() else {
            return;
        };
        let view = surface.view;
        let (half, rest) = split_area(output.area, split.orientation);
        output.area = rest;
        let origin = output.geometry.loc;
        if split.rect == Some(half) {
            return;
        }

        let resized = split.rect.is_none_or(|rect| rect.size != half.size);
        if let Some(split) = self.surfaces.get_mut(id).and_then(|s| s.split_mut()) {
            split.rect = Some(half);
            if resized {
                split.stage = Stage::Resizing;
            }
        }
        if resized {
            self.send_configure(id, half.size, ConfigureStates::empty());
        } else if split.stage == Stage::Committed {
            self.scene.set_position(view, origin + half.loc);
        }
        tracing::debug!(?half, ?rest, "split follows the usable area");
    }

    pub(crate) fn teardown_fullscreen(&mut self, output_id: OutputId, id: SurfaceId) {
        if let Some(output) = self.outputs.get_mut(output_id)
            && output.fullscreen == Some(id)
        {
            output.fullscreen = None;
            self.scene.damage_output(output_id);
        }
    }
}
