//! Output registry: usable-area bookkeeping, edge reservations and the
//! per-output curtain.

use std::{collections::HashMap, fmt};

use slotmap::{SlotMap, new_key_type};
use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::{
    ShellError,
    errors::Result,
    render_helpers::{Color, SolidColorBuffer},
    scene::{Layer, Scene, ViewId},
    surface::SurfaceId,
};

new_key_type! {
    pub struct OutputId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Order in which panels are laid out.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    fn index(self) -> usize {
        match self {
            Edge::Top => 0,
            Edge::Bottom => 1,
            Edge::Left => 2,
            Edge::Right => 3,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }

    /// Thickness a panel of `size` takes away from the usable area.
    pub fn extent(self, size: Size<i32, Logical>) -> i32 {
        if self.is_horizontal() { size.h } else { size.w }
    }
}

impl TryFrom<u32> for Edge {
    type Error = ShellError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Edge::Top),
            1 => Ok(Edge::Bottom),
            2 => Ok(Edge::Left),
            3 => Ok(Edge::Right),
            other => Err(ShellError::InvalidEdge(other)),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSlot {
    pub surface: SurfaceId,
    /// Extent currently subtracted from the usable area, if any.
    pub reserved: Option<i32>,
}

#[derive(Debug)]
pub struct Curtain {
    pub view: ViewId,
    pub buffer: SolidColorBuffer,
    shown: bool,
}

impl Curtain {
    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

#[derive(Debug)]
pub struct ShellOutput {
    pub name: String,
    /// Position and size in the global compositor space.
    pub geometry: Rectangle<i32, Logical>,
    /// Usable area, relative to the output origin.
    pub area: Rectangle<i32, Logical>,
    pub background: Option<SurfaceId>,
    edges: [Option<EdgeSlot>; 4],
    pub active: Option<SurfaceId>,
    pub previous_active: Option<SurfaceId>,
    pub split: Option<SurfaceId>,
    pub fullscreen: Option<SurfaceId>,
    pub curtain: Curtain,
}

impl ShellOutput {
    pub fn full_area(&self) -> Rectangle<i32, Logical> {
        Rectangle::from_size(self.geometry.size)
    }

    /// Global position of the usable area's origin.
    pub fn area_origin(&self) -> Point<i32, Logical> {
        self.geometry.loc + self.area.loc
    }

    pub fn edge(&self, edge: Edge) -> Option<EdgeSlot> {
        self.edges[edge.index()]
    }

    pub fn panels(&self) -> impl Iterator<Item = (Edge, EdgeSlot)> + '_ {
        Edge::ALL
            .into_iter()
            .filter_map(|edge| self.edges[edge.index()].map(|slot| (edge, slot)))
    }

    pub fn panel_edge(&self, surface: SurfaceId) -> Option<Edge> {
        self.panels()
            .find(|(_, slot)| slot.surface == surface)
            .map(|(edge, _)| edge)
    }

    /// Registers `surface` as the panel of `edge` without touching the area.
    pub fn claim_edge(&mut self, edge: Edge, surface: SurfaceId) -> Result<()> {
        match self.edges[edge.index()] {
            Some(slot) if slot.surface != surface => Err(ShellError::PanelExists {
                output: self.name.clone(),
                edge,
            }),
            Some(_) => Ok(()),
            None => {
                self.edges[edge.index()] = Some(EdgeSlot {
                    surface,
                    reserved: None,
                });
                Ok(())
            }
        }
    }

    /// Shrinks the usable area by the panel's extent on `edge`. A panel
    /// reserves its edge once; a repeated call keeps the first extent.
    pub fn reserve_edge(
        &mut self,
        edge: Edge,
        surface: SurfaceId,
        size: Size<i32, Logical>,
    ) -> Result<()> {
        let slot = self.edges[edge.index()].get_or_insert(EdgeSlot {
            surface,
            reserved: None,
        });
        if slot.surface != surface {
            return Err(ShellError::PanelExists {
                output: self.name.clone(),
                edge,
            });
        }
        if slot.reserved.is_some() {
            return Ok(());
        }

        let extent = edge.extent(size);
        slot.reserved = Some(extent);
        shrink_area(&mut self.area, edge, extent);
        Ok(())
    }

    /// Drops the panel registration of `surface`, giving back its extent.
    pub fn release_edge(&mut self, surface: SurfaceId) -> Option<Edge> {
        let edge = self.panel_edge(surface)?;
        if let Some(slot) = self.edges[edge.index()].take()
            && let Some(extent) = slot.reserved
        {
            shrink_area(&mut self.area, edge, -extent);
        }
        Some(edge)
    }

    /// Full output area minus every extent currently reserved by a panel.
    pub fn reserved_area(&self) -> Rectangle<i32, Logical> {
        let mut area = self.full_area();
        for (edge, slot) in self.panels() {
            if let Some(extent) = slot.reserved {
                shrink_area(&mut area, edge, extent);
            }
        }
        area
    }

    /// Restores the full output area and forgets applied reservations.
    pub fn reset_area(&mut self) {
        self.area = self.full_area();
        for slot in self.edges.iter_mut().flatten() {
            slot.reserved = None;
        }
    }

    /// Global position of a panel of `geometry` docked to `edge`.
    pub fn panel_position(
        &self,
        edge: Edge,
        geometry: Rectangle<i32, Logical>,
    ) -> Point<i32, Logical> {
        let mut position = self.geometry.loc;
        match edge {
            Edge::Top | Edge::Left => {}
            Edge::Bottom => position.y += self.geometry.size.h - geometry.size.h,
            Edge::Right => position.x += self.geometry.size.w - geometry.size.w,
        }
        position - geometry.loc
    }

    /// Whether any slot of this output refers to `surface`.
    pub fn refers_to(&self, surface: SurfaceId) -> bool {
        self.background == Some(surface)
            || self.active == Some(surface)
            || self.previous_active == Some(surface)
            || self.split == Some(surface)
            || self.fullscreen == Some(surface)
            || self.panel_edge(surface).is_some()
    }

    /// Clears every reference to `surface` except panel edges, which need
    /// their reservation returned through [`ShellOutput::release_edge`].
    pub fn forget(&mut self, surface: SurfaceId) {
        for slot in [
            &mut self.background,
            &mut self.active,
            &mut self.previous_active,
            &mut self.split,
            &mut self.fullscreen,
        ] {
            if *slot == Some(surface) {
                *slot = None;
            }
        }
    }

    pub fn show_curtain(&mut self, scene: &mut Scene) {
        if self.curtain.shown {
            return;
        }
        self.curtain.shown = true;
        self.curtain.buffer.touch();
        scene.insert_bottom(Layer::Background, self.curtain.view);
        tracing::debug!(output = %self.name, "curtain shown");
    }

    pub fn hide_curtain(&mut self, scene: &mut Scene) {
        if !self.curtain.shown {
            return;
        }
        self.curtain.shown = false;
        scene.remove(self.curtain.view);
        tracing::debug!(output = %self.name, "curtain hidden");
    }
}

fn shrink_area(area: &mut Rectangle<i32, Logical>, edge: Edge, extent: i32) {
    match edge {
        Edge::Top => {
            area.loc.y += extent;
            area.size.h -= extent;
        }
        Edge::Bottom => area.size.h -= extent,
        Edge::Left => {
            area.loc.x += extent;
            area.size.w -= extent;
        }
        Edge::Right => area.size.w -= extent,
    }
}

#[derive(Debug, Default)]
pub struct OutputRegistry {
    outputs: SlotMap<OutputId, ShellOutput>,
    by_name: HashMap<String, OutputId>,
    order: Vec<OutputId>,
}

impl OutputRegistry {
    /// Adds an output with its curtain shown. Fails if the name is taken.
    pub fn add(
        &mut self,
        scene: &mut Scene,
        name: &str,
        geometry: Rectangle<i32, Logical>,
        curtain_color: Color,
    ) -> Result<OutputId> {
        if self.by_name.contains_key(name) {
            return Err(ShellError::Config(format!("output {name} is already present")));
        }

        let view = scene.create_view();
        let id = self.outputs.insert(ShellOutput {
            name: name.to_owned(),
            geometry,
            area: Rectangle::from_size(geometry.size),
            background: None,
            edges: [None; 4],
            active: None,
            previous_active: None,
            split: None,
            fullscreen: None,
            curtain: Curtain {
                view,
                buffer: SolidColorBuffer::new(geometry.size, curtain_color),
                shown: false,
            },
        });
        scene.set_output(view, Some(id));
        scene.set_position(view, geometry.loc);
        scene.set_size(view, geometry.size);
        self.by_name.insert(name.to_owned(), id);
        self.order.push(id);

        let output = &mut self.outputs[id];
        output.show_curtain(scene);
        tracing::info!(output = %name, ?geometry, "output added");
        Ok(id)
    }

    /// Removes an output and its curtain view. Views shown on it are unmapped.
    pub fn remove(&mut self, scene: &mut Scene, name: &str) -> Option<ShellOutput> {
        let id = self.by_name.remove(name)?;
        self.order.retain(|candidate| *candidate != id);
        let output = self.outputs.remove(id)?;
        scene.evict_output(id);
        scene.destroy_view(output.curtain.view);
        tracing::info!(output = %name, "output removed");
        Some(output)
    }

    pub fn get(&self, id: OutputId) -> Option<&ShellOutput> {
        self.outputs.get(id)
    }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut ShellOutput> {
        self.outputs.get_mut(id)
    }

    pub fn by_name(&self, name: &str) -> Option<OutputId> {
        self.by_name.get(name).copied()
    }

    /// Output ids in the order the outputs were added.
    pub fn ids(&self) -> Vec<OutputId> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputId, &ShellOutput)> {
        self.order.iter().map(|id| (*id, &self.outputs[*id]))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (OutputId, &mut ShellOutput)> {
        self.outputs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// First output, in insertion order, that holds a background.
    pub fn find_background_output(&self) -> Option<OutputId> {
        self.iter()
            .find(|(_, output)| output.background.is_some())
            .map(|(id, _)| id)
    }

    /// Output whose `active` slot holds `surface`.
    pub fn find_active(&self, surface: SurfaceId) -> Option<OutputId> {
        self.iter()
            .find(|(_, output)| output.active == Some(surface))
            .map(|(id, _)| id)
    }

    pub fn refers_to(&self, surface: SurfaceId) -> bool {
        self.outputs.values().any(|output| output.refers_to(surface))
    }
}
