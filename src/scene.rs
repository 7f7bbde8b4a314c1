//! Drawable views and the compositor layer stack.
//!
//! The rendering engine itself lives outside this crate. The shell only
//! decides which layer a view sits in, where it is placed, which output it
//! belongs to and which outputs have to be repainted.

use slotmap::{SlotMap, new_key_type};
use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::output::OutputId;

new_key_type! {
    pub struct ViewId;
}

pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle<i32, Logical> {
    Rectangle::new(Point::from((x, y)), Size::from((w, h)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Receives frame and configure events but is never shown.
    Hidden,
    Background,
    Normal,
    Panel,
    Popup,
    Fullscreen,
}

impl Layer {
    pub const STACK: [Layer; 6] = [
        Layer::Hidden,
        Layer::Background,
        Layer::Normal,
        Layer::Panel,
        Layer::Popup,
        Layer::Fullscreen,
    ];

    fn index(self) -> usize {
        match self {
            Layer::Hidden => 0,
            Layer::Background => 1,
            Layer::Normal => 2,
            Layer::Panel => 3,
            Layer::Popup => 4,
            Layer::Fullscreen => 5,
        }
    }

    pub fn is_visible(self) -> bool {
        self != Layer::Hidden
    }
}

#[derive(Debug, Clone, Default)]
pub struct View {
    pub layer: Option<Layer>,
    pub position: Point<i32, Logical>,
    pub size: Size<i32, Logical>,
    pub output: Option<OutputId>,
    pub clip: Option<Rectangle<i32, Logical>>,
}

impl View {
    pub fn geometry(&self) -> Rectangle<i32, Logical> {
        Rectangle::new(self.position, self.size)
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    views: SlotMap<ViewId, View>,
    layers: [Vec<ViewId>; 6],
    damage: Vec<OutputId>,
}

impl Scene {
    pub fn create_view(&mut self) -> ViewId {
        self.views.insert(View::default())
    }

    pub fn destroy_view(&mut self, view: ViewId) {
        self.remove(view);
        self.views.remove(view);
    }

    pub fn view(&self, view: ViewId) -> Option<&View> {
        self.views.get(view)
    }

    /// Puts `view` on top of `layer`, taking it out of whatever layer held it.
    pub fn insert(&mut self, layer: Layer, view: ViewId) {
        self.place(layer, view, false);
    }

    /// Puts `view` underneath everything else in `layer`.
    pub fn insert_bottom(&mut self, layer: Layer, view: ViewId) {
        self.place(layer, view, true);
    }

    fn place(&mut self, layer: Layer, view: ViewId, bottom: bool) {
        if !self.views.contains_key(view) {
            return;
        }
        self.remove(view);

        let list = &mut self.layers[layer.index()];
        if bottom {
            list.insert(0, view);
        } else {
            list.push(view);
        }

        let entry = &mut self.views[view];
        entry.layer = Some(layer);
        if layer.is_visible()
            && let Some(output) = entry.output
        {
            self.damage_output(output);
        }
    }

    /// Takes `view` out of the layer stack. Returns whether it was in one.
    pub fn remove(&mut self, view: ViewId) -> bool {
        let Some(entry) = self.views.get_mut(view) else {
            return false;
        };
        let Some(layer) = entry.layer.take() else {
            return false;
        };
        let output = entry.output;
        self.layers[layer.index()].retain(|candidate| *candidate != view);
        if layer.is_visible()
            && let Some(output) = output
        {
            self.damage_output(output);
        }
        true
    }

    pub fn set_position(&mut self, view: ViewId, position: impl Into<Point<i32, Logical>>) {
        if let Some(entry) = self.views.get_mut(view) {
            entry.position = position.into();
        }
    }

    pub fn set_size(&mut self, view: ViewId, size: impl Into<Size<i32, Logical>>) {
        if let Some(entry) = self.views.get_mut(view) {
            entry.size = size.into();
        }
    }

    pub fn set_output(&mut self, view: ViewId, output: Option<OutputId>) {
        if let Some(entry) = self.views.get_mut(view) {
            entry.output = output;
        }
    }

    pub fn set_clip(&mut self, view: ViewId, clip: Option<Rectangle<i32, Logical>>) {
        if let Some(entry) = self.views.get_mut(view) {
            entry.clip = clip;
        }
    }

    pub fn layer_of(&self, view: ViewId) -> Option<Layer> {
        self.views.get(view).and_then(|entry| entry.layer)
    }

    /// Whether the view sits in a user-visible layer.
    pub fn is_mapped(&self, view: ViewId) -> bool {
        self.layer_of(view).is_some_and(Layer::is_visible)
    }

    /// Whether the view sits in any layer, the hidden one included.
    pub fn in_stack(&self, view: ViewId) -> bool {
        self.layer_of(view).is_some()
    }

    /// Views of `layer`, bottom to top.
    pub fn layer_views(&self, layer: Layer) -> &[ViewId] {
        &self.layers[layer.index()]
    }

    /// Visible views shown on `output`, bottom to top across layers.
    pub fn visible_on(&self, output: OutputId) -> Vec<ViewId> {
        Layer::STACK
            .iter()
            .filter(|layer| layer.is_visible())
            .flat_map(|layer| self.layers[layer.index()].iter().copied())
            .filter(|view| self.views[*view].output == Some(output))
            .collect()
    }

    /// Unmaps every view assigned to `output` and detaches them from it.
    pub fn evict_output(&mut self, output: OutputId) -> Vec<ViewId> {
        let evicted: Vec<ViewId> = self
            .views
            .iter()
            .filter(|(_, entry)| entry.output == Some(output))
            .map(|(id, _)| id)
            .collect();
        for view in &evicted {
            self.remove(*view);
            self.views[*view].output = None;
        }
        self.damage.retain(|damaged| *damaged != output);
        evicted
    }

    pub fn damage_output(&mut self, output: OutputId) {
        if !self.damage.contains(&output) {
            self.damage.push(output);
        }
    }

    pub fn take_damage(&mut self) -> Vec<OutputId> {
        std::mem::take(&mut self.damage)
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn output_ids(count: usize) -> Vec<OutputId> {
        let mut keys = SlotMap::<OutputId, ()>::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn reinserting_a_view_never_duplicates_it() {
        let mut scene = Scene::default();
        let view = scene.create_view();

        scene.insert(Layer::Popup, view);
        scene.insert(Layer::Popup, view);
        scene.remove(view);
        scene.insert(Layer::Popup, view);

        assert_eq!(scene.layer_views(Layer::Popup), &[view]);
    }

    #[test]
    fn moving_between_layers_leaves_the_old_layer() {
        let mut scene = Scene::default();
        let view = scene.create_view();

        scene.insert(Layer::Hidden, view);
        assert!(scene.in_stack(view));
        assert!(!scene.is_mapped(view));

        scene.insert(Layer::Normal, view);
        assert!(scene.layer_views(Layer::Hidden).is_empty());
        assert_eq!(scene.layer_of(view), Some(Layer::Normal));
        assert!(scene.is_mapped(view));
    }

    #[test]
    fn insert_bottom_goes_under_existing_views() {
        let mut scene = Scene::default();
        let first = scene.create_view();
        let curtain = scene.create_view();

        scene.insert(Layer::Background, first);
        scene.insert_bottom(Layer::Background, curtain);

        assert_eq!(scene.layer_views(Layer::Background), &[curtain, first]);
    }

    #[test]
    fn visible_changes_damage_the_assigned_output() {
        let outputs = output_ids(2);
        let mut scene = Scene::default();
        let view = scene.create_view();
        scene.set_output(view, Some(outputs[1]));

        scene.insert(Layer::Hidden, view);
        assert!(scene.take_damage().is_empty());

        scene.insert(Layer::Normal, view);
        scene.remove(view);
        assert_eq!(scene.take_damage(), vec![outputs[1]]);
    }

    #[test]
    fn evicting_an_output_unmaps_its_views() {
        let outputs = output_ids(2);
        let mut scene = Scene::default();
        let kept = scene.create_view();
        let evicted = scene.create_view();
        scene.set_output(kept, Some(outputs[0]));
        scene.set_output(evicted, Some(outputs[1]));
        scene.insert(Layer::Normal, kept);
        scene.insert(Layer::Normal, evicted);

        assert_eq!(scene.evict_output(outputs[1]), vec![evicted]);
        assert!(!scene.in_stack(evicted));
        assert_eq!(scene.view(evicted).and_then(|view| view.output), None);
        assert_eq!(scene.visible_on(outputs[0]), vec![kept]);
    }

    #[test]
    fn destroyed_views_do_not_resolve() {
        let mut scene = Scene::default();
        let view = scene.create_view();
        scene.insert(Layer::Panel, view);
        scene.destroy_view(view);

        assert!(scene.view(view).is_none());
        assert!(scene.layer_views(Layer::Panel).is_empty());
        assert!(!scene.remove(view));
    }
}
