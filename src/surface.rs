//! Shell-managed surfaces and their roles.

use std::{collections::HashMap, fmt};

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};
use smithay::utils::{Logical, Point, Rectangle};

use crate::{ShellError, errors::Result, output::{Edge, OutputId}, scene::ViewId};

new_key_type! {
    pub struct SurfaceId;
}

/// Display-server side identifier of a client surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    None,
    Background,
    Panel,
    Desktop,
    Popup,
    Fullscreen,
    SplitH,
    SplitV,
    Remote,
}

impl RoleKind {
    /// Roles that go through activation and are advertised to desktop clients.
    pub fn is_desktop_family(self) -> bool {
        matches!(self, RoleKind::Desktop | RoleKind::Remote)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::None => "none",
            RoleKind::Background => "background",
            RoleKind::Panel => "panel",
            RoleKind::Desktop => "desktop",
            RoleKind::Popup => "popup",
            RoleKind::Fullscreen => "fullscreen",
            RoleKind::SplitH => "split-horizontal",
            RoleKind::SplitV => "split-vertical",
            RoleKind::Remote => "remote",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Side by side; the split surface takes the right half.
    Vertical,
    /// Stacked; the split surface takes the bottom half.
    Horizontal,
}

/// Progress of a surface through the resize handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Unstaged,
    /// On the hidden layer, waiting for an activation to complete.
    HiddenStaged,
    /// A configure with the target size was sent; waiting for a matching commit.
    Resizing,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundRole {
    pub output: OutputId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRole {
    pub output: OutputId,
    pub edge: Edge,
    /// Mapping was skipped during layout because the client had no geometry yet.
    pub deferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DesktopRole {
    /// Output an activation is in flight for.
    pub pending_output: Option<OutputId>,
    pub last_output: Option<OutputId>,
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteRole {
    /// Output reserved for this application.
    pub output: OutputId,
    pub desktop: DesktopRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    NotShown,
    Shown,
    /// Deactivated; only an explicit activation brings it back.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupRole {
    pub output: OutputId,
    pub anchor: Point<i32, Logical>,
    pub clip: Option<Rectangle<i32, Logical>>,
    pub state: PopupState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenRole {
    pub output: OutputId,
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRole {
    pub output: OutputId,
    pub orientation: Orientation,
    pub stage: Stage,
    /// Rectangle taken from the usable area, relative to the output origin.
    pub rect: Option<Rectangle<i32, Logical>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    None,
    Background(BackgroundRole),
    Panel(PanelRole),
    Desktop(DesktopRole),
    Popup(PopupRole),
    Fullscreen(FullscreenRole),
    Split(SplitRole),
    Remote(RemoteRole),
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::None => RoleKind::None,
            Role::Background(_) => RoleKind::Background,
            Role::Panel(_) => RoleKind::Panel,
            Role::Desktop(_) => RoleKind::Desktop,
            Role::Popup(_) => RoleKind::Popup,
            Role::Fullscreen(_) => RoleKind::Fullscreen,
            Role::Split(split) => match split.orientation {
                Orientation::Vertical => RoleKind::SplitV,
                Orientation::Horizontal => RoleKind::SplitH,
            },
            Role::Remote(_) => RoleKind::Remote,
        }
    }

    /// Output the role is bound to, or the one a desktop was last shown on.
    pub fn output(&self) -> Option<OutputId> {
        match self {
            Role::None => None,
            Role::Background(role) => Some(role.output),
            Role::Panel(role) => Some(role.output),
            Role::Desktop(role) => role.last_output,
            Role::Popup(role) => Some(role.output),
            Role::Fullscreen(role) => Some(role.output),
            Role::Split(role) => Some(role.output),
            Role::Remote(role) => Some(role.output),
        }
    }

    /// Activation state shared by desktop and remote surfaces.
    pub fn desktop(&self) -> Option<DesktopRole> {
        match self {
            Role::Desktop(role) => Some(*role),
            Role::Remote(role) => Some(role.desktop),
            _ => None,
        }
    }

    pub fn panel(&self) -> Option<PanelRole> {
        match self {
            Role::Panel(role) => Some(*role),
            _ => None,
        }
    }

    pub fn popup(&self) -> Option<PopupRole> {
        match self {
            Role::Popup(role) => Some(*role),
            _ => None,
        }
    }

    pub fn fullscreen(&self) -> Option<FullscreenRole> {
        match self {
            Role::Fullscreen(role) => Some(*role),
            _ => None,
        }
    }

    pub fn split(&self) -> Option<SplitRole> {
        match self {
            Role::Split(role) => Some(*role),
            _ => None,
        }
    }

    pub fn desktop_mut(&mut self) -> Option<&mut DesktopRole> {
        match self {
            Role::Desktop(role) => Some(role),
            Role::Remote(role) => Some(&mut role.desktop),
            _ => None,
        }
    }

    pub fn panel_mut(&mut self) -> Option<&mut PanelRole> {
        match self {
            Role::Panel(role) => Some(role),
            _ => None,
        }
    }

    pub fn popup_mut(&mut self) -> Option<&mut PopupRole> {
        match self {
            Role::Popup(role) => Some(role),
            _ => None,
        }
    }

    pub fn fullscreen_mut(&mut self) -> Option<&mut FullscreenRole> {
        match self {
            Role::Fullscreen(role) => Some(role),
            _ => None,
        }
    }

    pub fn split_mut(&mut self) -> Option<&mut SplitRole> {
        match self {
            Role::Split(role) => Some(role),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SurfaceFlags: u8 {
        /// Activation on first commit already happened.
        const ACTIVATED_BY_DEFAULT = 0b0001;
        /// The first commit was handled without auto-activation.
        const CHECKED_PENDING      = 0b0010;
        /// `application` was sent to desktop clients.
        const ADVERTISED           = 0b0100;
        /// `state_app(started)` was sent to desktop clients.
        const STARTED              = 0b1000;
    }
}

/// Surface state as last committed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceState {
    /// Window geometry; `loc` is the offset of the window inside its buffer.
    pub geometry: Rectangle<i32, Logical>,
    pub maximized: bool,
    pub fullscreen: bool,
}

#[derive(Debug)]
pub struct ShellSurface {
    pub handle: SurfaceHandle,
    pub client: ClientId,
    /// Creation order among all surfaces.
    serial: u64,
    pub app_id: Option<String>,
    role: Role,
    pub view: ViewId,
    pub state: SurfaceState,
    pub committed: bool,
    pub flags: SurfaceFlags,
}

impl ShellSurface {
    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn desktop_mut(&mut self) -> Option<&mut DesktopRole> {
        self.role.desktop_mut()
    }

    pub fn panel_mut(&mut self) -> Option<&mut PanelRole> {
        self.role.panel_mut()
    }

    pub fn popup_mut(&mut self) -> Option<&mut PopupRole> {
        self.role.popup_mut()
    }

    pub fn fullscreen_mut(&mut self) -> Option<&mut FullscreenRole> {
        self.role.fullscreen_mut()
    }

    pub fn split_mut(&mut self) -> Option<&mut SplitRole> {
        self.role.split_mut()
    }

    pub fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    /// Sets the role of an unrooted surface. A surface carries one role for
    /// its whole lifetime.
    pub fn assign_role(&mut self, role: Role) -> Result<()> {
        if !matches!(self.role, Role::None) {
            return Err(ShellError::RoleAlreadyAssigned {
                app_id: self.app_id.clone(),
            });
        }
        self.role = role;
        Ok(())
    }

    pub fn app_id_or_default(&self) -> &str {
        self.app_id.as_deref().unwrap_or("<unknown>")
    }
}

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: SlotMap<SurfaceId, ShellSurface>,
    by_handle: HashMap<SurfaceHandle, SurfaceId>,
    /// Live surfaces per app id, oldest first.
    by_app_id: HashMap<String, Vec<SurfaceId>>,
    /// Surfaces still without a role, in creation order.
    unrooted: Vec<SurfaceId>,
    next_serial: u64,
}

impl SurfaceRegistry {
    pub fn insert(
        &mut self,
        handle: SurfaceHandle,
        client: ClientId,
        app_id: Option<String>,
        view: ViewId,
    ) -> SurfaceId {
        let app_id = app_id.filter(|app_id| !app_id.is_empty());
        let serial = self.next_serial;
        self.next_serial += 1;
        let id = self.surfaces.insert(ShellSurface {
            handle,
            client,
            serial,
            app_id: app_id.clone(),
            role: Role::None,
            view,
            state: SurfaceState::default(),
            committed: false,
            flags: SurfaceFlags::empty(),
        });
        self.by_handle.insert(handle, id);
        if let Some(app_id) = app_id {
            self.by_app_id.entry(app_id).or_default().push(id);
        }
        self.unrooted.push(id);
        id
    }

    pub fn remove(&mut self, id: SurfaceId) -> Option<ShellSurface> {
        let surface = self.surfaces.remove(id)?;
        self.by_handle.remove(&surface.handle);
        if let Some(app_id) = &surface.app_id {
            self.unindex_app_id(app_id, id);
        }
        self.unrooted.retain(|candidate| *candidate != id);
        Some(surface)
    }

    fn unindex_app_id(&mut self, app_id: &str, id: SurfaceId) {
        if let Some(ids) = self.by_app_id.get_mut(app_id) {
            ids.retain(|candidate| *candidate != id);
            if ids.is_empty() {
                self.by_app_id.remove(app_id);
            }
        }
    }

    pub fn set_app_id(&mut self, id: SurfaceId, app_id: Option<String>) {
        let app_id = app_id.filter(|app_id| !app_id.is_empty());
        let Some(surface) = self.surfaces.get_mut(id) else {
            return;
        };
        if surface.app_id == app_id {
            return;
        }
        let previous = std::mem::replace(&mut surface.app_id, app_id.clone());
        if let Some(previous) = previous {
            self.unindex_app_id(&previous, id);
        }
        if let Some(app_id) = app_id {
            // Keep the index in creation order so the oldest surface wins.
            let ids = self.by_app_id.entry(app_id).or_default();
            ids.push(id);
            let surfaces = &self.surfaces;
            ids.sort_by_key(|candidate| surfaces.get(*candidate).map(|s| s.serial));
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<&ShellSurface> {
        self.surfaces.get(id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut ShellSurface> {
        self.surfaces.get_mut(id)
    }

    pub fn by_handle(&self, handle: SurfaceHandle) -> Option<SurfaceId> {
        self.by_handle.get(&handle).copied()
    }

    /// Oldest live surface carrying `app_id`.
    pub fn find_by_app_id(&self, app_id: &str) -> Option<SurfaceId> {
        self.by_app_id
            .get(app_id)
            .and_then(|ids| ids.first().copied())
    }

    pub fn all_by_app_id(&self, app_id: &str) -> &[SurfaceId] {
        self.by_app_id.get(app_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn assign_role(&mut self, id: SurfaceId, role: Role) -> Result<()> {
        let Some(surface) = self.surfaces.get_mut(id) else {
            return Err(ShellError::InvalidSurface);
        };
        surface.assign_role(role)?;
        self.unrooted.retain(|candidate| *candidate != id);
        Ok(())
    }

    pub fn serial_of(&self, id: SurfaceId) -> Option<u64> {
        self.surfaces.get(id).map(|surface| surface.serial)
    }

    pub fn unrooted(&self) -> &[SurfaceId] {
        &self.unrooted
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    pub fn ids(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &ShellSurface)> {
        self.surfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
