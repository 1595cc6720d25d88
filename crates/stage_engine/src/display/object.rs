//! Display object: a node in the display tree

use crate::foundation::collections::{ComponentId, NodeId};
use crate::foundation::math::{Size, Vec2};

bitflags::bitflags! {
    /// Presentation flags of a display object
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DisplayFlags: u8 {
        /// Drawn by the renderer
        const VISIBLE = 1 << 0;
        /// Receives pointer events
        const INTERACTIVE = 1 << 1;
    }
}

/// Ordered list of components attached to one display object
///
/// A component id appears at most once. The list is only mutated through the
/// engine context so that lifecycle hooks always fire.
#[derive(Debug, Default, Clone)]
pub struct ComponentHost {
    components: Vec<ComponentId>,
}

impl ComponentHost {
    /// Attached component ids in attach order
    pub fn ids(&self) -> &[ComponentId] {
        &self.components
    }

    /// Whether the component is attached here
    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains(&id)
    }

    /// Number of attached components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when nothing is attached
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn push(&mut self, id: ComponentId) {
        if !self.contains(id) {
            self.components.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: ComponentId) -> bool {
        let before = self.components.len();
        self.components.retain(|c| *c != id);
        before != self.components.len()
    }
}

/// A node in the display tree
#[derive(Debug, Clone)]
pub struct DisplayObject {
    name: String,
    /// Position relative to the parent
    pub position: Vec2,
    /// Per-axis scale
    pub scale: Vec2,
    /// Rotation in radians, clockwise on screen
    pub rotation: f32,
    /// Opacity in `0.0..=1.0`
    pub alpha: f32,
    /// Width and height in local units
    pub size: Size,
    /// Normalized pivot the renderer places at `position`, `(0, 0)` is the top left
    pub origin: Vec2,
    flags: DisplayFlags,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) host: ComponentHost,
}

impl DisplayObject {
    /// Create a visible, non-interactive object at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            alpha: 1.0,
            size: Size::default(),
            origin: Vec2::zeros(),
            flags: DisplayFlags::VISIBLE,
            parent: None,
            children: Vec::new(),
            host: ComponentHost::default(),
        }
    }

    /// Object name (not required to be unique)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the object
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in draw order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attached components
    pub fn host(&self) -> &ComponentHost {
        &self.host
    }

    /// Width in local units
    pub fn width(&self) -> f32 {
        self.size.width
    }

    /// Height in local units
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Presentation flags
    pub fn flags(&self) -> DisplayFlags {
        self.flags
    }

    /// Whether the renderer draws this object
    pub fn is_visible(&self) -> bool {
        self.flags.contains(DisplayFlags::VISIBLE)
    }

    /// Whether pointer events are routed to this object
    pub fn is_interactive(&self) -> bool {
        self.flags.contains(DisplayFlags::INTERACTIVE)
    }

    /// Show or hide
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.flags.set(DisplayFlags::VISIBLE, visible);
        self
    }

    /// Enable or disable pointer events
    pub fn set_interactive(&mut self, interactive: bool) -> &mut Self {
        self.flags.set(DisplayFlags::INTERACTIVE, interactive);
        self
    }

    /// Set both coordinates
    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Set the horizontal coordinate only
    pub fn set_position_x(&mut self, x: f32) -> &mut Self {
        self.position.x = x;
        self
    }

    /// Set the vertical coordinate only
    pub fn set_position_y(&mut self, y: f32) -> &mut Self {
        self.position.y = y;
        self
    }

    /// Set the scale; a missing `scale_y` makes the scale uniform
    pub fn set_scale(&mut self, scale_x: f32, scale_y: Option<f32>) -> &mut Self {
        self.scale = Vec2::new(scale_x, scale_y.unwrap_or(scale_x));
        self
    }

    /// Set the horizontal scale only
    pub fn set_scale_x(&mut self, scale_x: f32) -> &mut Self {
        self.scale.x = scale_x;
        self
    }

    /// Set the vertical scale only
    pub fn set_scale_y(&mut self, scale_y: f32) -> &mut Self {
        self.scale.y = scale_y;
        self
    }

    /// Set the pivot; a missing `origin_y` uses `origin_x` for both axes
    pub fn set_origin(&mut self, origin_x: f32, origin_y: Option<f32>) -> &mut Self {
        self.origin = Vec2::new(origin_x, origin_y.unwrap_or(origin_x));
        self
    }

    /// Set width and height
    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.size = Size::new(width, height);
        self
    }

    /// Set the width only
    pub fn set_width(&mut self, width: f32) -> &mut Self {
        self.size.width = width;
        self
    }

    /// Set the height only
    pub fn set_height(&mut self, height: f32) -> &mut Self {
        self.size.height = height;
        self
    }

    /// Set opacity, clamped to `0.0..=1.0`
    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_setters() {
        let mut object = DisplayObject::new("logo");
        object
            .set_position(10.0, 20.0)
            .set_scale(2.0, None)
            .set_alpha(1.5)
            .set_interactive(true);

        assert_eq!(object.position, Vec2::new(10.0, 20.0));
        assert_eq!(object.scale, Vec2::new(2.0, 2.0));
        assert_eq!(object.alpha, 1.0);
        assert!(object.is_interactive());
        assert!(object.is_visible());
    }

    #[test]
    fn test_single_axis_setters() {
        let mut object = DisplayObject::new("label");
        object.set_position(1.0, 2.0).set_position_x(5.0);
        assert_eq!(object.position, Vec2::new(5.0, 2.0));
        object.set_position_y(7.0).set_scale(1.0, Some(3.0));
        assert_eq!(object.position, Vec2::new(5.0, 7.0));
        assert_eq!(object.scale, Vec2::new(1.0, 3.0));
    }

    #[test]
    fn test_origin_and_per_axis_size_and_scale() {
        let mut object = DisplayObject::new("card");
        object.set_origin(0.5, None).set_width(120.0).set_height(80.0);
        assert_eq!(object.origin, Vec2::new(0.5, 0.5));
        assert_eq!(object.width(), 120.0);
        assert_eq!(object.height(), 80.0);

        object.set_origin(0.0, Some(1.0)).set_scale_x(2.0).set_scale_y(0.5);
        assert_eq!(object.origin, Vec2::new(0.0, 1.0));
        assert_eq!(object.scale, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn test_host_rejects_duplicate_ids() {
        let mut ids: slotmap::SlotMap<ComponentId, ()> = slotmap::SlotMap::with_key();
        let id = ids.insert(());
        let mut host = ComponentHost::default();
        host.push(id);
        host.push(id);
        assert_eq!(host.len(), 1);
        assert!(host.remove(id));
        assert!(!host.remove(id));
        assert!(host.is_empty());
    }
}
