//! Observable, resettable named values
//!
//! A [`Property`] is the unit of observable state in the simulation: every
//! value an action mutates and a renderer later reads lives in one. Each
//! property keeps two slots, the construction-time `original` and the live
//! `current`, so any effect can be rewound with [`Property::reset`]. Every
//! mutation fires exactly one change notification to the registered
//! listeners; reads never fire.

mod list;

pub use list::{ControlPoint, ControlPointList};

use crate::foundation::math::Vec3;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// RGBA color value with components in `[0, 1]`
///
/// No range validation is performed; callers are responsible for domain
/// validity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
    /// Alpha component
    pub a: f32,
}

impl Color {
    /// Create a new color from RGBA components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Opaque reference to a renderable shape owned by an external module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u64);

/// The closed set of value kinds a property can hold
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Scalar numeric value
    Scalar(f32),
    /// 3D vector value
    Vector(Vec3),
    /// Boolean flag
    Bool(bool),
    /// RGBA color
    Color(Color),
    /// Reference to an externally owned shape
    Shape(ShapeId),
    /// Ordered list of resettable control points
    Points(ControlPointList),
}

/// Change listener invoked with the new current value after every mutation
pub type ChangeListener = Box<dyn FnMut(&PropertyValue)>;

/// Named, observable value with an `original` baseline and a live `current`
/// slot
///
/// Listeners are one-way observers: the property owns them and never holds a
/// back-reference. Cloning a property duplicates value state but drops all
/// listener registrations; the new owner must re-subscribe.
pub struct Property {
    name: String,
    original: PropertyValue,
    current: PropertyValue,
    listeners: Vec<ChangeListener>,
}

impl Property {
    /// Create a property whose original and current slots both hold `value`
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            original: value.clone(),
            current: value,
            listeners: Vec::new(),
        }
    }

    /// Create a scalar property
    pub fn scalar(name: impl Into<String>, value: f32) -> Self {
        Self::new(name, PropertyValue::Scalar(value))
    }

    /// Create a vector property
    pub fn vector(name: impl Into<String>, value: Vec3) -> Self {
        Self::new(name, PropertyValue::Vector(value))
    }

    /// Create a boolean property
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, PropertyValue::Bool(value))
    }

    /// Create a color property
    pub fn color(name: impl Into<String>, value: Color) -> Self {
        Self::new(name, PropertyValue::Color(value))
    }

    /// Create a shape-reference property
    pub fn shape(name: impl Into<String>, value: ShapeId) -> Self {
        Self::new(name, PropertyValue::Shape(value))
    }

    /// Create a control-point list property
    pub fn points(name: impl Into<String>, value: ControlPointList) -> Self {
        Self::new(name, PropertyValue::Points(value))
    }

    /// Get the property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current value; never fires a notification
    pub fn get(&self) -> &PropertyValue {
        &self.current
    }

    /// Get the construction-time baseline value
    pub fn original(&self) -> &PropertyValue {
        &self.original
    }

    /// Replace the current value and fire one change notification
    pub fn set(&mut self, value: PropertyValue) {
        self.current = value;
        self.fire();
    }

    /// Restore `current` to `original` and fire one change notification
    ///
    /// Idempotent: repeated calls keep restoring the same baseline, firing
    /// exactly one notification per call.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.fire();
    }

    /// Register a one-way change observer
    pub fn add_change_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    /// Current value as a scalar, if this is a scalar property
    pub fn as_scalar(&self) -> Option<f32> {
        match self.current {
            PropertyValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Current value as a vector, if this is a vector property
    pub fn as_vector(&self) -> Option<Vec3> {
        match self.current {
            PropertyValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Current value as a boolean, if this is a boolean property
    pub fn as_bool(&self) -> Option<bool> {
        match self.current {
            PropertyValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Current value as a color, if this is a color property
    pub fn as_color(&self) -> Option<Color> {
        match self.current {
            PropertyValue::Color(v) => Some(v),
            _ => None,
        }
    }

    /// Current value as a shape reference, if this is a shape property
    pub fn as_shape(&self) -> Option<ShapeId> {
        match self.current {
            PropertyValue::Shape(v) => Some(v),
            _ => None,
        }
    }

    /// Replace the current scalar value, firing one notification
    pub fn set_scalar(&mut self, value: f32) {
        self.set(PropertyValue::Scalar(value));
    }

    /// Replace the current vector value, firing one notification
    pub fn set_vector(&mut self, value: Vec3) {
        self.set(PropertyValue::Vector(value));
    }

    /// Replace the current boolean value, firing one notification
    pub fn set_bool(&mut self, value: bool) {
        self.set(PropertyValue::Bool(value));
    }

    /// Current control-point list, if this is a points property
    pub fn as_points(&self) -> Option<&ControlPointList> {
        match &self.current {
            PropertyValue::Points(list) => Some(list),
            _ => None,
        }
    }

    /// Mutable access to the control-point list through a notifying guard
    ///
    /// Any number of mutations through the guard coalesce into exactly one
    /// change notification on this property, fired when the guard drops.
    pub fn points_mut(&mut self) -> Option<PointsMut<'_>> {
        match self.current {
            PropertyValue::Points(_) => Some(PointsMut { property: self }),
            _ => None,
        }
    }

    fn fire(&mut self) {
        let current = &self.current;
        for listener in &mut self.listeners {
            listener(current);
        }
    }
}

impl Clone for Property {
    /// Clone value state only; the clone starts with no listeners
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            original: self.original.clone(),
            current: self.current.clone(),
            listeners: Vec::new(),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("original", &self.original)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Guard giving mutable access to a property's control-point list
///
/// Fires exactly one change notification on the owning property when
/// dropped, so a burst of point edits reaches observers as a single
/// coalesced event.
pub struct PointsMut<'a> {
    property: &'a mut Property,
}

impl Deref for PointsMut<'_> {
    type Target = ControlPointList;

    fn deref(&self) -> &Self::Target {
        match &self.property.current {
            PropertyValue::Points(list) => list,
            _ => unreachable!("PointsMut is only constructed for points properties"),
        }
    }
}

impl DerefMut for PointsMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.property.current {
            PropertyValue::Points(list) => list,
            _ => unreachable!("PointsMut is only constructed for points properties"),
        }
    }
}

impl Drop for PointsMut<'_> {
    fn drop(&mut self) {
        self.property.fire();
    }
}

/// Per-node mapping from property name to property, with unique keys
#[derive(Debug, Default, Clone)]
pub struct PropertyBag {
    entries: HashMap<String, Property>,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    /// Look up a property by name for mutation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.entries.get_mut(name)
    }

    /// Install a property, replacing any existing entry with the same name
    pub fn insert(&mut self, property: Property) {
        self.entries.insert(property.name().to_owned(), property);
    }

    /// Install each default only if no property with that name exists
    ///
    /// Idempotent: re-running with the same defaults never overwrites live
    /// values a node already carries.
    pub fn init_properties(&mut self, defaults: &[Property]) {
        for default in defaults {
            if !self.entries.contains_key(default.name()) {
                self.entries.insert(default.name().to_owned(), default.clone());
            }
        }
    }

    /// Whether a property with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of properties in the bag
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the property names in the bag
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
