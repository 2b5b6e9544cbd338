#![forbid(unsafe_code)]

//! The renderable surface an item controls.
//!
//! [`Element`] is the seam between an item and its rendering environment:
//! inline style writes, live computed-style reads, a forced layout read, a
//! per-signal listener registry, and detaching from the parent container.
//!
//! [`MemoryElement`] is a deterministic in-memory implementation. It models
//! the parts of a browser element an item depends on: computed offsets follow
//! the inline offsets (falling back to `auto`), transforms never change the
//! computed offsets, and detaching works only once. Hosts driving a headless
//! layout use it directly; tests use it to observe every side effect.

use ahash::AHashMap;

use tessera_core::signal::{ElementId, Signal, SignalKind};
use tessera_core::style::StyleMap;

/// A renderable surface owned by exactly one item.
pub trait Element {
    /// Identity used to tell this element's signals from bubbled ones.
    fn id(&self) -> ElementId;

    /// Write one inline style declaration. An empty value unsets the key.
    fn set_style(&mut self, key: &str, value: &str);

    /// Read the live computed value of `key`, if the environment reports one.
    fn computed_style(&self, key: &str) -> Option<String>;

    /// Read the element's rendered height. Hosts must flush pending style
    /// changes before answering, which is what makes this a reflow barrier.
    fn offset_height(&mut self) -> i32;

    /// Register the item's listener for `kind`.
    fn add_listener(&mut self, kind: SignalKind);

    /// Unregister the item's listener for `kind`.
    fn remove_listener(&mut self, kind: SignalKind);

    /// Remove the element from its parent container.
    fn detach(&mut self);

    /// Apply every declaration of `style`, in order.
    fn apply(&mut self, style: &StyleMap) {
        for (key, value) in style.iter() {
            self.set_style(key, value);
        }
    }
}

impl<E: Element + ?Sized> Element for Box<E> {
    fn id(&self) -> ElementId {
        (**self).id()
    }

    fn set_style(&mut self, key: &str, value: &str) {
        (**self).set_style(key, value);
    }

    fn computed_style(&self, key: &str) -> Option<String> {
        (**self).computed_style(key)
    }

    fn offset_height(&mut self) -> i32 {
        (**self).offset_height()
    }

    fn add_listener(&mut self, kind: SignalKind) {
        (**self).add_listener(kind);
    }

    fn remove_listener(&mut self, kind: SignalKind) {
        (**self).remove_listener(kind);
    }

    fn detach(&mut self) {
        (**self).detach();
    }
}

// ---------------------------------------------------------------------------
// MemoryElement
// ---------------------------------------------------------------------------

/// Keys whose computed value is `auto` when no inline value is set.
const AUTO_KEYS: &[&str] = &["left", "top", "right", "bottom", "width", "height"];

/// Deterministic in-memory element.
#[derive(Debug, Clone)]
pub struct MemoryElement {
    id: ElementId,
    inline: AHashMap<String, String>,
    computed_overrides: AHashMap<String, String>,
    listeners: AHashMap<SignalKind, usize>,
    height: i32,
    attached: bool,
    detach_count: u32,
    style_writes: u64,
    reflows: u64,
}

impl MemoryElement {
    /// A fresh, attached element with a unique id.
    pub fn new() -> Self {
        Self::with_id(ElementId::next())
    }

    /// A fresh, attached element with a host-chosen id.
    pub fn with_id(id: ElementId) -> Self {
        Self {
            id,
            inline: AHashMap::new(),
            computed_overrides: AHashMap::new(),
            listeners: AHashMap::new(),
            height: 0,
            attached: true,
            detach_count: 0,
            style_writes: 0,
            reflows: 0,
        }
    }

    /// Set the rendered height reported by [`Element::offset_height`].
    #[must_use]
    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    /// Force the computed value of `key` regardless of inline styles, the
    /// way a stylesheet rule would.
    pub fn set_computed_override(&mut self, key: &str, value: &str) {
        self.computed_overrides.insert(key.to_owned(), value.to_owned());
    }

    /// Current inline value of `key`.
    pub fn style(&self, key: &str) -> Option<&str> {
        self.inline.get(key).map(String::as_str)
    }

    /// All inline declarations, sorted by key.
    pub fn inline_styles(&self) -> StyleMap {
        let mut entries: Vec<_> = self.inline.iter().collect();
        entries.sort();
        entries.into_iter().collect()
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: SignalKind) -> usize {
        self.listeners.get(&kind).copied().unwrap_or(0)
    }

    /// Number of listeners registered across all kinds.
    pub fn total_listeners(&self) -> usize {
        self.listeners.values().sum()
    }

    /// Whether the element is still in its parent container.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// How many times a detach actually removed the element.
    pub fn detach_count(&self) -> u32 {
        self.detach_count
    }

    /// Number of inline style writes so far.
    pub fn style_writes(&self) -> u64 {
        self.style_writes
    }

    /// Number of forced layout reads so far.
    pub fn reflows(&self) -> u64 {
        self.reflows
    }

    /// The signal this element raises for `kind`.
    pub fn signal(&self, kind: SignalKind) -> Signal {
        Signal::new(kind, self.id)
    }
}

impl Default for MemoryElement {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for MemoryElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn set_style(&mut self, key: &str, value: &str) {
        self.style_writes += 1;
        if value.is_empty() {
            self.inline.remove(key);
        } else {
            self.inline.insert(key.to_owned(), value.to_owned());
        }
    }

    fn computed_style(&self, key: &str) -> Option<String> {
        if let Some(value) = self.computed_overrides.get(key) {
            return Some(value.clone());
        }
        match self.inline.get(key) {
            Some(value) => Some(value.clone()),
            None if AUTO_KEYS.contains(&key) => Some("auto".to_owned()),
            None => None,
        }
    }

    fn offset_height(&mut self) -> i32 {
        self.reflows += 1;
        self.height
    }

    fn add_listener(&mut self, kind: SignalKind) {
        *self.listeners.entry(kind).or_insert(0) += 1;
    }

    fn remove_listener(&mut self, kind: SignalKind) {
        if let Some(count) = self.listeners.get_mut(&kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.listeners.remove(&kind);
            }
        }
    }

    fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.detach_count += 1;
        }
    }
}
