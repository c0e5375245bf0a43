//! Window-wide keyboard shortcuts and the hub that scopes their listeners.
//!
//! A terminal view installs one listener when it mounts and holds the
//! returned [`ListenerGuard`]; dropping the guard removes the listener. Key
//! presses reach the hub before the input line sees them, so a consumed
//! shortcut never also types into the buffer.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// A recognized shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// `Tab` with the input focused and no modifiers.
    AdvanceView,
    /// `Escape`, regardless of focus.
    Cancel,
    /// `Ctrl+L` / `Cmd+L`, regardless of focus.
    ClearOutput,
}

/// A key press as seen by the shortcut layer.
#[derive(Debug, Clone, Copy)]
pub struct KeyPress<'a> {
    pub key: &'a Key,
    pub modifiers: ModifiersState,
}

/// Map a key press to a shortcut, if it is one. `input_focused` is whether
/// the listening view's input line has focus.
pub fn resolve(press: &KeyPress<'_>, input_focused: bool) -> Option<Shortcut> {
    match press.key {
        Key::Named(NamedKey::Tab) if input_focused && press.modifiers.is_empty() => {
            Some(Shortcut::AdvanceView)
        }
        Key::Named(NamedKey::Escape) => Some(Shortcut::Cancel),
        Key::Character(c)
            if (press.modifiers.control_key() || press.modifiers.super_key())
                && c.eq_ignore_ascii_case("l") =>
        {
            Some(Shortcut::ClearOutput)
        }
        _ => None,
    }
}

/// Whether a key press should continue to the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    /// Default behaviour suppressed.
    Consumed,
}

type Handler = Box<dyn FnMut(&KeyPress<'_>) -> Propagation>;

struct Listener {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// Window-wide key listener registry. Clones share the same registry.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Rc<RefCell<HubInner>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` until the returned guard is dropped.
    pub fn install<F>(&self, handler: F) -> ListenerGuard
    where
        F: FnMut(&KeyPress<'_>) -> Propagation + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push(Listener {
            id,
            handler: Box::new(handler),
        });
        debug!(target: "shortcuts", id, "Listener installed");
        ListenerGuard {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Offer `press` to every listener in install order.
    ///
    /// Returns `Consumed` if any listener consumed it.
    pub fn dispatch(&self, press: &KeyPress<'_>) -> Propagation {
        let mut inner = self.inner.borrow_mut();
        let mut result = Propagation::Continue;
        for listener in inner.listeners.iter_mut() {
            if (listener.handler)(press) == Propagation::Consumed {
                result = Propagation::Consumed;
            }
        }
        result
    }
}

/// Removes its listener from the hub when dropped.
pub struct ListenerGuard {
    hub: std::rc::Weak<RefCell<HubInner>>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().listeners.retain(|l| l.id != self.id);
            debug!(target: "shortcuts", id = self.id, "Listener removed");
        }
    }
}
