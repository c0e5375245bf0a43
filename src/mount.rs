//! Terminal view lifetime: mounting installs the shortcut listener,
//! dropping the mounted view removes it.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use crate::shortcuts::{self, KeyboardHub, ListenerGuard, Propagation};
use crate::terminal::Terminal;

/// A terminal view attached to a window's keyboard hub.
pub struct MountedTerminal {
    terminal: Rc<RefCell<Terminal>>,
    _listener: ListenerGuard,
}

impl MountedTerminal {
    /// Attach `terminal` to `hub`.
    pub fn mount(hub: &KeyboardHub, terminal: Terminal) -> Self {
        let terminal = Rc::new(RefCell::new(terminal));
        let weak = Rc::downgrade(&terminal);

        let listener = hub.install(move |press| {
            let Some(terminal) = weak.upgrade() else {
                return Propagation::Continue;
            };
            let mut terminal = terminal.borrow_mut();
            match shortcuts::resolve(press, terminal.is_focused()) {
                Some(shortcut) => {
                    terminal.apply_shortcut(shortcut);
                    Propagation::Consumed
                }
                None => Propagation::Continue,
            }
        });

        info!(target: "terminal", "Terminal view mounted");
        Self {
            terminal,
            _listener: listener,
        }
    }

    pub fn terminal(&self) -> std::cell::Ref<'_, Terminal> {
        self.terminal.borrow()
    }

    pub fn terminal_mut(&self) -> std::cell::RefMut<'_, Terminal> {
        self.terminal.borrow_mut()
    }
}

impl Drop for MountedTerminal {
    fn drop(&mut self) {
        info!(target: "terminal", "Terminal view unmounted");
    }
}
