//! Leptos Context Menu Utilities
//!
//! Simple right-click menus for Leptos using mouse events.
//! The captured payload survives the menu's visual dismissal for as long as
//! the chosen action is running.

use std::cell::RefCell;
use std::collections::HashMap;

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Viewport position where the menu was opened
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuPosition {
    pub x: i32,
    pub y: i32,
}

/// Menu lifecycle: `Idle -> Open -> Acting -> Idle`
#[derive(Clone, Debug, PartialEq)]
pub enum MenuPhase<T> {
    Idle,
    /// Visible, waiting for the user to pick an action
    Open { at: MenuPosition, payload: T },
    /// Hidden, but an action still owns the payload
    Acting { payload: T },
}

impl<T> Default for MenuPhase<T> {
    fn default() -> Self {
        MenuPhase::Idle
    }
}

impl<T: Clone> MenuPhase<T> {
    /// Open at a position with a fresh payload (replaces whatever was shown)
    pub fn open(&mut self, at: MenuPosition, payload: T) {
        *self = MenuPhase::Open { at, payload };
    }

    /// Hide an open menu. An `Acting` phase keeps its payload.
    /// Returns whether a visible menu was hidden.
    pub fn dismiss(&mut self) -> bool {
        if matches!(self, MenuPhase::Open { .. }) {
            *self = MenuPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Hide the menu and hand the payload to an action
    pub fn begin(&mut self) -> Option<T> {
        match std::mem::take(self) {
            MenuPhase::Open { payload, .. } => {
                let out = payload.clone();
                *self = MenuPhase::Acting { payload };
                Some(out)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// The running action completed
    pub fn finish(&mut self) {
        if matches!(self, MenuPhase::Acting { .. }) {
            *self = MenuPhase::Idle;
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, MenuPhase::Open { .. })
    }

    pub fn position(&self) -> Option<MenuPosition> {
        match self {
            MenuPhase::Open { at, .. } => Some(*at),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            MenuPhase::Open { payload, .. } | MenuPhase::Acting { payload } => Some(payload),
            MenuPhase::Idle => None,
        }
    }
}

/// Menu state signal
pub struct MenuSignals<T: Send + Sync + 'static> {
    pub phase: RwSignal<MenuPhase<T>>,
}

impl<T: Send + Sync + 'static> Clone for MenuSignals<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for MenuSignals<T> {}

pub fn create_menu_signals<T: Clone + Send + Sync + 'static>() -> MenuSignals<T> {
    MenuSignals {
        phase: RwSignal::new(MenuPhase::Idle),
    }
}

impl<T: Clone + Send + Sync + 'static> MenuSignals<T> {
    /// Open at the mouse position of a `contextmenu` event
    pub fn open_at(&self, ev: &web_sys::MouseEvent, payload: T) {
        ev.prevent_default();
        ev.stop_propagation();
        let at = MenuPosition {
            x: ev.client_x(),
            y: ev.client_y(),
        };
        self.phase.update(|phase| phase.open(at, payload));
    }

    /// Hide the menu. A no-op once the owning scope has been disposed.
    pub fn dismiss(&self) {
        if self.phase.try_with_untracked(|phase| phase.is_visible()) == Some(true) {
            self.phase.try_update(|phase| {
                phase.dismiss();
            });
        }
    }

    pub fn begin(&self) -> Option<T> {
        self.phase.try_update(|phase| phase.begin()).flatten()
    }

    /// Actions may outlive the menu's scope, so this tolerates disposal too
    pub fn finish(&self) {
        self.phase.try_update(|phase| phase.finish());
    }

    pub fn is_visible(&self) -> bool {
        self.phase.with(|phase| phase.is_visible())
    }

    pub fn position(&self) -> Option<MenuPosition> {
        self.phase.with(|phase| phase.position())
    }

    pub fn payload(&self) -> Option<T> {
        self.phase.with(|phase| phase.payload().cloned())
    }
}

/// Create a `contextmenu` handler that opens the menu with a payload
pub fn make_on_contextmenu<T, F>(menu: MenuSignals<T>, payload: F) -> impl Fn(web_sys::MouseEvent) + 'static
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + 'static,
{
    move |ev: web_sys::MouseEvent| {
        menu.open_at(&ev, payload());
    }
}

fn event_inside(ev: &web_sys::Event, selector: &str) -> bool {
    ev.target()
        .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
        .is_some()
}

type MouseListener = Closure<dyn FnMut(web_sys::MouseEvent)>;
type KeyListener = Closure<dyn FnMut(web_sys::KeyboardEvent)>;

/// Document listeners held until their scope is cleaned up
struct DismissListeners {
    doc: web_sys::Document,
    on_click: MouseListener,
    on_contextmenu: MouseListener,
    on_keydown: KeyListener,
}

impl DismissListeners {
    fn remove(self) {
        let _ = self
            .doc
            .remove_event_listener_with_callback("click", self.on_click.as_ref().unchecked_ref());
        let _ = self
            .doc
            .remove_event_listener_with_callback("contextmenu", self.on_contextmenu.as_ref().unchecked_ref());
        let _ = self
            .doc
            .remove_event_listener_with_callback("keydown", self.on_keydown.as_ref().unchecked_ref());
    }
}

// Closures are not `Send`, so cleanup callbacks refer to them by id
thread_local! {
    static BOUND: RefCell<HashMap<u64, DismissListeners>> = RefCell::new(HashMap::new());
    static NEXT_ID: RefCell<u64> = const { RefCell::new(0) };
}

/// Bind document listeners that hide the menu:
/// a click outside `menu_selector`, a right-click outside `target_selector`,
/// or the Escape key.
///
/// The listeners are removed when the calling reactive scope is cleaned up.
pub fn bind_global_dismiss<T>(menu: MenuSignals<T>, menu_selector: &'static str, target_selector: &'static str)
where
    T: Clone + Send + Sync + 'static,
{
    let Some(doc) = web_sys::window().and_then(|win| win.document()) else {
        return;
    };

    let on_click = MouseListener::new(move |ev: web_sys::MouseEvent| {
        if !event_inside(&ev, menu_selector) {
            menu.dismiss();
        }
    });
    let _ = doc.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());

    let on_contextmenu = MouseListener::new(move |ev: web_sys::MouseEvent| {
        if !event_inside(&ev, target_selector) {
            menu.dismiss();
        }
    });
    let _ = doc.add_event_listener_with_callback("contextmenu", on_contextmenu.as_ref().unchecked_ref());

    let on_keydown = KeyListener::new(move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" {
            menu.dismiss();
        }
    });
    let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());

    let id = NEXT_ID.with(|next| {
        let mut next = next.borrow_mut();
        *next += 1;
        *next
    });
    BOUND.with(|bound| {
        bound.borrow_mut().insert(
            id,
            DismissListeners {
                doc,
                on_click,
                on_contextmenu,
                on_keydown,
            },
        );
    });

    on_cleanup(move || {
        if let Some(listeners) = BOUND.with(|bound| bound.borrow_mut().remove(&id)) {
            listeners.remove();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> MenuPosition {
        MenuPosition { x, y }
    }

    #[test]
    fn test_open_then_begin_keeps_payload() {
        let mut phase = MenuPhase::default();
        phase.open(at(10, 20), "node-7");
        assert!(phase.is_visible());
        assert_eq!(phase.position(), Some(at(10, 20)));

        assert_eq!(phase.begin(), Some("node-7"));
        assert!(!phase.is_visible());
        assert_eq!(phase.payload(), Some(&"node-7"));

        phase.finish();
        assert_eq!(phase, MenuPhase::Idle);
    }

    #[test]
    fn test_dismiss_during_action_keeps_payload() {
        let mut phase = MenuPhase::default();
        phase.open(at(0, 0), 42);
        phase.begin();
        assert!(!phase.dismiss());
        assert_eq!(phase.payload(), Some(&42));
    }

    #[test]
    fn test_begin_after_dismiss_is_none() {
        let mut phase = MenuPhase::default();
        phase.open(at(0, 0), 1);
        assert!(phase.dismiss());
        assert_eq!(phase.begin(), None);
        assert_eq!(phase, MenuPhase::Idle);
    }

    #[test]
    fn test_signals_ignore_dismiss_after_scope_disposed() {
        let owner = Owner::new();
        let menu = owner.with(|| {
            let menu = create_menu_signals::<i32>();
            menu.phase.update(|phase| phase.open(at(3, 4), 9));
            menu
        });
        menu.dismiss();
        assert!(!menu.phase.with_untracked(|phase| phase.is_visible()));

        owner.cleanup();
        menu.dismiss();
        menu.finish();
        assert_eq!(menu.begin(), None);
    }

    #[test]
    fn test_reopen_during_action_survives_stale_finish() {
        let mut phase = MenuPhase::default();
        phase.open(at(0, 0), 1);
        phase.begin();
        phase.open(at(5, 5), 2);
        phase.finish();
        assert!(phase.is_visible());
        assert_eq!(phase.payload(), Some(&2));
    }
}
