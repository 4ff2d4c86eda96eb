use crate::entities::WindowEventKind;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type ListenerId = u64;

#[derive(Debug, Default)]
struct Registrations {
    next_id: ListenerId,
    listeners: BTreeMap<ListenerId, (WindowEventKind, String)>,
}

/// Registry for window-level listeners (terminal focus loss, resize, scroll).
///
/// Registration hands back a [`ListenerGuard`]; the listener stays registered
/// exactly as long as the guard lives. Clones share the same registrations.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registrations>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind` on behalf of `owner`
    pub fn subscribe(&self, kind: WindowEventKind, owner: impl Into<String>) -> ListenerGuard {
        let owner = owner.into();
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        log::debug!("Registering {:?} listener #{} for {}", kind, id, owner);
        inner.listeners.insert(id, (kind, owner));

        ListenerGuard {
            id,
            kind,
            registry: self.clone(),
        }
    }

    /// Number of live listeners for `kind`
    pub fn listener_count(&self, kind: WindowEventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.contains_key(&id)
    }

    /// List all registered listeners as (kind, owner)
    pub fn list_listeners(&self) -> Vec<(WindowEventKind, String)> {
        self.inner.borrow().listeners.values().cloned().collect()
    }

    fn unsubscribe(&self, id: ListenerId) {
        if let Some((kind, owner)) = self.inner.borrow_mut().listeners.remove(&id) {
            log::debug!("Removed {:?} listener #{} for {}", kind, id, owner);
        }
    }
}

/// A live registration. Dropping it deregisters the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    id: ListenerId,
    kind: WindowEventKind,
    registry: ListenerRegistry,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn kind(&self) -> WindowEventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.registry.is_registered(self.id)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id);
    }
}
