//! Signal: упорядоченный набор listener'ов для edge-triggered событий
//!
//! Один writer на кадр, поэтому вызов синхронный и без локов:
//! listener'ы вызываются в порядке регистрации внутри update().
//! Bevy host дополнительно получает те же события через EventWriter
//! (см. `controller::events`).

/// Handle подписки (для unsubscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener<T> = Box<dyn FnMut(T) + Send + Sync>;

pub struct Signal<T: Copy> {
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_id: u32,
}

impl<T: Copy> Default for Signal<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Copy> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: Copy> Signal<T> {
    pub fn subscribe(&mut self, listener: impl FnMut(T) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    pub fn emit(&mut self, payload: T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
