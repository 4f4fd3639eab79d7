use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct ObserverKey;
}

/// A list of callbacks delivered in registration order.
///
/// Removals keep the remaining order; a key subscribed after a removal is
/// delivered last even if its slot was recycled.
pub struct ObserverList<T> {
    observers: SlotMap<ObserverKey, Box<dyn FnMut(&T)>>,
    // SlotMap iteration follows slot reuse, not insertion, so the delivery
    // order is kept separately.
    order: Vec<ObserverKey>,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self {
            observers: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&T) + 'static) -> ObserverKey {
        let key = self.observers.insert(Box::new(observer));
        self.order.push(key);
        key
    }

    /// True if the key was registered.
    pub fn unsubscribe(&mut self, key: ObserverKey) -> bool {
        if self.observers.remove(key).is_some() {
            self.order.retain(|k| *k != key);
            true
        } else {
            false
        }
    }

    pub fn emit(&mut self, value: &T) {
        for key in &self.order {
            if let Some(observer) = self.observers.get_mut(*key) {
                observer(value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}
