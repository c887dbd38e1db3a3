use std::collections::HashMap;

/// Handle returned by [`ThemeSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Dark-mode signal a ghost observes.
///
/// Subscribers poll for changes; nothing calls back into them, so a
/// subscriber that has gone away only needs to unsubscribe.
pub trait ThemeSource {
    fn is_dark(&self) -> bool;
    fn subscribe(&mut self) -> Subscription;
    fn unsubscribe(&mut self, sub: Subscription);
    /// Latest value published since this subscriber last polled, if any.
    fn poll(&mut self, sub: Subscription) -> Option<bool>;
}

/// In-memory theme signal with per-subscriber pending changes.
#[derive(Debug, Default)]
pub struct ThemeNotifier {
    dark: bool,
    next_id: u64,
    pending: HashMap<Subscription, Option<bool>>,
}

impl ThemeNotifier {
    pub fn new(dark: bool) -> Self {
        Self {
            dark,
            next_id: 0,
            pending: HashMap::new(),
        }
    }

    /// Publish a new value. Repeats of the current value are dropped.
    pub fn set_dark(&mut self, dark: bool) {
        if self.dark == dark {
            return;
        }
        self.dark = dark;
        for slot in self.pending.values_mut() {
            *slot = Some(dark);
        }
        log::debug!("theme changed: dark={dark}, {} subscribers", self.pending.len());
    }

    pub fn subscribers(&self) -> usize {
        self.pending.len()
    }
}

impl ThemeSource for ThemeNotifier {
    fn is_dark(&self) -> bool {
        self.dark
    }

    fn subscribe(&mut self) -> Subscription {
        let sub = Subscription(self.next_id);
        self.next_id += 1;
        self.pending.insert(sub, None);
        sub
    }

    fn unsubscribe(&mut self, sub: Subscription) {
        self.pending.remove(&sub);
    }

    fn poll(&mut self, sub: Subscription) -> Option<bool> {
        self.pending.get_mut(&sub).and_then(Option::take)
    }
}
