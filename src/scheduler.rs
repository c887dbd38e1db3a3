//! Single table of named timers for one ghost.
//!
//! Nothing here runs on its own: the owner advances time and pops due events
//! one at a time, handling each before asking for the next. A handler that
//! cancels timers therefore prevents them from firing later in the same
//! advance.

/// Handle for cancelling one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Category a timer belongs to, for bulk cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerGroup {
    /// Repeating ticks of the active behavior regime.
    Behavior,
    /// Reveal/revert of the current click reaction.
    Reaction,
    /// Steps of the disappearance cycle.
    Vanish,
    /// Short visual cues (pop, bump, pause).
    Cue,
    /// Particle expiry.
    Particle,
}

#[derive(Debug, Clone)]
struct Timer<E> {
    id: TimerId,
    group: TimerGroup,
    event: E,
    due_ms: u64,
    period_ms: Option<u64>,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<E> {
    pub id: TimerId,
    pub group: TimerGroup,
    pub event: E,
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E: Copy> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: Vec::with_capacity(16),
        }
    }

    /// Current scheduler time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Fire `event` once, `delay_ms` from now.
    pub fn after(&mut self, delay_ms: u64, group: TimerGroup, event: E) -> TimerId {
        self.insert(self.now_ms + delay_ms, None, group, event)
    }

    /// Fire `event` every `period_ms`, starting one period from now.
    pub fn every(&mut self, period_ms: u64, group: TimerGroup, event: E) -> TimerId {
        let period = period_ms.max(1);
        self.insert(self.now_ms + period, Some(period), group, event)
    }

    fn insert(&mut self, due_ms: u64, period_ms: Option<u64>, group: TimerGroup, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            group,
            event,
            due_ms,
            period_ms,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_group(&mut self, group: TimerGroup) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.group != group);
        before - self.timers.len()
    }

    /// Drop every outstanding timer of every group.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    pub fn pending(&self, group: TimerGroup) -> usize {
        self.timers.iter().filter(|t| t.group == group).count()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Repeating timers are re-armed one period later.
    /// Ties fire in creation order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired<E>> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[idx];
        let fired = Fired {
            id: timer.id,
            group: timer.group,
            event: timer.event,
            at_ms: timer.due_ms,
        };
        let period = timer.period_ms;
        if let Some(period) = period {
            timer.due_ms += period;
        }
        self.now_ms = self.now_ms.max(fired.at_ms);

        if period.is_none() {
            self.timers.swap_remove(idx);
        }
        Some(fired)
    }

    /// Move the clock forward once nothing else is due.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl<E: Copy> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ev {
        Tick,
        Slow,
        Once(u8),
    }

    fn drain(s: &mut Scheduler<Ev>, until: u64) -> Vec<(u64, Ev)> {
        let mut out = Vec::new();
        while let Some(f) = s.pop_due(until) {
            out.push((f.at_ms, f.event));
        }
        s.settle(until);
        out
    }

    #[test]
    fn repeating_and_one_shot_interleave_in_time_order() {
        let mut s = Scheduler::new();
        s.every(100, TimerGroup::Behavior, Ev::Tick);
        s.every(250, TimerGroup::Behavior, Ev::Slow);
        s.after(150, TimerGroup::Cue, Ev::Once(1));

        let fired = drain(&mut s, 300);
        assert_eq!(
            fired,
            vec![
                (100, Ev::Tick),
                (150, Ev::Once(1)),
                (200, Ev::Tick),
                (250, Ev::Slow),
                (300, Ev::Tick),
            ]
        );
        assert_eq!(s.now_ms(), 300);
        assert_eq!(s.pending(TimerGroup::Cue), 0);
        assert_eq!(s.pending(TimerGroup::Behavior), 2);
    }

    #[test]
    fn ties_fire_in_creation_order() {
        let mut s = Scheduler::new();
        s.after(50, TimerGroup::Cue, Ev::Once(2));
        s.after(50, TimerGroup::Reaction, Ev::Once(1));
        let fired = drain(&mut s, 50);
        assert_eq!(fired, vec![(50, Ev::Once(2)), (50, Ev::Once(1))]);
    }

    #[test]
    fn cancel_all_silences_every_group() {
        let mut s = Scheduler::new();
        s.every(10, TimerGroup::Behavior, Ev::Tick);
        s.after(5, TimerGroup::Particle, Ev::Once(0));
        s.after(5, TimerGroup::Vanish, Ev::Once(1));
        assert_eq!(s.cancel_all(), 3);
        assert!(drain(&mut s, 10_000).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_from_a_handler_stops_later_events() {
        let mut s = Scheduler::new();
        let tick = s.every(10, TimerGroup::Behavior, Ev::Tick);
        s.after(25, TimerGroup::Cue, Ev::Once(9));

        let mut fired = Vec::new();
        while let Some(f) = s.pop_due(100) {
            fired.push(f.event);
            if f.event == Ev::Once(9) {
                assert!(s.cancel(tick));
            }
        }
        assert_eq!(fired, vec![Ev::Tick, Ev::Tick, Ev::Once(9)]);
    }

    #[test]
    fn delays_are_relative_to_last_fired_time() {
        let mut s = Scheduler::new();
        s.after(100, TimerGroup::Cue, Ev::Once(0));
        let first = s.pop_due(1_000).unwrap();
        assert_eq!(first.at_ms, 100);
        s.after(100, TimerGroup::Cue, Ev::Once(1));
        let second = s.pop_due(1_000).unwrap();
        assert_eq!(second.at_ms, 200);
    }

    #[test]
    fn cancel_group_leaves_others() {
        let mut s = Scheduler::new();
        s.after(5, TimerGroup::Reaction, Ev::Once(0));
        s.after(6, TimerGroup::Reaction, Ev::Once(1));
        s.after(7, TimerGroup::Cue, Ev::Once(2));
        assert_eq!(s.cancel_group(TimerGroup::Reaction), 2);
        assert_eq!(drain(&mut s, 10), vec![(7, Ev::Once(2))]);
    }
}
