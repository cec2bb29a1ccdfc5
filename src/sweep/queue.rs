//! The event queue: pending events ordered by the sweep comparator.

use std::cmp::Ordering;

use crate::traits::SweepTraits;

use super::event::Event;

/// An ordered map from points to pending events.
///
/// There is never more than one event per point: callers that find the point
/// already present merge their sub-curves into the existing event. Every
/// ordering probe goes through the traits' `compare_xy`, so the queue has no
/// ordering state of its own.
///
/// Events are kept sorted in reverse sweep order, so the next event to
/// process pops off the back.
pub(crate) struct EventQueue<T: SweepTraits> {
    events: Vec<Event<T>>,
}

impl<T: SweepTraits> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// The point of the leftmost pending event.
    pub fn first_point(&self) -> Option<&T::Point> {
        self.events.last().map(Event::point)
    }

    /// Remove and return the leftmost pending event.
    pub fn pop_first(&mut self) -> Option<Event<T>> {
        self.events.pop()
    }

    /// Where `p` is, or would be inserted, in our reverse-ordered storage.
    fn search(&self, traits: &T, p: &T::Point) -> (usize, bool) {
        let idx = self
            .events
            .partition_point(|e| traits.compare_xy(e.point(), p) == Ordering::Greater);
        let found = self
            .events
            .get(idx)
            .is_some_and(|e| traits.compare_xy(e.point(), p) == Ordering::Equal);
        (idx, found)
    }

    /// Is there a pending event at `p`?
    pub fn contains(&self, traits: &T, p: &T::Point) -> bool {
        self.search(traits, p).1
    }

    /// The pending event at `p`, if any.
    pub fn find_mut(&mut self, traits: &T, p: &T::Point) -> Option<&mut Event<T>> {
        let (idx, found) = self.search(traits, p);
        found.then(move || &mut self.events[idx])
    }

    /// The pending event at `p`, creating an empty one if none exists.
    pub fn find_or_insert(&mut self, traits: &T, p: &T::Point) -> &mut Event<T> {
        let (idx, found) = self.search(traits, p);
        if !found {
            self.events.insert(idx, Event::new(p.clone()));
        }
        &mut self.events[idx]
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
