use std::sync::Arc;

use crate::control::Control;

/// A registered receiver of a signal's values.
///
/// The closure form covers almost every use; implement the trait directly when
/// a consumer also needs to observe termination via [`Consumer::end`].
pub trait Consumer<T>: Send + Sync {
    /// Handle a newly pushed value. Returning [`Control::Break`] unsubscribes
    /// this consumer; anything else keeps the subscription.
    fn receive(&self, value: &T) -> Control;

    /// Called once when the signal terminates. Nothing is delivered afterwards.
    fn end(&self) {}
}

impl<T, F> Consumer<T> for F
where F: Fn(&T) -> Control + Send + Sync
{
    fn receive(&self, value: &T) -> Control { self(value) }
}

/// The ordered subscriber collection behind a live signal.
///
/// The single-slot representation carries the dominant one-consumer case with
/// no collection overhead; the second subscriber upgrades it in place. Order
/// is subscription order and dispatch follows it. Consumer identity is Arc
/// identity, so re-registering the same consumer is detectable.
pub(crate) enum Subscribers<T> {
    Empty,
    Single(Arc<dyn Consumer<T>>),
    Many(Vec<Arc<dyn Consumer<T>>>),
}

impl<T> Subscribers<T> {
    pub fn single(consumer: Arc<dyn Consumer<T>>) -> Self { Self::Single(consumer) }

    /// Register `consumer`, preserving order. Returns false (and changes
    /// nothing) if the same consumer is already registered.
    pub fn insert(&mut self, consumer: Arc<dyn Consumer<T>>) -> bool {
        if self.contains(&consumer) {
            return false;
        }
        *self = match std::mem::replace(self, Self::Empty) {
            Self::Empty => Self::Single(consumer),
            Self::Single(first) => Self::Many(vec![first, consumer]),
            Self::Many(mut all) => {
                all.push(consumer);
                Self::Many(all)
            }
        };
        true
    }

    pub fn contains(&self, consumer: &Arc<dyn Consumer<T>>) -> bool {
        match self {
            Self::Empty => false,
            Self::Single(existing) => Arc::ptr_eq(existing, consumer),
            Self::Many(all) => all.iter().any(|existing| Arc::ptr_eq(existing, consumer)),
        }
    }

    /// Remove `consumer` if present, compacting the collection in place.
    /// Returns whether it was registered.
    pub fn remove(&mut self, consumer: &Arc<dyn Consumer<T>>) -> bool {
        match self {
            Self::Empty => false,
            Self::Single(existing) => {
                if Arc::ptr_eq(existing, consumer) {
                    *self = Self::Empty;
                    true
                } else {
                    false
                }
            }
            Self::Many(all) => {
                let before = all.len();
                all.retain(|existing| !Arc::ptr_eq(existing, consumer));
                all.len() != before
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Single(_) => false,
            Self::Many(all) => all.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many(all) => all.len(),
        }
    }

    /// Take every consumer out, in subscription order.
    pub fn drain(self) -> Vec<Arc<dyn Consumer<T>>> {
        match self {
            Self::Empty => Vec::new(),
            Self::Single(consumer) => vec![consumer],
            Self::Many(all) => all,
        }
    }
}
