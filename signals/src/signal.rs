use std::sync::{Arc, RwLock, Weak};

use crate::control::Control;
use crate::porcelain::subscribe::SubscriptionGuard;
use crate::subscriber::{Consumer, Subscribers};
use crate::value::ValueCell;

/// The producer function of a signal: invoked exactly once, on the zero→one
/// subscriber transition, with the push handle it will feed values through.
pub type Generator<T> = Box<dyn FnOnce(Source<T>) + Send + Sync>;

enum Phase<T> {
    /// Cold: nobody has subscribed yet, the generator has not run.
    Idle(Option<Generator<T>>),
    /// Started: values dispatch to the registered subscribers. `holds` keeps
    /// upstream subscriptions (and anything else the producer parked there)
    /// alive until teardown.
    Live { subscribers: Subscribers<T>, holds: Vec<SubscriptionGuard> },
    /// Torn down: delivers nothing further, ever.
    Terminated,
}

struct Inner<T> {
    value: ValueCell<T>,
    phase: RwLock<Phase<T>>,
}

/// A time-varying value: a current value plus a lazily started producer and an
/// ordered set of subscribers.
///
/// Cloning shares the underlying signal; it lives as long as its longest-lived
/// holder. A signal with no subscribers never runs its producer, and once it
/// terminates (producer finished, or every subscriber detached) it never
/// delivers again.
pub struct Signal<T>(Arc<Inner<T>>);

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Signal<T> {
    /// Calls `f` with a borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R { self.0.value.with(f) }
}

impl<T: Clone> Signal<T> {
    /// Returns a clone of the current value.
    pub fn value(&self) -> T { self.0.value.value() }
}

impl<T> Signal<T>
where T: Send + Sync + 'static
{
    /// Create a signal with the given initial value. `generator` is not
    /// invoked here; it runs once, when the first consumer subscribes.
    pub fn new<G>(initial: T, generator: G) -> Self
    where G: FnOnce(Source<T>) + Send + Sync + 'static {
        Self(Arc::new(Inner {
            value: ValueCell::new(initial),
            phase: RwLock::new(Phase::Idle(Some(Box::new(generator)))),
        }))
    }

    /// A signal that holds `value` and never fires.
    pub fn constant(value: T) -> Self { Self::new(value, |_| {}) }

    /// Register `consumer` for every value pushed from now on. The first
    /// subscriber starts the producer; re-subscribing a consumer that is
    /// already registered is a no-op. A terminated signal delivers nothing:
    /// the consumer is told so via [`Consumer::end`] instead.
    pub fn subscribe(&self, consumer: Arc<dyn Consumer<T>>) {
        enum Outcome<T> {
            Start(Option<Generator<T>>),
            Registered,
            Ended(Arc<dyn Consumer<T>>),
        }

        let outcome = {
            let mut phase = self.0.phase.write().expect("phase lock poisoned");
            match &mut *phase {
                Phase::Idle(generator) => {
                    let generator = generator.take();
                    *phase = Phase::Live { subscribers: Subscribers::single(consumer), holds: Vec::new() };
                    Outcome::Start(generator)
                }
                Phase::Live { subscribers, .. } => {
                    if !subscribers.insert(consumer) {
                        tracing::debug!("duplicate subscription ignored");
                    }
                    Outcome::Registered
                }
                Phase::Terminated => Outcome::Ended(consumer),
            }
        };

        // Lock released: the generator may push synchronously, and an end
        // notification may immediately unsubscribe elsewhere.
        match outcome {
            Outcome::Start(Some(generator)) => {
                tracing::debug!("first subscriber, starting producer");
                generator(Source(Arc::downgrade(&self.0)));
            }
            Outcome::Start(None) => {}
            Outcome::Registered => {}
            Outcome::Ended(consumer) => {
                tracing::debug!("subscription to terminated signal");
                consumer.end();
            }
        }
    }

    /// Remove `consumer`; a no-op if it is not registered. Removing the last
    /// consumer tears the signal down for good.
    pub fn unsubscribe(&self, consumer: &Arc<dyn Consumer<T>>) {
        let holds = {
            let mut phase = self.0.phase.write().expect("phase lock poisoned");
            let drained = match &mut *phase {
                Phase::Live { subscribers, .. } => subscribers.remove(consumer) && subscribers.is_empty(),
                _ => false,
            };
            if !drained {
                return;
            }
            match std::mem::replace(&mut *phase, Phase::Terminated) {
                Phase::Live { holds, .. } => holds,
                _ => Vec::new(),
            }
        };
        tracing::debug!("last subscriber detached, tearing down");
        drop(holds);
    }
}

impl<T> Signal<T>
where T: Clone + Send + Sync + 'static
{
    /// Deliver `value`: the current value is updated first, then every
    /// subscriber is invoked in subscription order. Returns
    /// [`Control::Break`] when nobody is (or remains) subscribed, the cue
    /// for the producer to stop. A push after termination is a safe no-op.
    pub fn push(&self, value: T) -> Control { push_value(&self.0, value) }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (phase, subscribers) = match &*self.0.phase.read().expect("phase lock poisoned") {
            Phase::Idle(_) => ("idle", 0),
            Phase::Live { subscribers, .. } => ("live", subscribers.len()),
            Phase::Terminated => ("terminated", 0),
        };
        f.debug_struct("Signal").field("phase", &phase).field("subscribers", &subscribers).finish()
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.with(|value| write!(f, "{value}")) }
}

/// The push handle a producer receives when its signal starts.
///
/// Holds the signal weakly: a producer never keeps a dead graph alive, and
/// pushing into one that has gone away just reports Break.
pub struct Source<T>(Weak<Inner<T>>);

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Source<T>
where T: Send + Sync + 'static
{
    /// Terminate without a final value: the producer-side Break. Remaining
    /// subscribers are notified via [`Consumer::end`] in subscription order.
    pub fn terminate(&self) {
        if let Some(inner) = self.0.upgrade() {
            terminate(&inner);
        }
    }

    /// Park `guard` in the signal's state until teardown. Derived signals
    /// keep their upstream subscriptions here, so terminating detaches them
    /// from every input at once.
    pub fn hold(&self, guard: SubscriptionGuard) {
        let Some(inner) = self.0.upgrade() else { return };
        let rejected = {
            let mut phase = inner.phase.write().expect("phase lock poisoned");
            match &mut *phase {
                Phase::Live { holds, .. } => {
                    holds.push(guard);
                    None
                }
                // terminated while the producer was still wiring up
                _ => Some(guard),
            }
        };
        drop(rejected);
    }
}

impl<T> Source<T>
where T: Clone + Send + Sync + 'static
{
    /// Deliver `value` to the signal's subscribers. See [`Signal::push`].
    pub fn push(&self, value: T) -> Control {
        match self.0.upgrade() {
            Some(inner) => push_value(&inner, value),
            None => Control::Break,
        }
    }

    /// Deliver a final `value`, then terminate: the Return control value.
    pub fn finish(&self, value: T) {
        if let Some(inner) = self.0.upgrade() {
            let _ = push_value(&inner, value);
            terminate(&inner);
        }
    }
}

fn push_value<T>(inner: &Inner<T>, value: T) -> Control
where T: Clone + Send + Sync + 'static {
    if matches!(&*inner.phase.read().expect("phase lock poisoned"), Phase::Terminated) {
        tracing::debug!("push after termination absorbed");
        return Control::Break;
    }
    // Update before dispatch: a subscriber added mid-pass observes this value.
    inner.value.set(value.clone());
    dispatch(inner, &value)
}

fn dispatch<T>(inner: &Inner<T>, value: &T) -> Control
where T: Send + Sync + 'static {
    enum Pass<T> {
        One(Arc<dyn Consumer<T>>),
        Fan(Vec<Arc<dyn Consumer<T>>>),
    }

    // Snapshot under the lock, invoke outside it: consumers may reentrantly
    // push, subscribe or unsubscribe on this very signal.
    let pass = {
        let phase = inner.phase.read().expect("phase lock poisoned");
        match &*phase {
            Phase::Idle(_) | Phase::Terminated => return Control::Break,
            Phase::Live { subscribers, .. } => match subscribers {
                Subscribers::Empty => return Control::Break,
                Subscribers::Single(consumer) => Pass::One(consumer.clone()),
                Subscribers::Many(all) => Pass::Fan(all.clone()),
            },
        }
    };

    match pass {
        Pass::One(consumer) => {
            if consumer.receive(value).is_break() {
                remove_subscriber(inner, &consumer);
                conclude_pass(inner)
            } else {
                Control::Continue
            }
        }
        Pass::Fan(consumers) => {
            for consumer in &consumers {
                // A peer may have removed this consumer earlier in the pass.
                if !still_registered(inner, consumer) {
                    continue;
                }
                if consumer.receive(value).is_break() {
                    remove_subscriber(inner, consumer);
                }
            }
            conclude_pass(inner)
        }
    }
}

fn still_registered<T>(inner: &Inner<T>, consumer: &Arc<dyn Consumer<T>>) -> bool {
    match &*inner.phase.read().expect("phase lock poisoned") {
        Phase::Live { subscribers, .. } => subscribers.contains(consumer),
        _ => false,
    }
}

fn remove_subscriber<T>(inner: &Inner<T>, consumer: &Arc<dyn Consumer<T>>) {
    let mut phase = inner.phase.write().expect("phase lock poisoned");
    if let Phase::Live { subscribers, .. } = &mut *phase {
        subscribers.remove(consumer);
    }
}

/// Post-pass accounting: tear the signal down if the pass drained the
/// registry, and report Break to the producer when nobody remains.
fn conclude_pass<T>(inner: &Inner<T>) -> Control {
    let holds = {
        let mut phase = inner.phase.write().expect("phase lock poisoned");
        match &*phase {
            Phase::Live { subscribers, .. } if subscribers.is_empty() => {}
            Phase::Live { .. } => return Control::Continue,
            _ => return Control::Break,
        }
        match std::mem::replace(&mut *phase, Phase::Terminated) {
            Phase::Live { holds, .. } => holds,
            _ => Vec::new(),
        }
    };
    tracing::debug!("dispatch drained the subscriber set, tearing down");
    drop(holds);
    Control::Break
}

/// Producer-initiated termination: detach from upstream, then notify the
/// remaining subscribers, in subscription order, that nothing follows.
fn terminate<T>(inner: &Inner<T>) {
    let (subscribers, holds) = {
        let mut phase = inner.phase.write().expect("phase lock poisoned");
        match std::mem::replace(&mut *phase, Phase::Terminated) {
            Phase::Live { subscribers, holds } => (subscribers.drain(), holds),
            Phase::Idle(_) | Phase::Terminated => return,
        }
    };
    tracing::debug!(subscribers = subscribers.len(), "terminating");
    drop(holds);
    for consumer in &subscribers {
        consumer.end();
    }
}
