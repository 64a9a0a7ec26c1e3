use std::any::Any;
use std::sync::{Arc, Weak};

use crate::control::Control;
use crate::signal::Signal;
use crate::subscriber::Consumer;

/// Conversion into the engine's consumer representation, so `listen` accepts
/// plain closures, channel senders and prebuilt consumers alike.
pub trait IntoConsumer<T> {
    fn into_consumer(self) -> Arc<dyn Consumer<T>>;
}

// Plain closures observe values and never steer propagation.
impl<T, F> IntoConsumer<T> for F
where
    T: 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    fn into_consumer(self) -> Arc<dyn Consumer<T>> {
        Arc::new(move |value: &T| {
            self(value);
            Control::Continue
        })
    }
}

impl<T, C> IntoConsumer<T> for Arc<C>
where
    T: 'static,
    C: Consumer<T> + 'static,
{
    fn into_consumer(self) -> Arc<dyn Consumer<T>> { self }
}

impl<T: 'static> IntoConsumer<T> for Arc<dyn Consumer<T>> {
    fn into_consumer(self) -> Arc<dyn Consumer<T>> { self }
}

// Channel senders bridge a signal into queue-consuming code; a closed channel
// answers Break so the subscription detaches itself.
impl<T> IntoConsumer<T> for std::sync::mpsc::Sender<T>
where T: Clone + Send + Sync + 'static
{
    fn into_consumer(self) -> Arc<dyn Consumer<T>> {
        Arc::new(move |value: &T| match self.send(value.clone()) {
            Ok(()) => Control::Continue,
            Err(_) => Control::Break,
        })
    }
}

#[cfg(feature = "tokio")]
impl<T> IntoConsumer<T> for tokio::sync::mpsc::UnboundedSender<T>
where T: Clone + Send + Sync + 'static
{
    fn into_consumer(self) -> Arc<dyn Consumer<T>> {
        Arc::new(move |value: &T| match self.send(value.clone()) {
            Ok(()) => Control::Continue,
            Err(_) => Control::Break,
        })
    }
}

/// Undoes a [`Signal::listen`] registration when dropped. The guard keeps the
/// listened-to signal alive while held; derived signals park one of these per
/// input, which is what makes their teardown detach every input at once.
///
/// The consumer itself is held weakly; the signal's registry owns it, so a
/// terminated signal releases its consumers (and whatever they captured) even
/// while guards are still around.
pub struct ListenerGuard<T: Send + Sync + 'static> {
    signal: Signal<T>,
    consumer: Weak<dyn Consumer<T>>,
}

impl<T: Send + Sync + 'static> Drop for ListenerGuard<T> {
    fn drop(&mut self) {
        if let Some(consumer) = self.consumer.upgrade() {
            self.signal.unsubscribe(&consumer);
        }
    }
}

/// A type-erased subscription guard, so one collection can hold links to
/// inputs of different value types.
pub struct SubscriptionGuard {
    _link: Box<dyn Any + Send + Sync>,
}

impl SubscriptionGuard {
    pub fn new(link: impl Any + Send + Sync) -> Self { Self { _link: Box::new(link) } }
}

impl<T> Signal<T>
where T: Send + Sync + 'static
{
    /// Subscribe `listener`, returning a guard that unsubscribes on drop.
    pub fn listen<L: IntoConsumer<T>>(&self, listener: L) -> ListenerGuard<T> {
        let consumer = listener.into_consumer();
        let weak = Arc::downgrade(&consumer);
        self.subscribe(consumer);
        ListenerGuard { signal: self.clone(), consumer: weak }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_drop_unsubscribes() {
        let signal = Signal::new(0, |_source: crate::Source<i32>| {});
        let (tx, rx) = std::sync::mpsc::channel();

        let guard = signal.listen(tx);
        signal.push(1);
        assert_eq!(rx.try_recv(), Ok(1));

        drop(guard);
        signal.push(2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_detaches_subscription() {
        let signal = Signal::new(0, |_source: crate::Source<i32>| {});
        let (tx, rx) = std::sync::mpsc::channel::<i32>();

        let _guard = signal.listen(tx);
        drop(rx);

        // the send fails, the consumer answers Break, and the last
        // subscriber leaving terminates the signal
        assert_eq!(signal.push(1), Control::Break);
        assert_eq!(signal.push(2), Control::Break);
    }
}
