use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rill_signals::{Consumer, Control, Signal, Source};

/// Collects every value delivered to it; `check` drains what arrived since
/// the last call.
#[allow(unused)]
pub fn watcher<T: Clone + Send + Sync + 'static>() -> (Box<dyn Fn(&T) + Send + Sync>, Box<dyn Fn() -> Vec<T> + Send + Sync>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let accumulate = {
        let seen = seen.clone();
        Box::new(move |value: &T| {
            seen.lock().unwrap().push(value.clone());
        })
    };
    let check = Box::new(move || {
        let drained: Vec<T> = seen.lock().unwrap().drain(..).collect();
        drained
    });
    (accumulate, check)
}

/// A scripted producer: stashes its push handle for the test to drive and
/// records how often the engine started it.
pub struct Probe<T> {
    source: Arc<Mutex<Option<Source<T>>>>,
    starts: Arc<AtomicUsize>,
}

#[allow(unused)]
impl<T: Clone + Send + Sync + 'static> Probe<T> {
    pub fn new(initial: T) -> (Self, Signal<T>) {
        let source = Arc::new(Mutex::new(None));
        let starts = Arc::new(AtomicUsize::new(0));
        let signal = Signal::new(initial, {
            let source = source.clone();
            let starts = starts.clone();
            move |handle| {
                starts.fetch_add(1, Ordering::SeqCst);
                *source.lock().unwrap() = Some(handle);
            }
        });
        (Self { source, starts }, signal)
    }

    pub fn started(&self) -> bool { self.starts() > 0 }

    pub fn starts(&self) -> usize { self.starts.load(Ordering::SeqCst) }

    pub fn push(&self, value: T) -> Control { self.handle().push(value) }

    pub fn finish(&self, value: T) { self.handle().finish(value) }

    pub fn terminate(&self) { self.handle().terminate() }

    fn handle(&self) -> Source<T> { self.source.lock().unwrap().clone().expect("producer was never started") }
}

/// A consumer that records deliveries and end notifications, with a
/// configurable verdict per value.
#[allow(unused)]
pub struct Client<T> {
    messages: Mutex<Vec<T>>,
    ends: AtomicUsize,
    verdict: Box<dyn Fn(&T) -> Control + Send + Sync>,
}

#[allow(unused)]
impl<T: Clone + Send + Sync + 'static> Client<T> {
    pub fn new() -> Arc<Self> { Self::with_verdict(|_| Control::Continue) }

    pub fn with_verdict(verdict: impl Fn(&T) -> Control + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { messages: Mutex::new(Vec::new()), ends: AtomicUsize::new(0), verdict: Box::new(verdict) })
    }

    pub fn messages(&self) -> Vec<T> { self.messages.lock().unwrap().clone() }

    pub fn ends(&self) -> usize { self.ends.load(Ordering::SeqCst) }
}

impl<T: Clone + Send + Sync + 'static> Consumer<T> for Client<T> {
    fn receive(&self, value: &T) -> Control {
        self.messages.lock().unwrap().push(value.clone());
        (self.verdict)(value)
    }

    fn end(&self) { self.ends.fetch_add(1, Ordering::SeqCst); }
}
