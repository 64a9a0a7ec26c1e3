use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::combinator::Inlet;
use crate::control::Control;
use crate::porcelain::subscribe::SubscriptionGuard;
use crate::signal::{Signal, Source};

impl<T> Signal<T>
where T: Clone + Send + Sync + 'static
{
    /// Keep only values satisfying `predicate`; everything else is a Skip
    /// turn (the fallback is never emitted). The initial value is the current
    /// value when it satisfies `predicate`, otherwise `fallback`.
    pub fn keep_if<P>(&self, predicate: P, fallback: T) -> Signal<T>
    where P: Fn(&T) -> bool + Send + Sync + 'static {
        let initial = if self.with(&predicate) { self.value() } else { fallback };
        let upstream = self.clone();
        Signal::new(initial, move |source: Source<T>| {
            let guard = upstream.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &T| {
                        if predicate(value) { source.push(value.clone()) } else { Control::Skip }
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(guard));
        })
    }

    /// Drop values satisfying `predicate`: the dual of [`keep_if`](Signal::keep_if).
    pub fn drop_if<P>(&self, predicate: P, fallback: T) -> Signal<T>
    where P: Fn(&T) -> bool + Send + Sync + 'static {
        self.keep_if(move |value| !predicate(value), fallback)
    }

    /// Suppress values equal to the previously delivered one: `[1,1,2,2,1]`
    /// becomes `[1,2,1]`. Initial value is kept as-is.
    pub fn drop_repeats(&self) -> Signal<T>
    where T: PartialEq {
        let initial = self.value();
        let last = Arc::new(RwLock::new(initial.clone()));
        let upstream = self.clone();
        Signal::new(initial, move |source: Source<T>| {
            let guard = upstream.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &T| {
                        if *last.read().expect("last delivered lock poisoned") == *value {
                            return Control::Skip;
                        }
                        *last.write().expect("last delivered lock poisoned") = value.clone();
                        source.push(value.clone())
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(guard));
        })
    }

    /// Forward this signal's events only while `gate` is true. On the gate's
    /// false→true transition (repeats de-duplicated) the latest current value
    /// is forwarded immediately, without waiting for a fresh event. Initial
    /// value is the current value when the gate starts true, else `fallback`.
    pub fn keep_when(&self, gate: &Signal<bool>, fallback: T) -> Signal<T> {
        let initial = if gate.value() { self.value() } else { fallback };
        let data = self.clone();
        let gate = gate.clone();
        Signal::new(initial, move |source: Source<T>| {
            let open = Arc::new(AtomicBool::new(gate.value()));
            let flips = gate.drop_repeats();
            let gate_guard = flips.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    let open = open.clone();
                    let data = data.clone();
                    move |flag: &bool| {
                        open.store(*flag, Ordering::Relaxed);
                        if *flag { source.push(data.value()) } else { Control::Skip }
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(gate_guard));

            let data_guard = data.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &T| {
                        if open.load(Ordering::Relaxed) { source.push(value.clone()) } else { Control::Skip }
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(data_guard));
        })
    }

    /// Suppress this signal's events while `gate` is true: the dual of
    /// [`keep_when`](Signal::keep_when), including the rule that the latest
    /// current value is forwarded on the true→false transition.
    pub fn drop_when(&self, gate: &Signal<bool>, fallback: T) -> Signal<T> {
        let initial = if gate.value() { fallback } else { self.value() };
        let data = self.clone();
        let gate = gate.clone();
        Signal::new(initial, move |source: Source<T>| {
            let blocked = Arc::new(AtomicBool::new(gate.value()));
            let flips = gate.drop_repeats();
            let gate_guard = flips.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    let blocked = blocked.clone();
                    let data = data.clone();
                    move |flag: &bool| {
                        blocked.store(*flag, Ordering::Relaxed);
                        if *flag { Control::Skip } else { source.push(data.value()) }
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(gate_guard));

            let data_guard = data.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &T| {
                        if blocked.load(Ordering::Relaxed) { Control::Skip } else { source.push(value.clone()) }
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(data_guard));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collect<T: Clone + Send + Sync + 'static>(signal: &Signal<T>) -> (crate::ListenerGuard<T>, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let guard = signal.listen({
            let seen = seen.clone();
            move |value: &T| seen.lock().unwrap().push(value.clone())
        });
        (guard, seen)
    }

    #[test]
    fn keep_if_initial_value_rules() {
        let odd = Signal::new(1, |_source: Source<i32>| {});
        assert_eq!(odd.keep_if(|n| n % 2 != 0, 0).value(), 1, "kept");
        assert_eq!(odd.keep_if(|n| n % 2 == 0, 0).value(), 0, "fell back");
    }

    #[test]
    fn keep_if_filters_events() {
        let numbers = Signal::new(1, |source: Source<i32>| {
            for n in 2..=5 {
                source.push(n);
            }
        });
        let odds = numbers.keep_if(|n| n % 2 != 0, 0);
        let (_guard, seen) = collect(&odds);
        assert_eq!(*seen.lock().unwrap(), vec![3, 5]);
    }

    #[test]
    fn drop_if_is_the_dual() {
        let numbers = Signal::new(1, |source: Source<i32>| {
            for n in 2..=5 {
                source.push(n);
            }
        });
        let evens = numbers.drop_if(|n| n % 2 != 0, 0);
        assert_eq!(evens.value(), 0);
        let (_guard, seen) = collect(&evens);
        assert_eq!(*seen.lock().unwrap(), vec![2, 4]);
    }

    #[test]
    fn drop_repeats_suppresses_runs() {
        let numbers = Signal::new(0, |source: Source<i32>| {
            for n in [0, 1, 2, 2, 1] {
                source.push(n);
            }
        });
        let distinct = numbers.drop_repeats();
        let (_guard, seen) = collect(&distinct);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
    }
}
