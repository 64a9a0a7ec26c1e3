use std::sync::{Arc, RwLock};

use crate::combinator::Inlet;
use crate::porcelain::subscribe::SubscriptionGuard;
use crate::signal::{Signal, Source};

impl<T> Signal<T>
where T: Clone + Send + Sync + 'static
{
    /// Past-dependent fold: each event folds into the accumulated value,
    /// `value_n = step(value_n-1, event_n)`. Initial value is `seed`.
    pub fn foldp<Acc, F>(&self, seed: Acc, step: F) -> Signal<Acc>
    where
        Acc: Clone + Send + Sync + 'static,
        F: Fn(&Acc, &T) -> Acc + Send + Sync + 'static,
    {
        let state = Arc::new(RwLock::new(seed.clone()));
        let upstream = self.clone();
        Signal::new(seed, move |source: Source<Acc>| {
            let guard = upstream.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &T| {
                        let previous = state.read().expect("accumulator lock poisoned").clone();
                        let next = step(&previous, value);
                        *state.write().expect("accumulator lock poisoned") = next.clone();
                        source.push(next)
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

    /// Count events: 1 per event, starting at 0.
    pub fn count(&self) -> Signal<u64> { self.foldp(0, |n, _| n + 1) }

    /// Count only the events satisfying `predicate`.
    pub fn count_if<P>(&self, predicate: P) -> Signal<u64>
    where P: Fn(&T) -> bool + Send + Sync + 'static {
        self.keep_if(predicate, self.value()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn foldp_accumulates_in_order() {
        let numbers = Signal::new(0, |source: Source<i32>| {
            for n in 1..=4 {
                source.push(n);
            }
        });
        let sums = numbers.foldp(5, |acc, n| acc + n);
        assert_eq!(sums.value(), 5, "seed is the initial value");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _guard = sums.listen({
            let seen = seen.clone();
            move |value: &i32| seen.lock().unwrap().push(*value)
        });
        assert_eq!(*seen.lock().unwrap(), vec![6, 8, 11, 15]);
        assert_eq!(sums.value(), 15);
    }

    #[test]
    fn count_numbers_every_event() {
        let letters = Signal::new("", |source: Source<&str>| {
            for s in ["a", "b", "c", "d"] {
                source.push(s);
            }
        });
        let counted = letters.count();
        assert_eq!(counted.value(), 0);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _guard = counted.listen({
            let seen = seen.clone();
            move |value: &u64| seen.lock().unwrap().push(*value)
        });
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
    }
}
