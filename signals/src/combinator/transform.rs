use std::sync::{Arc, RwLock};

use crate::combinator::Inlet;
use crate::porcelain::subscribe::SubscriptionGuard;
use crate::signal::{Signal, Source};

impl<A> Signal<A>
where A: Clone + Send + Sync + 'static
{
    /// Derive a signal whose value is `f` applied to every value of `self`.
    /// Initial value is `f` applied to the current value.
    pub fn map<B, F>(&self, f: F) -> Signal<B>
    where
        B: Clone + Send + Sync + 'static,
        F: Fn(&A) -> B + Send + Sync + 'static,
    {
        let initial = self.with(|value| f(value));
        let upstream = self.clone();
        Signal::new(initial, move |source: Source<B>| {
            let guard = upstream.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &A| source.push(f(value))
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(guard));
        })
    }
}

/// Combine `inputs` with the n-ary function `f`, recomputing and firing on
/// every individual input update. There is no synchronization barrier, so m
/// updates to one input mean m firings, each using the latest value of every
/// other input. Initial value is `f` over the inputs' initial values.
pub fn lift<A, B, F>(f: F, inputs: &[Signal<A>]) -> Signal<B>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    F: Fn(&[A]) -> B + Send + Sync + 'static,
{
    let values: Vec<A> = inputs.iter().map(|input| input.value()).collect();
    let initial = f(&values);
    let latch = Arc::new(RwLock::new(values));
    let f = Arc::new(f);
    let inputs = inputs.to_vec();
    Signal::new(initial, move |source: Source<B>| {
        for (index, input) in inputs.iter().enumerate() {
            let guard = input.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    let latch = latch.clone();
                    let f = f.clone();
                    move |value: &A| {
                        let values = {
                            let mut values = latch.write().expect("input latch lock poisoned");
                            values[index] = value.clone();
                            values.clone()
                        };
                        source.push(f(&values))
                    }
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(guard));
        }
    })
}

/// `lift` with a tupling function: an ordered sequence of the inputs'
/// current values.
pub fn combine<T>(inputs: &[Signal<T>]) -> Signal<Vec<T>>
where T: Clone + Send + Sync + 'static {
    lift(|values: &[T]| values.to_vec(), inputs)
}

/// Forward whichever input fires. Inputs emitting in the same turn are
/// dispatched in input-list order, so the merge is biased towards the
/// left-most signal. Initial value comes from the first input.
///
/// Panics if `inputs` is empty: a merge of nothing has no initial value.
pub fn merges<T>(inputs: &[Signal<T>]) -> Signal<T>
where T: Clone + Send + Sync + 'static {
    let initial = inputs.first().expect("merges requires at least one input signal").value();
    let inputs = inputs.to_vec();
    Signal::new(initial, move |source: Source<T>| {
        for input in &inputs {
            let guard = input.listen(Arc::new(Inlet::new(
                {
                    let source = source.clone();
                    move |value: &T| source.push(value.clone())
                },
                {
                    let source = source.clone();
                    move || source.terminate()
                },
            )));
            source.hold(SubscriptionGuard::new(guard));
        }
    })
}

/// Merge two signals, biased towards `left` when both fire in the same turn.
pub fn merge<T>(left: &Signal<T>, right: &Signal<T>) -> Signal<T>
where T: Clone + Send + Sync + 'static {
    merges(&[left.clone(), right.clone()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn map_is_lazy_and_transforms() {
        let numbers = Signal::new(1, |source: Source<i32>| {
            source.push(2);
            source.push(3);
        });
        let doubled = numbers.map(|n| n * 2);
        assert_eq!(doubled.value(), 2, "initial value is mapped eagerly");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _guard = doubled.listen({
            let seen = seen.clone();
            move |value: &i32| seen.lock().unwrap().push(*value)
        });
        assert_eq!(*seen.lock().unwrap(), vec![4, 6]);
        assert_eq!(numbers.value(), 3);
    }

    #[test]
    fn combine_orders_current_values() {
        let xs = Signal::new(0, |source: Source<i32>| {
            source.push(1);
        });
        let ys = Signal::constant(10);
        let combined = combine(&[xs, ys]);
        assert_eq!(combined.value(), vec![0, 10]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _guard = combined.listen({
            let seen = seen.clone();
            move |value: &Vec<i32>| seen.lock().unwrap().push(value.clone())
        });
        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 10]]);
    }
}
