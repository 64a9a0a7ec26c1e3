/*!
A push-based reactive signal propagation engine.

A [`Signal`] is a time-varying value: it holds a current value and feeds every
pushed update synchronously to its subscribers, in subscription order. Derived
signals built by the combinators (map/lift, merge, foldp, the filters,
sample_on) recompute on upstream change using nothing but the public
subscribe/push surface.

# Design requirements
- Producers are lazy: a signal's generator runs once, when the first consumer
  subscribes. A signal nobody observes never produces.
- Dispatch is synchronous and cooperative: one pushed value propagates through
  the whole downstream graph on the caller's stack, with no queue in between.
- Control flows on the same path as data: a consumer answers
  [`Control::Break`] to unsubscribe, a producer learns from `push`'s return
  value that nobody is listening, and termination is monotonic: a signal
  that ended stays ended.
- Misuse is absorbed, not raised: pushing after termination, duplicate
  subscription and stray unsubscribes are defensive no-ops.

# Basic usage

```rust
use rill_signals::{Signal, Source};
use std::sync::{Arc, Mutex};

// A producer receives its push handle when the first consumer subscribes;
// this one hands the handle to the outside world, like an event source would.
let slot = Arc::new(Mutex::new(None));
let numbers = Signal::new(0, {
    let slot = slot.clone();
    move |source: Source<i32>| *slot.lock().unwrap() = Some(source)
});

let doubled = numbers.map(|n| n * 2);
assert_eq!(doubled.value(), 0);

let seen = Arc::new(Mutex::new(Vec::new()));
let _guard = doubled.listen({
    let seen = seen.clone();
    move |value: &i32| seen.lock().unwrap().push(*value)
});

// Subscribing started the producer.
let source = slot.lock().unwrap().take().unwrap();
source.push(3);
source.push(4);

assert_eq!(*seen.lock().unwrap(), vec![6, 8]);
assert_eq!(numbers.value(), 4);
assert_eq!(doubled.value(), 8);
```

# Consumers steering propagation

```rust
use rill_signals::{Consumer, Control, Signal, Source};
use std::sync::Arc;

let signal = Signal::new(0, |_source: Source<i32>| {});

// A consumer that unsubscribes itself after the first value.
let one_shot: Arc<dyn Consumer<i32>> = Arc::new(|_: &i32| Control::Break);
signal.subscribe(one_shot);

assert_eq!(signal.push(1), Control::Break); // nobody left afterwards
```
*/

mod combinator;
mod control;
mod porcelain;
mod signal;
mod subscriber;
mod value;

pub use combinator::{combine, lift, merge, merges, sample_on};
pub use control::Control;
pub use porcelain::subscribe::{IntoConsumer, ListenerGuard, SubscriptionGuard};
#[cfg(feature = "tokio")]
pub use porcelain::wait::{Wait, WaitResult};
pub use signal::{Generator, Signal, Source};
pub use subscriber::Consumer;
