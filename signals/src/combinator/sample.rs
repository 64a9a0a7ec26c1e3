use std::sync::Arc;

use crate::combinator::Inlet;
use crate::control::Control;
use crate::porcelain::subscribe::SubscriptionGuard;
use crate::signal::{Signal, Source};

/// Emit `data`'s current value on every `ticks` firing. The tick's own value
/// is discarded, and `data`'s updates between ticks do not fire. Initial
/// value is `data`'s current value.
pub fn sample_on<A, T>(ticks: &Signal<A>, data: &Signal<T>) -> Signal<T>
where
    A: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    let initial = data.value();
    let ticks = ticks.clone();
    let data = data.clone();
    Signal::new(initial, move |source: Source<T>| {
        // Watch data solely so its termination reaches this signal; every
        // value update of it is a Skip turn.
        let data_guard = data.listen(Arc::new(Inlet::new(|_: &T| Control::Skip, {
            let source = source.clone();
            move || source.terminate()
        })));
        source.hold(SubscriptionGuard::new(data_guard));

        let tick_guard = ticks.listen(Arc::new(Inlet::new(
            {
                let source = source.clone();
                let data = data.clone();
                move |_: &A| source.push(data.value())
            },
            {
                let source = source.clone();
                move || source.terminate()
            },
        )));
        source.hold(SubscriptionGuard::new(tick_guard));
    })
}
