use crate::signal::Signal;

/// Await signal values from async code.
///
/// The engine dispatches synchronously; these helpers bridge it into async by
/// subscribing an unbounded channel sender and looping over what arrives.
/// Termination drops the sender, which closes the channel and resolves the
/// wait with "no match".
pub trait Wait<T: 'static> {
    /// Resolve once the signal's value equals `target`. Returns false if the
    /// signal terminated before that happened.
    fn wait_value(&self, target: T) -> impl std::future::Future<Output = bool> + Send
    where T: PartialEq + Clone + Send + Sync;

    /// Resolve once `predicate` yields a result for the current or a future
    /// value; None if the signal terminated first.
    fn wait_for<F, R>(&self, predicate: F) -> impl std::future::Future<Output = Option<R::Output>> + Send
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: WaitResult,
        T: Send + Sync;
}

/// Helper trait for `wait_for` to allow flexible predicate return types.
///
/// ## Semantics
/// - `result()` returns `Some(output)` to stop waiting and return `output`
/// - `result()` returns `None` to continue waiting for the next signal update
pub trait WaitResult {
    type Output;
    /// Returns Some(output) if we should stop waiting, None if we should continue
    fn result(self) -> Option<Self::Output>;
}

// Blanket impl for bool: true = stop with (), false = continue waiting
impl WaitResult for bool {
    type Output = ();
    fn result(self) -> Option<Self::Output> { if self { Some(()) } else { None } }
}

// Blanket impl for Option<T>: Some(value) = stop with value, None = continue waiting
impl<T> WaitResult for Option<T> {
    type Output = T;
    fn result(self) -> Option<Self::Output> { self }
}

impl<T> Wait<T> for Signal<T>
where T: Clone + Send + Sync + 'static
{
    fn wait_value(&self, target: T) -> impl std::future::Future<Output = bool> + Send
    where T: PartialEq + Clone + Send + Sync {
        async move { self.wait_for(move |value: &T| *value == target).await.is_some() }
    }

    fn wait_for<F, R>(&self, predicate: F) -> impl std::future::Future<Output = Option<R::Output>> + Send
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: WaitResult,
        T: Send + Sync,
    {
        async move {
            // Check the current value first
            if let Some(result) = self.with(|value| predicate(value).result()) {
                return Some(result);
            }

            // Bridge sync dispatch to async through a channel subscription
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let _guard = self.listen(tx);

            while let Some(value) = rx.recv().await {
                if let Some(result) = predicate(&value).result() {
                    return Some(result);
                }
            }

            // Channel closed: the signal terminated before a match
            None
        }
    }
}
