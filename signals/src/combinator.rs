pub mod filter;
pub mod past;
pub mod sample;
pub mod transform;

pub use sample::sample_on;
pub use transform::{combine, lift, merge, merges};

use crate::control::Control;
use crate::subscriber::Consumer;

/// The internal consumer a derived signal registers on one of its inputs:
/// forwards values through the derivation and cascades the input's
/// termination into the derived signal.
pub(crate) struct Inlet<F, E> {
    forward: F,
    ended: E,
}

impl<F, E> Inlet<F, E> {
    pub fn new(forward: F, ended: E) -> Self { Self { forward, ended } }
}

impl<T, F, E> Consumer<T> for Inlet<F, E>
where
    F: Fn(&T) -> Control + Send + Sync,
    E: Fn() + Send + Sync,
{
    fn receive(&self, value: &T) -> Control { (self.forward)(value) }

    fn end(&self) { (self.ended)() }
}
