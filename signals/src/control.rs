/// Control verdict steering propagation.
///
/// Consumers return one of these from [`Consumer::receive`](crate::Consumer::receive)
/// to tell the dispatching signal what to do with their subscription, and
/// [`Source::push`](crate::Source::push) returns one to tell the producer whether
/// anyone is still listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep the subscription; propagation proceeds normally.
    Continue,
    /// Nothing was propagated this turn; the subscription stays.
    Skip,
    /// Terminate: as a consumer return it unsubscribes that consumer, as a
    /// `push` return it tells the producer to stop producing.
    Break,
}

impl Control {
    pub fn is_break(self) -> bool { matches!(self, Control::Break) }
}
