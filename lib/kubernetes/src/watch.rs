/// Events emitted by a list-then-watch stream of Kubernetes objects.
///
/// The initial listing (and every relist after a desync) is framed by `Init`
/// and `InitDone`, objects listed in between arrive as `InitApply`. Once the
/// listing is done, changes arrive as `Apply` and `Deleted`.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<T> {
    /// An object was added or modified
    Apply(T),

    /// An object was deleted
    Deleted(T),

    /// The watch stream was restarted.
    ///
    /// A series of `InitApply` events are expected to follow until all matching objects
    /// have been listed. This event can be used to prepare a buffer for `InitApply` events.
    Init,

    /// Received an object during `Init`
    InitApply(T),

    /// The initialisation is complete
    ///
    /// this can be used as a signal to replace buffered store contents atomically. No more
    /// `InitApply` events will happen until the next `Init` event.
    ///
    /// Any objects that were previously applied but are not listed in any of the `InitApply` events
    /// should be assumed to have been Deleted
    InitDone,
}

impl<T> Event<T> {
    /// Builds the full initial listing of `objects`, `Init` to `InitDone`.
    pub fn listing(objects: impl IntoIterator<Item = T>) -> Vec<Event<T>> {
        std::iter::once(Event::Init)
            .chain(objects.into_iter().map(Event::InitApply))
            .chain(std::iter::once(Event::InitDone))
            .collect()
    }
}
