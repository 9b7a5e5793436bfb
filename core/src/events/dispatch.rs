use super::EncounterEvent;
use crate::components::{ComponentRegistry, TickContext};

/// Deliver `event` synchronously to every active component's matching
/// handler, in registration order.
///
/// Must run before the tick's `update` and hint queries. Components that do
/// not handle the event kind, or do not recognise its ids, ignore it.
/// Returns the number of active components the event reached.
pub fn dispatch(event: &EncounterEvent, registry: &mut ComponentRegistry, ctx: &TickContext<'_>) -> usize {
    tracing::trace!(kind = event.kind_name(), time = ctx.time, "Dispatching event");
    let receivers = registry.deliver(event, ctx);
    if receivers == 0 {
        tracing::debug!(kind = event.kind_name(), time = ctx.time, "Event reached no active component");
    }
    receivers
}
