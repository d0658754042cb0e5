use lesprims_wire::{ListReader, Result};

/// Replies that report the sender's remaining request budget.
///
/// LES calls the budget the buffer value (`BV`), PIP calls it credits
/// remaining. Both mean the same thing to the session layer.
pub trait FlowControlled {
    /// Correlation id echoed from the request.
    fn req_id(&self) -> u64;
    /// Remaining request budget reported by the peer.
    fn buffer_value(&self) -> u64;
}

macro_rules! impl_flow_controlled {
    ($ty:ty, $budget:ident) => {
        impl $crate::reply::FlowControlled for $ty {
            fn req_id(&self) -> u64 {
                self.req_id
            }

            fn buffer_value(&self) -> u64 {
                self.$budget
            }
        }
    };
}

pub(crate) use impl_flow_controlled;

/// Open a `[reqId, budget, ...]` reply, returning the two scalars and the rest.
pub(crate) fn open_reply(payload: &[u8]) -> Result<(u64, u64, ListReader<'_>)> {
    let mut reply = ListReader::top_level(payload)?;
    let req_id = reply.item::<u64>("reqId")?;
    let budget = reply.item::<u64>("bufferValue")?;
    Ok((req_id, budget, reply))
}
