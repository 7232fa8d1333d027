//! Store events

mod store_event;

pub use store_event::{MutationKind, StoreEvent};
