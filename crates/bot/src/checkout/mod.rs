//! The checkout dialog state machine.
//!
//! A per-user wizard collecting order details step by step:
//! cart → name → phone → delivery method → address → payment →
//! change/comment → confirmation → persisted order.
//!
//! [`flow::CheckoutFlow`] drives transitions; the surrounding layers
//! only feed it [`event::Event`]s and deliver the returned
//! [`render::Reply`].

pub mod draft;
pub mod event;
pub mod flow;
pub mod render;
pub mod validate;

pub use draft::{CheckoutState, DraftOrder, Session};
pub use event::Event;
pub use flow::{CheckoutFlow, CheckoutSettings, FlowError, StepOutcome};
pub use render::{Button, Reply, ReplyKind};
