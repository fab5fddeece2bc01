//! Mixed-integer subsolver capability and its callback boundary.

mod callback;
mod capability;

pub use callback::{CallbackEvent, CallbackHandler, CallbackResponse, LazyRow};
pub use capability::{RowSense, SolveLimits, Subsolver, SubsolverStatus};
