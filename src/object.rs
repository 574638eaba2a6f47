//! Instances and their dirty state.

pub mod business_object;
pub mod dirty;
pub mod value;

pub use business_object::BusinessObject;
pub use dirty::DirtyState;
pub use value::TrackedValue;
