pub mod enums;
pub mod patient;
pub mod rule;

pub use enums::{InvalidEnum, Sex};
pub use patient::{AttributeValue, PatientAttributes};
pub use rule::{Constraint, RangeBounds, Rule};
