//! Small helpers shared by the domain types

pub mod href;
pub mod seconds;
