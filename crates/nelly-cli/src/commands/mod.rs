//! Subcommand implementations

pub(crate) mod evaluate;
pub(crate) mod learners;
