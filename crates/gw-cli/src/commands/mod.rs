//! CLI command implementations

pub(crate) mod ls;
pub(crate) mod mark;
pub(crate) mod run;
