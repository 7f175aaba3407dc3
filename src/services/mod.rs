//! Business flows that combine the store with remote collaborators.

pub mod portfolio;
