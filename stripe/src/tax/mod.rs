//! Tax API resources.

pub mod registrations;
