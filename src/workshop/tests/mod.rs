//! Unit tests for the workshop module.

mod support;
