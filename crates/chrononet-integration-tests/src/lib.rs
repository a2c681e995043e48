//! Cross-crate end-to-end scenarios for ChronoNet. The tests live under
//! `tests/`.
