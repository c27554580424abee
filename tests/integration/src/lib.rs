//! Cross-crate tests for the EduChain registry live under `tests/`.
