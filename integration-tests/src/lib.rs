//! End-to-end tests against a deployed feature configuration stack live under `tests/`.
