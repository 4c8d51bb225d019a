//! Wire-contract checks for the feedback API. All content lives in `tests/`.
