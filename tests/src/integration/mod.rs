//! Cross-crate scenarios (spec section 8's concrete S1-S6 seeds) and the
//! testable properties (round-trip, canonicalization, sign/verify,
//! conceal/reveal, envelope state machine, expiry, statement lifecycle
//! laws) that seed the rest of the suite.

mod properties;
mod scenarios;
