//! # Covenant Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate scenarios and testable properties
//!     ├── scenarios.rs  # S1-S6 concrete end-to-end scenarios
//!     └── properties.rs # Round-trip, canonicalization, and sign/verify laws
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p covenant-tests
//! ```

pub mod integration;
