//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required.  Time is virtual: every mock clock advances
//! only when its owner sleeps.

mod scheduler_tests;
