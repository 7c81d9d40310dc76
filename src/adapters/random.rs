//! Random source adapter for random-interval mode.
//!
//! On ESP-IDF the draws come from the hardware RNG (`esp_random`), which
//! is seeded from RF noise once the radio or the bootloader entropy source
//! has run.  On the host a `StdRng` stands in, optionally seeded so that
//! simulations are reproducible.

use crate::app::ports::RandomSource;

#[cfg(not(target_os = "espidf"))]
use rand::{Rng, SeedableRng, rngs::StdRng};

pub struct HardwareRng {
    #[cfg(not(target_os = "espidf"))]
    rng: StdRng,
}

impl Default for HardwareRng {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareRng {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic host-side generator.
    #[cfg(not(target_os = "espidf"))]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for HardwareRng {
    #[cfg(target_os = "espidf")]
    fn uniform(&mut self, max: u32) -> u32 {
        let max = max.max(1);
        // SAFETY: esp_random reads the RNG data register; no preconditions.
        let raw = unsafe { esp_idf_svc::sys::esp_random() };
        raw % max + 1
    }

    #[cfg(not(target_os = "espidf"))]
    fn uniform(&mut self, max: u32) -> u32 {
        self.rng.gen_range(1..=max.max(1))
    }
}
