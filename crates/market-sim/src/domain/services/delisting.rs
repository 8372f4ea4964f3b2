use crate::config::TierParams;
use rand::Rng;

/// Roll the per-tick rug pull for a token of the given tier
///
/// A zero probability never consults the RNG and never triggers.
pub fn should_delist<R: Rng + ?Sized>(tier: TierParams, rng: &mut R) -> bool {
    if !(tier.rug_probability > 0.0) {
        return false;
    }
    rng.gen_bool(tier.rug_probability.min(1.0))
}
