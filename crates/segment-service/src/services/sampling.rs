//! Bernoulli sampling for percentage enrollment
//!
//! Every candidate is kept independently with probability `percent / 100`,
//! so the sample size only approximates the requested share.

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;

use super::error::{ServiceError, ServiceResult};

/// Keep each ID independently with probability `percent / 100`
pub fn sample_bernoulli<R: Rng + ?Sized>(
    ids: &[i64],
    percent: u32,
    rng: &mut R,
) -> ServiceResult<Vec<i64>> {
    let dist = Bernoulli::from_ratio(percent, 100).map_err(|e| {
        ServiceError::validation(
            "sample_bernoulli",
            format!("percentage must be within [0, 100], got {percent}"),
        )
        .with_source(e)
    })?;

    Ok(ids.iter().copied().filter(|_| dist.sample(rng)).collect())
}
