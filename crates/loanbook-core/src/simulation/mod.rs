//! Synthetic loan book and client submissions for exercising the pipeline.

pub mod facilities;
pub mod submissions;

pub use facilities::{generate_facilities, FacilityGenInput, FacilityGenOutput};
pub use submissions::{generate_submissions, SubmissionGenInput, SubmissionGenOutput};

use rand::rngs::StdRng;
use rand::SeedableRng;

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
