// Topic analysis: sentence-to-sentence transitions and intertopic distances.

pub mod traits;
pub mod conditional;
pub mod ranking;
pub mod distance;
