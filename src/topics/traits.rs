// Topic distance trait: swap-ready abstraction.
//
// The distance mapper only needs "how far apart are these two topic-word
// distributions". Hellinger is the default; anything bounded and symmetric
// can be plugged in without touching the mapper.

/// A statistical distance between two probability vectors of equal length.
pub trait TopicDistance {
    /// Short name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Distance between `p` and `q`. Must be symmetric and zero for `p == q`.
    fn distance(&self, p: &[f64], q: &[f64]) -> f64;
}
