/// Added to each vector norm before dividing, so an all-zero vector yields a
/// finite distance instead of NaN.
pub const NORM_EPSILON: f64 = 1e-12;

/// Compute the cosine distance `1 - (a·b) / (‖a‖·‖b‖)` between two vectors.
///
/// Both vectors are normalized to unit length before the dot product, with
/// [`NORM_EPSILON`] added to each norm. The result lies in `[0, 2]`: 0 for the
/// same direction, 2 for opposite directions, and 1 when either vector is all
/// zeros. Intermediate math is f64.
///
/// Returns 2.0 on a dimension mismatch; callers are expected to check
/// dimensions first.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 2.0;
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for (&ai, &bi) in a.iter().zip(b) {
        let ai = ai as f64;
        let bi = bi as f64;
        dot += ai * bi;
        norm_a += ai * ai;
        norm_b += bi * bi;
    }

    let denom = (norm_a.sqrt() + NORM_EPSILON) * (norm_b.sqrt() + NORM_EPSILON);
    // Clamp to [-1, 1] to absorb rounding.
    let similarity = (dot / denom).clamp(-1.0, 1.0);
    (1.0 - similarity) as f32
}
