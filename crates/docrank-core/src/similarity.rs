/// Floor applied to the norm product so all-zero vectors score 0 instead of NaN.
pub const NORM_EPSILON: f32 = 1e-10;

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity with the denominator floored at [`NORM_EPSILON`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let denom = (l2_norm(a) * l2_norm(b)).max(NORM_EPSILON);
    dot(a, b) / denom
}
