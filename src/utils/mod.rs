// Shared scoring helpers.

/// Quantization applied to similarity scores before ordering. Two scores
/// closer than this are a tie and fall through to the secondary sort keys.
const SCORE_GRANULARITY: f32 = 1e-4;

/// Integer ordering key for a similarity score. Float summation order can
/// perturb equally-similar candidates by an ulp; comparing quantized keys
/// keeps effectively-tied candidates subject to the deterministic
/// tie-breaks instead of noise.
pub fn score_key(score: f32) -> i64 {
    (score / SCORE_GRANULARITY).round() as i64
}
