//! Vector operations shared by the scalar and batch similarity paths
//!
//! One numeric backend for every cosine in the crate: the batch path hoists
//! work out of the loop but calls the same kernels, so scalar and batch
//! results are bit-identical.

/// Dot product with two accumulators for better pipelining.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let mut acc0 = 0.0f32;
    let mut acc1 = 0.0f32;
    let mut i = 0;
    while i + 1 < len {
        acc0 += a[i] * b[i];
        acc1 += a[i + 1] * b[i + 1];
        i += 2;
    }
    if i < len {
        acc0 += a[i] * b[i];
    }
    acc0 + acc1
}

/// Euclidean norm.
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine similarity in [-1, 1]. Returns 0.0 if either vector has zero norm.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}
