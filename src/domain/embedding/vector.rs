//! Fixed-width binary codec for embedding vectors and cosine similarity

use crate::domain::DomainError;

const F32_WIDTH: usize = 4;

/// Encode a vector as consecutive little-endian IEEE-754 single precision values
pub fn encode(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * F32_WIDTH);

    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    bytes
}

/// Decode bytes produced by [`encode`]
///
/// A trailing partial group (fewer than 4 bytes) is ignored.
pub fn decode(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(F32_WIDTH)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors of equal length
///
/// Returns 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DomainError> {
    if a.len() != b.len() {
        return Err(DomainError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
