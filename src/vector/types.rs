//! Dense embedding vector type.

use serde::{Deserialize, Serialize};

/// A fixed-dimension embedding, the unit both channels of the semantic
/// pipeline exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Raw components.
    pub data: Vec<f32>,
}

impl Vector {
    /// Wrap raw components into a vector.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// A zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        Self {
            data: vec![0.0; dimension],
        }
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// L2 magnitude.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Scale to unit length in place. Zero vectors stay zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.data {
                *value /= norm;
            }
        }
    }

    /// A unit-length copy.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.normalize();
        normalized
    }

    /// Whether every component is finite.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Borrow the raw component slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_creation() {
        let vector = Vector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(vector.dimension(), 3);
        assert_eq!(vector.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zeros() {
        let vector = Vector::zeros(4);
        assert_eq!(vector.dimension(), 4);
        assert_eq!(vector.norm(), 0.0);
    }

    #[test]
    fn test_norm() {
        let vector = Vector::new(vec![3.0, 4.0]);
        assert!((vector.norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut vector = Vector::new(vec![3.0, 4.0]);
        vector.normalize();
        assert!((vector.norm() - 1.0).abs() < 1e-6);
        assert!((vector.data[0] - 0.6).abs() < 1e-6);
        assert!((vector.data[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_is_noop() {
        let mut vector = Vector::zeros(3);
        vector.normalize();
        assert_eq!(vector.data, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_is_valid() {
        assert!(Vector::new(vec![1.0, 2.0]).is_valid());
        assert!(!Vector::new(vec![f32::NAN, 2.0]).is_valid());
        assert!(!Vector::new(vec![f32::INFINITY]).is_valid());
    }
}
