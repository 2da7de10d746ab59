use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};




#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]


/**
 * An owned, row-major array of `f64` with an arbitrary number of axes. Used
 * for raw snapshot datasets and for attributes stacked across a series.
 */
pub struct DenseArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}




// ============================================================================
impl DenseArray {


    /**
     * Create an array from a shape and a row-major buffer. Fails if the
     * buffer length does not match the shape.
     */
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();

        if expected != data.len() {
            return Err(Error::DatasetShape {
                name: String::from("<array>"),
                found: vec![data.len()],
                expected: shape,
            });
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { shape, data: vec![0.0; len] }
    }

    pub fn scalar(value: f64) -> Self {
        Self { shape: Vec::new(), data: vec![value] }
    }


    /**
     * Generate an array by sampling a function of the multi-index.
     */
    pub fn from_function<F: Fn(&[usize]) -> f64>(shape: Vec<usize>, f: F) -> Self {
        let len: usize = shape.iter().product();
        let mut index = vec![0; shape.len()];
        let mut data = Vec::with_capacity(len);

        for _ in 0..len {
            data.push(f(&index));

            for axis in (0..shape.len()).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }


    /**
     * Return the row-major offset of a multi-index, or `None` if the index
     * has the wrong rank or lies outside the array.
     */
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;

        for (i, n) in index.iter().zip(&self.shape) {
            if i >= n {
                return None;
            }
            offset = offset * n + i;
        }
        Some(offset)
    }

    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.offset(index).map(|offset| self.data[offset])
    }


    /**
     * Return the sub-array at position `i` of the leading axis.
     */
    pub fn subarray(&self, i: usize) -> Option<DenseArray> {
        let (&n, rest) = self.shape.split_first()?;

        if i >= n {
            return None;
        }
        let stride: usize = rest.iter().product();
        Some(Self { shape: rest.to_vec(), data: self.data[i * stride..(i + 1) * stride].to_vec() })
    }


    /**
     * Stack arrays of identical shape along a new leading axis.
     */
    pub fn stack(name: &str, arrays: Vec<DenseArray>) -> Result<DenseArray> {
        let inner = arrays.first().map(|a| a.shape.clone()).unwrap_or_default();
        let mut data = Vec::with_capacity(arrays.len() * inner.iter().product::<usize>());

        for array in &arrays {
            if array.shape != inner {
                return Err(Error::ShapeMismatch {
                    name: name.to_string(),
                    found: array.shape.clone(),
                    expected: inner,
                });
            }
            data.extend_from_slice(&array.data);
        }
        let mut shape = vec![arrays.len()];
        shape.extend(inner);
        Ok(Self { shape, data })
    }

    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    pub(crate) fn named(self, name: &str) -> NamedArray<'_> {
        NamedArray { name, array: self }
    }
}




/**
 * A dataset paired with the name it was read under, used to validate
 * shapes with useful error messages.
 */
pub(crate) struct NamedArray<'a> {
    name: &'a str,
    array: DenseArray,
}

impl<'a> NamedArray<'a> {
    pub(crate) fn expect_shape(self, expected: &[usize]) -> Result<DenseArray> {
        if self.array.shape != expected {
            return Err(Error::DatasetShape {
                name: self.name.to_string(),
                found: self.array.shape,
                expected: expected.to_vec(),
            });
        }
        Ok(self.array)
    }
}
