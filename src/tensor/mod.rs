//! Raw detector output tensors.
//!
//! A detector emits a flat `f32` buffer shaped `[batch, rows, stride]`. Each
//! row is a fixed-width record; the decoders interpret its fields. Views are
//! validated once on construction so every later row access is in bounds.

use crate::util::{DetPostError, DetPostResult};

/// Borrowed view of a `[batch, rows, stride]` output tensor.
#[derive(Copy, Clone, Debug)]
pub struct RawOutputView<'a> {
    data: &'a [f32],
    dims: [usize; 3],
}

impl<'a> RawOutputView<'a> {
    /// Creates a view, checking `data.len() == batch * rows * stride`.
    pub fn new(data: &'a [f32], dims: &[usize]) -> DetPostResult<Self> {
        let dims = checked_dims(dims)?;
        let expected = element_count(dims)?;
        if data.len() != expected {
            return Err(DetPostError::ShapeMismatch {
                dims,
                expected,
                len: data.len(),
            });
        }
        Ok(Self { data, dims })
    }

    /// Returns the `[batch, rows, stride]` shape.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn batch_size(&self) -> usize {
        self.dims[0]
    }

    /// Number of rows per batch entry.
    pub fn num_rows(&self) -> usize {
        self.dims[1]
    }

    /// Number of values in one row.
    pub fn row_stride(&self) -> usize {
        self.dims[2]
    }

    /// Number of rows across all batch entries.
    pub fn total_rows(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    /// Returns true when the tensor holds no rows.
    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns row `index`, counting rows across batch entries.
    pub fn row(&self, index: usize) -> Option<&'a [f32]> {
        let stride = self.row_stride();
        let start = index.checked_mul(stride)?;
        let end = start.checked_add(stride)?;
        self.data.get(start..end)
    }

    /// Iterates every row in buffer order.
    pub fn rows(&self) -> std::slice::ChunksExact<'a, f32> {
        self.data.chunks_exact(self.row_stride())
    }

    /// Returns the `[1, rows, stride]` view of a single batch entry.
    pub fn batch(&self, index: usize) -> DetPostResult<RawOutputView<'a>> {
        if index >= self.batch_size() {
            return Err(DetPostError::IndexOutOfBounds {
                index,
                len: self.batch_size(),
                context: "batch",
            });
        }
        let len = self.num_rows() * self.row_stride();
        let start = index * len;
        Ok(Self {
            data: &self.data[start..start + len],
            dims: [1, self.num_rows(), self.row_stride()],
        })
    }
}

/// Owned detector output tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct RawOutput {
    data: Vec<f32>,
    dims: [usize; 3],
}

impl RawOutput {
    /// Creates an owned tensor, checking the buffer against `dims`.
    pub fn new(data: Vec<f32>, dims: &[usize]) -> DetPostResult<Self> {
        let dims = RawOutputView::new(&data, dims)?.dims();
        Ok(Self { data, dims })
    }

    /// Builds a single-batch tensor from equally sized rows.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> DetPostResult<Self> {
        let stride = match rows.first() {
            Some(row) => row.as_ref().len(),
            None => {
                return Err(DetPostError::InvalidShape {
                    reason: "cannot infer row stride from zero rows",
                })
            }
        };
        let mut data = Vec::with_capacity(rows.len() * stride);
        for row in rows {
            let row = row.as_ref();
            if row.len() != stride {
                return Err(DetPostError::InvalidShape {
                    reason: "rows have different lengths",
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, &[1, rows.len(), stride])
    }

    /// Returns a borrowed view of the tensor.
    pub fn view(&self) -> RawOutputView<'_> {
        RawOutputView {
            data: &self.data,
            dims: self.dims,
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

fn checked_dims(dims: &[usize]) -> DetPostResult<[usize; 3]> {
    let dims: [usize; 3] = dims.try_into().map_err(|_| DetPostError::InvalidShape {
        reason: "dims must be [batch, rows, stride]",
    })?;
    if dims[2] == 0 {
        return Err(DetPostError::InvalidShape {
            reason: "row stride must be non-zero",
        });
    }
    Ok(dims)
}

fn element_count(dims: [usize; 3]) -> DetPostResult<usize> {
    dims[0]
        .checked_mul(dims[1])
        .and_then(|v| v.checked_mul(dims[2]))
        .ok_or(DetPostError::InvalidShape {
            reason: "dims overflow usize",
        })
}
