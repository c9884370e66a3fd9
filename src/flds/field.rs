use crate::Float;

pub struct Pos {
    pub row: usize,
    pub col: usize,
}

/// A dense array of one field quantity on a staggered grid.
///
/// Along every axis the array is either primal (`n` points) or dual
/// (`n + 1` points, offset by half a cell). Data is stored row-major, the
/// last axis varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub data: Vec<Float>,
    dims: Vec<usize>,
    is_dual: Vec<bool>,
    validate: bool,
}

impl Field {
    /// A field that is primal along every axis.
    pub fn new(name: &str, dims: &[usize]) -> Field {
        Field::new_staggered(name, dims, &vec![false; dims.len()])
    }

    /// `dims_prim` are the primal extents; every dual axis gets one more point.
    pub fn new_staggered(name: &str, dims_prim: &[usize], is_dual: &[bool]) -> Field {
        assert_eq!(dims_prim.len(), is_dual.len());
        let dims: Vec<usize> = dims_prim
            .iter()
            .zip(is_dual)
            .map(|(&n, &dual)| n + dual as usize)
            .collect();
        Field {
            name: name.to_string(),
            data: vec![0.0; dims.iter().product()],
            dims,
            is_dual: is_dual.to_vec(),
            validate: cfg!(debug_assertions),
        }
    }

    /// Primal everywhere except possibly along `main_dim`.
    pub fn new_dual_along(name: &str, dims_prim: &[usize], main_dim: usize, is_primal: bool) -> Field {
        let mut is_dual = vec![false; dims_prim.len()];
        is_dual[main_dim] = !is_primal;
        Field::new_staggered(name, dims_prim, &is_dual)
    }

    pub fn with_validation(mut self, validate: bool) -> Field {
        self.validate = validate;
        self
    }

    pub fn set_validation(&mut self, validate: bool) {
        self.validate = validate;
    }

    pub fn validation(&self) -> bool {
        self.validate
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Axes beyond the dimensionality of the field count as primal.
    pub fn is_dual(&self, i: usize) -> bool {
        self.is_dual.get(i).copied().unwrap_or(false)
    }

    pub fn global_dims(&self) -> usize {
        self.data.len()
    }

    /// Number of entries between consecutive indices along the first axis.
    pub fn row_stride(&self) -> usize {
        self.dims[1..].iter().product()
    }

    pub fn get_index(&self, idx: &[usize]) -> usize {
        if self.validate {
            assert_eq!(idx.len(), self.dims.len());
            for (d, (&i, &n)) in idx.iter().zip(&self.dims).enumerate() {
                assert!(i < n, "{} Out of limits {} >= {} along axis {}", self.name, i, n, d);
            }
        }
        idx.iter().zip(&self.dims).fold(0, |acc, (&i, &n)| acc * n + i)
    }

    #[inline(always)]
    pub fn index2(&self, pos: Pos) -> usize {
        // Using a 1d vec to represent the 2D array, rows along x:
        // ------------------------------
        // |  [0]     |  [1]     | ...  |
        // | row: 0   | row: 0   |      |
        // | col: 0   | col: 1   |      |
        // ------------------------------
        // | [dims1]  | [dims1+1]| ...  |
        // | row: 1   | row: 1   |      |
        // | col: 0   | col: 1   |      |
        // ------------------------------
        if self.validate {
            assert!(
                pos.row < self.dims[0] && pos.col < self.dims[1],
                "{} Out of limits & {} {}",
                self.name,
                pos.row,
                pos.col
            );
        }
        pos.row * self.dims[1] + pos.col
    }

    #[inline(always)]
    fn check(&self, i: usize) {
        if self.validate {
            assert!(i < self.data.len(), "{} Out of limits {}", self.name, i);
            assert!(
                self.data[i].is_finite(),
                "{} Not finite {} = {}",
                self.name,
                i,
                self.data[i]
            );
        }
    }

    #[inline(always)]
    pub fn at(&self, i: usize) -> Float {
        self.check(i);
        self.data[i]
    }

    /// The stored value is checked before the reference is handed out, so
    /// a non-finite value written through it is caught on the next access.
    /// Use `set` to check the written value itself.
    #[inline(always)]
    pub fn at_mut(&mut self, i: usize) -> &mut Float {
        self.check(i);
        &mut self.data[i]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, val: Float) {
        self.check(i);
        if self.validate {
            assert!(val.is_finite(), "{} Not finite {} = {}", self.name, i, val);
        }
        self.data[i] = val;
    }

    #[inline(always)]
    pub fn at2(&self, pos: Pos) -> Float {
        let i = self.index2(pos);
        self.at(i)
    }

    #[inline(always)]
    pub fn at2_mut(&mut self, pos: Pos) -> &mut Float {
        let i = self.index2(pos);
        self.at_mut(i)
    }

    #[inline(always)]
    pub fn set2(&mut self, pos: Pos, val: Float) {
        let i = self.index2(pos);
        self.set(i, val)
    }

    pub fn put_to(&mut self, val: Float) {
        for v in self.data.iter_mut() {
            *v = val;
        }
    }

    pub fn multiply(&mut self, val: Float) {
        for v in self.data.iter_mut() {
            *v *= val;
        }
    }

    /// Sum of squares of every entry, accumulated in double precision.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|&v| (v as f64) * (v as f64)).sum()
    }

    /// Sum of squares over the box `start .. start + size`.
    pub fn norm2(&self, start: &[usize], size: &[usize]) -> f64 {
        let ndim = self.dims.len();
        assert!(start.len() == ndim && size.len() == ndim);
        for ((&s, &n), &d) in start.iter().zip(size).zip(&self.dims) {
            assert!(s + n <= d, "{}: norm2 box exceeds the field", self.name);
        }
        if size.iter().any(|&n| n == 0) {
            return 0.0;
        }

        let mut sum = 0.0;
        let mut idx = start.to_vec();
        loop {
            let v = self.data[self.get_index(&idx)] as f64;
            sum += v * v;
            // advance the odometer, last axis fastest
            let mut d = ndim;
            loop {
                if d == 0 {
                    return sum;
                }
                d -= 1;
                idx[d] += 1;
                if idx[d] < start[d] + size[d] {
                    break;
                }
                idx[d] = start[d];
            }
        }
    }

    pub fn copy_from(&mut self, other: &Field) {
        assert_eq!(
            self.data.len(),
            other.data.len(),
            "Field sizes do not match {} {}",
            self.name,
            other.name
        );
        self.data.copy_from_slice(&other.data);
    }

    /// Move the contents `delta` points toward lower indices along the first
    /// axis, filling the vacated rows with zero.
    pub fn shift_x(&mut self, delta: usize) {
        let n = delta * self.row_stride();
        let len = self.data.len();
        if n >= len {
            self.put_to(0.0);
            return;
        }
        self.data.copy_within(n.., 0);
        for v in self.data[len - n..].iter_mut() {
            *v = 0.0;
        }
    }

    /// Scatter-add `src` into the contiguous window starting at `offset`.
    pub fn add_window(&mut self, offset: usize, src: &[Float]) {
        assert!(
            offset + src.len() <= self.data.len(),
            "{}: window {}..{} exceeds the field size {}",
            self.name,
            offset,
            offset + src.len(),
            self.data.len()
        );
        for (v, s) in self.data[offset..offset + src.len()].iter_mut().zip(src) {
            *v += s;
        }
    }
}
