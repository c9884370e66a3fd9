use crate::flds::field::Field;
use crate::projector::{Projector2D2Order, HALO};
use crate::prtls::dynamics::Dynamics;
use crate::prtls::Particles;
use crate::Sim;

use strength_reduce::StrengthReducedUsize;

/// Splits a species into contiguous particle ranges, one per bin of `clrw`
/// cells along x. Bin `k` owns particles `first_index[k]..last_index[k]`
/// and may only write the grid window of primal rows
/// `k * clrw .. k * clrw + b_dim[0]`.
#[derive(Clone, Debug)]
pub struct BinPartition {
    clrw: usize,
    n_bins: usize,
    oversize: usize,
    dim_prim: [usize; 2],
    pub first_index: Vec<usize>,
    pub last_index: Vec<usize>,
    clrw_reduced: StrengthReducedUsize,
}

impl BinPartition {
    pub fn new(sim: &Sim) -> BinPartition {
        BinPartition {
            clrw: sim.clrw,
            n_bins: sim.n_bins,
            oversize: sim.oversize,
            dim_prim: sim.dim_prim,
            first_index: vec![0; sim.n_bins],
            last_index: vec![0; sim.n_bins],
            clrw_reduced: StrengthReducedUsize::new(sim.clrw),
        }
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn clrw(&self) -> usize {
        self.clrw
    }

    /// Primal extents of one bin's window: the bin's cells, the stencil
    /// halo on each side and the closing grid point.
    pub fn b_dim(&self) -> [usize; 2] {
        [self.clrw + 2 * HALO + 1, self.dim_prim[1]]
    }

    /// First primal row of bin `ibin`'s window, in local field indices.
    #[inline(always)]
    pub fn bin_start(&self, ibin: usize) -> usize {
        ibin * self.clrw
    }

    /// Linear offset of bin `ibin`'s window inside `field`.
    #[inline(always)]
    pub fn offset(&self, ibin: usize, field: &Field) -> usize {
        self.bin_start(ibin) * field.row_stride()
    }

    pub fn range(&self, ibin: usize) -> std::ops::Range<usize> {
        self.first_index[ibin]..self.last_index[ibin]
    }

    /// Bin owning a particle whose nearest primal row is `iold_x`. The
    /// closing grid point of the patch rounds into the last bin.
    #[inline(always)]
    pub fn bin_of(&self, iold_x: isize) -> usize {
        let cell = (iold_x - self.oversize as isize).max(0) as usize;
        (cell / self.clrw_reduced).min(self.n_bins - 1)
    }

    /// Stable counting sort of the particles by bin, then refresh the
    /// bin bounds.
    pub fn sort_particles(&mut self, particles: &mut Particles, projector: &Projector2D2Order) {
        let keys: Vec<usize> = (0..particles.size())
            .map(|i| {
                let (iold, _) = projector.locate(particles.position(0, i), particles.position(1, i));
                self.bin_of(iold[0])
            })
            .collect();

        let mut counts = vec![0usize; self.n_bins];
        for &k in keys.iter() {
            counts[k] += 1;
        }
        let mut next = vec![0usize; self.n_bins];
        for ibin in 1..self.n_bins {
            next[ibin] = next[ibin - 1] + counts[ibin - 1];
        }
        let mut order = vec![0usize; keys.len()];
        for (i, &k) in keys.iter().enumerate() {
            order[next[k]] = i;
            next[k] += 1;
        }
        particles.permute(&order);
        self.update_bounds(&counts);
    }

    pub fn update_bounds(&mut self, counts: &[usize]) {
        assert_eq!(counts.len(), self.n_bins);
        let mut start = 0;
        for (first, last, &n) in itertools::izip!(&mut self.first_index, &mut self.last_index, counts)
        {
            *first = start;
            start += n;
            *last = start;
        }
    }

    /// Panics unless the bins tile the particle range and every particle
    /// sits in the bin that owns it.
    pub fn validate(&self, dynamics: &Dynamics) {
        assert_eq!(self.first_index.first(), Some(&0));
        assert_eq!(self.last_index.last(), Some(&dynamics.len()));
        for ibin in 0..self.n_bins {
            assert!(self.first_index[ibin] <= self.last_index[ibin]);
            if ibin + 1 < self.n_bins {
                assert_eq!(self.last_index[ibin], self.first_index[ibin + 1]);
            }
            for ipart in self.range(ibin) {
                assert_eq!(
                    self.bin_of(dynamics.iold[ipart][0]),
                    ibin,
                    "particle {} is outside bin {}",
                    ipart,
                    ibin
                );
            }
        }
    }
}
