use crate::bins::BinPartition;
use crate::{Float, Sim};

use itertools::izip;
pub mod field;
use crate::flds::field::Field;

/// Field components at one particle position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalFields {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

/// The arrays deposition writes: currents staggered the Yee way and the
/// charge density on primal points.
#[derive(Clone, Debug)]
pub struct CurrentSet {
    pub j_x: Field,
    pub j_y: Field,
    pub j_z: Field,
    pub rho: Field,
}

/// Where a sweep accumulates: the patch totals or one species' arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Total,
    Species(usize),
}

/// Mutable views of the current arrays restricted to one bin's window.
pub struct BinCurrents<'a> {
    pub j_x: &'a mut [Float],
    pub j_y: &'a mut [Float],
    pub j_z: &'a mut [Float],
}

/// A private, halo padded copy of one bin's window.
#[derive(Clone, Debug)]
pub struct BinBuffer {
    pub j_x: Vec<Float>,
    pub j_y: Vec<Float>,
    pub j_z: Vec<Float>,
    pub rho: Vec<Float>,
}

impl CurrentSet {
    pub fn new(dim_prim: &[usize; 2], suffix: &str, validate: bool) -> CurrentSet {
        CurrentSet {
            j_x: Field::new_dual_along(&format!("Jx{}", suffix), dim_prim, 0, false)
                .with_validation(validate),
            j_y: Field::new_dual_along(&format!("Jy{}", suffix), dim_prim, 1, false)
                .with_validation(validate),
            j_z: Field::new(&format!("Jz{}", suffix), dim_prim).with_validation(validate),
            rho: Field::new(&format!("Rho{}", suffix), dim_prim).with_validation(validate),
        }
    }

    pub fn zero(&mut self) {
        self.j_x.put_to(0.0);
        self.j_y.put_to(0.0);
        self.j_z.put_to(0.0);
        self.rho.put_to(0.0);
    }

    /// Slices of the patch arrays covering bin `ibin`'s window. Windows of
    /// neighbouring bins overlap, so only one bin may hold a view at a time.
    pub fn bin_view(&mut self, bins: &BinPartition, ibin: usize) -> (BinCurrents<'_>, &mut [Float]) {
        let [b0, b1] = bins.b_dim();
        let ox = bins.offset(ibin, &self.j_x);
        let oy = bins.offset(ibin, &self.j_y);
        let oz = bins.offset(ibin, &self.j_z);
        let orho = bins.offset(ibin, &self.rho);
        (
            BinCurrents {
                j_x: &mut self.j_x.data[ox..ox + (b0 + 1) * b1],
                j_y: &mut self.j_y.data[oy..oy + b0 * (b1 + 1)],
                j_z: &mut self.j_z.data[oz..oz + b0 * b1],
            },
            &mut self.rho.data[orho..orho + b0 * b1],
        )
    }

    fn add(&mut self, other: &CurrentSet) {
        self.j_x.add_window(0, &other.j_x.data);
        self.j_y.add_window(0, &other.j_y.data);
        self.j_z.add_window(0, &other.j_z.data);
        self.rho.add_window(0, &other.rho.data);
    }
}

impl BinBuffer {
    pub fn new(b_dim: [usize; 2]) -> BinBuffer {
        let [b0, b1] = b_dim;
        BinBuffer {
            j_x: vec![0.0; (b0 + 1) * b1],
            j_y: vec![0.0; b0 * (b1 + 1)],
            j_z: vec![0.0; b0 * b1],
            rho: vec![0.0; b0 * b1],
        }
    }

    pub fn zero(&mut self) {
        for v in self.j_x.iter_mut().chain(self.j_y.iter_mut()) {
            *v = 0.0;
        }
        for (jz, rho) in izip!(&mut self.j_z, &mut self.rho) {
            *jz = 0.0;
            *rho = 0.0;
        }
    }

    pub fn view(&mut self) -> (BinCurrents<'_>, &mut [Float]) {
        (
            BinCurrents {
                j_x: &mut self.j_x,
                j_y: &mut self.j_y,
                j_z: &mut self.j_z,
            },
            &mut self.rho,
        )
    }
}

pub struct Flds {
    // The struct that holds all the current and density arrays of the patch.
    // First the totals, then one set per species for diagnostics.
    pub total: CurrentSet,
    pub species: Vec<CurrentSet>,
}

impl Flds {
    pub fn new(sim: &Sim, n_species: usize) -> Flds {
        Flds {
            total: CurrentSet::new(&sim.dim_prim, "", sim.validate),
            species: (0..n_species)
                .map(|i| CurrentSet::new(&sim.dim_prim, &format!("_s{}", i), sim.validate))
                .collect(),
        }
    }

    pub fn zero_currents(&mut self) {
        self.total.zero();
        for set in self.species.iter_mut() {
            set.zero();
        }
    }

    /// Add every species' arrays into the totals.
    pub fn compute_totals(&mut self) {
        let total = &mut self.total;
        for set in self.species.iter() {
            total.add(set);
        }
    }

    pub fn set_mut(&mut self, target: Target) -> &mut CurrentSet {
        match target {
            Target::Total => &mut self.total,
            Target::Species(i) => &mut self.species[i],
        }
    }

    /// Reduce one bin's private buffer into the target arrays.
    pub fn add_bin_buffer(
        &mut self,
        target: Target,
        bins: &BinPartition,
        ibin: usize,
        buf: &BinBuffer,
        with_rho: bool,
    ) {
        let set = self.set_mut(target);
        set.j_x.add_window(bins.offset(ibin, &set.j_x), &buf.j_x);
        set.j_y.add_window(bins.offset(ibin, &set.j_y), &buf.j_y);
        set.j_z.add_window(bins.offset(ibin, &set.j_z), &buf.j_z);
        if with_rho {
            set.rho.add_window(bins.offset(ibin, &set.rho), &buf.rho);
        }
    }
}
