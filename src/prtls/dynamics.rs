use crate::projector::Projector2D2Order;
use crate::prtls::Particles;
use crate::{Float, PRTL_CHUNK_SIZE};

use rayon::prelude::*;

/// Per particle scratch the projector needs besides the particle store.
#[derive(Clone, Debug, Default)]
pub struct Dynamics {
    // nearest primal index at the old position, relative to the patch start
    pub iold: Vec<[isize; 2]>,
    // offset from that grid point in cell units, in [-0.5, 0.5]
    pub deltaold: Vec<[Float; 2]>,
    // Lorentz factor after the push
    pub gf: Vec<Float>,
}

impl Dynamics {
    pub fn resize(&mut self, n: usize) {
        self.iold.resize(n, [0; 2]);
        self.deltaold.resize(n, [0.0; 2]);
        self.gf.resize(n, 1.0);
    }

    pub fn len(&self) -> usize {
        self.gf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gf.is_empty()
    }

    /// Snapshot grid location and Lorentz factor of every particle before
    /// it is pushed.
    pub fn record_old(&mut self, particles: &Particles, projector: &Projector2D2Order) {
        self.resize(particles.size());
        (
            &mut self.iold,
            &mut self.deltaold,
            &mut self.gf,
            particles.positions(0),
            particles.positions(1),
            particles.momenta(0),
            particles.momenta(1),
            particles.momenta(2),
        )
            .into_par_iter()
            .chunks(PRTL_CHUNK_SIZE)
            .for_each(|o| {
                o.into_iter()
                    .for_each(|(iold, deltaold, gf, x, y, px, py, pz)| {
                        let (i, d) = projector.locate(*x, *y);
                        *iold = i;
                        *deltaold = d;
                        *gf = (1.0 + px * px + py * py + pz * pz).sqrt();
                    })
            });
    }
}
