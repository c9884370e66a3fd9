use crate::prtls::dynamics::Dynamics;
use crate::prtls::Particles;
use crate::{Float, Sim, PRTL_CHUNK_SIZE};

use rayon::prelude::*;

/// Advances particles `istart..iend` by one step. Implementations must
/// snapshot the current position into `position_old` before moving and
/// leave the post-push Lorentz factor in `dynamics.gf`.
pub trait Pusher {
    fn push(&self, particles: &mut Particles, dynamics: &mut Dynamics, istart: usize, iend: usize);
}

/// Ballistic motion with no fields: `x += dt * p / gamma`.
pub struct FreeStreaming {
    dt: Float,
    inv_cell: [Float; 2],
}

impl FreeStreaming {
    pub fn new(sim: &Sim) -> FreeStreaming {
        FreeStreaming {
            dt: sim.dt,
            inv_cell: [1.0 / sim.cell_length[0], 1.0 / sim.cell_length[1]],
        }
    }

    /// Largest displacement a push can produce, in cells. Stays below one
    /// because `|p| / gamma < 1` and `dt` is smaller than a cell.
    pub fn max_cells_per_step(&self) -> Float {
        self.dt * self.inv_cell[0].max(self.inv_cell[1])
    }
}

impl Pusher for FreeStreaming {
    fn push(&self, particles: &mut Particles, dynamics: &mut Dynamics, istart: usize, iend: usize) {
        assert!(istart <= iend && iend <= particles.size());
        assert!(dynamics.len() >= iend);
        let dt = self.dt;
        let [x, y] = match &mut particles.position[..] {
            [x, y] => [x, y],
            _ => panic!("free streaming pushes 2D particles"),
        };
        let [x_old, y_old] = match &mut particles.position_old[..] {
            [x_old, y_old] => [x_old, y_old],
            _ => panic!("free streaming pushes 2D particles"),
        };
        let [p_x, p_y, p_z] = &particles.momentum;
        (
            &mut x[istart..iend],
            &mut y[istart..iend],
            &mut x_old[istart..iend],
            &mut y_old[istart..iend],
            &p_x[istart..iend],
            &p_y[istart..iend],
            &p_z[istart..iend],
            &mut dynamics.gf[istart..iend],
        )
            .into_par_iter()
            .chunks(PRTL_CHUNK_SIZE)
            .for_each(|o| {
                o.into_iter()
                    .for_each(|(x, y, x_old, y_old, px, py, pz, gf)| {
                        *x_old = *x;
                        *y_old = *y;
                        *gf = (1.0 + px * px + py * py + pz * pz).sqrt();
                        let c1 = dt / *gf;
                        *x += c1 * px;
                        *y += c1 * py;
                    })
            });
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::{build_test_sim, E_TOL};

    #[test]
    fn push_snapshots_and_moves() {
        let sim = build_test_sim();
        let pusher = FreeStreaming::new(&sim);
        let mut prtls = Particles::new(2);
        prtls.initialize(3, 2);
        for i in 0..3 {
            *prtls.position_mut(0, i) = 5.0 + i as Float;
            *prtls.position_mut(1, i) = 3.0;
        }
        *prtls.momentum_mut(0, 1) = 1.0;
        *prtls.momentum_mut(1, 2) = -100.0;
        let mut dynamics = Dynamics::default();
        dynamics.resize(3);

        pusher.push(&mut prtls, &mut dynamics, 1, 3);

        // particle 0 is outside the range
        assert_eq!(prtls.position_old(0, 0), 0.0);
        assert_eq!(prtls.position_old(0, 1), 6.0);
        let expected = 6.0 + sim.dt / (2.0 as Float).sqrt();
        assert!((prtls.position(0, 1) - expected).abs() < E_TOL);
        assert!((dynamics.gf[1] - (2.0 as Float).sqrt()).abs() < E_TOL);
        // ultra relativistic particles still move less than a cell
        assert!(prtls.dist(2, 1) < pusher.max_cells_per_step() * sim.cell_length[1]);
        assert!(pusher.max_cells_per_step() < 1.0);
    }
}
