use crate::prtls::Particles;
use crate::{Float, Sim};

use itertools::izip;
use rand::prelude::*;
use rand_distr::{Standard, StandardNormal};

/// Append `ppc` particles to every cell of the patch, at random positions
/// inside the cell, with a drifting Maxwellian momentum of spread `vth`.
/// Each macro-particle carries weight `density / ppc`.
#[allow(clippy::too_many_arguments)]
pub fn load_uniform<R: Rng>(
    particles: &mut Particles,
    sim: &Sim,
    ppc: usize,
    density: Float,
    charge: i16,
    vth: Float,
    drift: [Float; 3],
    rng: &mut R,
) {
    let start = particles.size();
    let n_new = sim.n_space[0] * sim.n_space[1] * ppc;
    particles.create_particles(n_new);
    let weight = if ppc > 0 { density / ppc as Float } else { 0.0 };

    // positions
    let mut c1 = start;
    for i in 0..sim.n_space[0] {
        for j in 0..sim.n_space[1] {
            for _ in 0..ppc {
                let r1: Float = rng.sample(Standard);
                let r2: Float = rng.sample(Standard);
                let x = (i as Float + r1) * sim.cell_length[0];
                let y = (j as Float + r2) * sim.cell_length[1];
                *particles.position_mut(0, c1) = x;
                *particles.position_mut(1, c1) = y;
                *particles.position_old_mut(0, c1) = x;
                *particles.position_old_mut(1, c1) = y;
                c1 += 1;
            }
        }
    }

    // momenta
    let [p_x, p_y, p_z] = &mut particles.momentum;
    for (px, py, pz) in izip!(&mut p_x[start..], &mut p_y[start..], &mut p_z[start..]) {
        *px = rng.sample::<Float, _>(StandardNormal) * vth + drift[0];
        *py = rng.sample::<Float, _>(StandardNormal) * vth + drift[1];
        *pz = rng.sample::<Float, _>(StandardNormal) * vth + drift[2];
    }

    for (w, q) in izip!(&mut particles.weight[start..], &mut particles.charge[start..]) {
        *w = weight;
        *q = charge;
    }
}
