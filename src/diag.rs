use crate::flds::field::{Field, Pos};
use crate::prtls::Particles;
use crate::{Float, Sim};

use itertools::izip;

/// Largest violation of the discrete continuity equation
/// `(rho_new - rho_old) / dt + (Jx[r+1, c] - Jx[r, c]) / dx + (Jy[r, c+1] - Jy[r, c]) / dy`
/// over every primal point of the patch.
pub fn continuity_residual(
    rho_old: &Field,
    rho_new: &Field,
    j_x: &Field,
    j_y: &Field,
    sim: &Sim,
) -> Float {
    let [d0, d1] = sim.dim_prim;
    assert_eq!(rho_old.dims(), &[d0, d1]);
    assert_eq!(rho_new.dims(), &[d0, d1]);
    assert_eq!(j_x.dims(), &[d0 + 1, d1]);
    assert_eq!(j_y.dims(), &[d0, d1 + 1]);

    let dt_inv = 1.0 / sim.dt;
    let dx_inv = 1.0 / sim.cell_length[0];
    let dy_inv = 1.0 / sim.cell_length[1];
    let mut max: Float = 0.0;
    for row in 0..d0 {
        for col in 0..d1 {
            let i = rho_new.index2(Pos { row, col });
            let drho = (rho_new.data[i] - rho_old.data[i]) * dt_inv;
            let djx = (j_x.data[j_x.index2(Pos { row: row + 1, col })]
                - j_x.data[j_x.index2(Pos { row, col })])
                * dx_inv;
            let djy = (j_y.data[j_y.index2(Pos { row, col: col + 1 })]
                - j_y.data[j_y.index2(Pos { row, col })])
                * dy_inv;
            max = max.max((drho + djx + djy).abs());
        }
    }
    max
}

pub fn total_charge(rho: &Field) -> Float {
    rho.data.iter().sum()
}

/// Sum of `w (gamma - 1)` over the species, in units of m c^2.
pub fn kinetic_energy(particles: &Particles) -> Float {
    izip!(
        particles.weights(),
        particles.momenta(0),
        particles.momenta(1),
        particles.momenta(2)
    )
    .map(|(w, px, py, pz)| w * ((1.0 + px * px + py * py + pz * pz).sqrt() - 1.0))
    .sum()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::{build_test_sim, E_TOL};

    #[test]
    fn static_charge_has_no_residual() {
        let sim = build_test_sim();
        let mut rho = Field::new("Rho", &sim.dim_prim);
        rho.put_to(2.0);
        let j_x = Field::new_dual_along("Jx", &sim.dim_prim, 0, false);
        let j_y = Field::new_dual_along("Jy", &sim.dim_prim, 1, false);
        assert_eq!(continuity_residual(&rho, &rho, &j_x, &j_y, &sim), 0.0);
        assert!((total_charge(&rho) - 2.0 * rho.global_dims() as Float).abs() < E_TOL);
    }

    #[test]
    fn uncompensated_current_is_reported() {
        let sim = build_test_sim();
        let rho = Field::new("Rho", &sim.dim_prim);
        let mut j_x = Field::new_dual_along("Jx", &sim.dim_prim, 0, false);
        let j_y = Field::new_dual_along("Jy", &sim.dim_prim, 1, false);
        *j_x.at2_mut(Pos { row: 5, col: 5 }) = 0.25;
        let residual = continuity_residual(&rho, &rho, &j_x, &j_y, &sim);
        assert!((residual - 0.25).abs() < E_TOL);
    }

    #[test]
    fn energy_of_moving_particle() {
        let mut prtls = Particles::new(2);
        prtls.initialize(2, 2);
        *prtls.weight_mut(0) = 2.0;
        *prtls.weight_mut(1) = 1.0;
        *prtls.momentum_mut(1, 1) = 1.0;
        let expected = (2.0 as Float).sqrt() - 1.0;
        assert!((kinetic_energy(&prtls) - expected).abs() < E_TOL);
    }
}
