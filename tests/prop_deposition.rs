//! Property-based tests for the quadratic shape functions and the
//! charge conserving deposition.

mod common;

use esirkepov_rs::bins::BinPartition;
use esirkepov_rs::diag::continuity_residual;
use esirkepov_rs::flds::field::Field;
use esirkepov_rs::flds::CurrentSet;
use esirkepov_rs::projector::{shape_2nd_order, DepositMode, Projector2D2Order};
use esirkepov_rs::prtls::dynamics::Dynamics;
use esirkepov_rs::prtls::Particles;
use esirkepov_rs::{Float, E_TOL};
use proptest::prelude::*;

proptest! {
    /// The three weights are non-negative and sum to one.
    #[test]
    fn shape_is_normalised(delta in -0.5f64..=0.5) {
        let s = shape_2nd_order(delta as Float);
        prop_assert!(s.iter().all(|&w| w >= 0.0));
        prop_assert!((s.iter().sum::<Float>() - 1.0).abs() < E_TOL);
    }

    /// The first moment of the weights is the sub-cell offset.
    #[test]
    fn shape_is_centred(delta in -0.5f64..=0.5) {
        let s = shape_2nd_order(delta as Float);
        prop_assert!((s[2] - s[0] - delta as Float).abs() < E_TOL);
    }

    /// Any single step of less than one cell satisfies the discrete
    /// continuity equation everywhere on the patch.
    #[test]
    fn single_particle_conserves_charge(
        x in 0.0f64..24.0,
        y in 0.0f64..6.0,
        vx in -0.99f64..0.99,
        vy in -0.99f64..0.99,
        pz in -3.0f64..3.0,
        charge in -3i16..=3,
        weight in 0.1f64..2.0,
    ) {
        let sim = common::setup_sim();
        let projector = Projector2D2Order::new(&sim);
        let bins = BinPartition::new(&sim);

        let mut prtls = Particles::new(2);
        prtls.initialize(1, 2);
        *prtls.position_mut(0, 0) = x as Float;
        *prtls.position_mut(1, 0) = y as Float;
        *prtls.weight_mut(0) = weight as Float;
        *prtls.charge_mut(0) = charge;
        *prtls.momentum_mut(2, 0) = pz as Float;

        let mut rho_old = Field::new("Rho_old", &sim.dim_prim);
        let mut dynamics = Dynamics::default();
        dynamics.record_old(&prtls, &projector);
        let ibin = bins.bin_of(dynamics.iold[0][0]);
        {
            let [b0, b1] = bins.b_dim();
            let off = bins.offset(ibin, &rho_old);
            projector.deposit_density_frozen(
                &mut rho_old.data[off..off + b0 * b1],
                &prtls,
                0,
                bins.bin_start(ibin),
                bins.b_dim(),
            );
        }

        *prtls.position_old_mut(0, 0) = x as Float;
        *prtls.position_old_mut(1, 0) = y as Float;
        *prtls.position_mut(0, 0) = (x + vx * sim.dt as f64) as Float;
        *prtls.position_mut(1, 0) = (y + vy * sim.dt as f64) as Float;

        let mut set = CurrentSet::new(&sim.dim_prim, "", true);
        {
            let (mut currents, rho) = set.bin_view(&bins, ibin);
            projector
                .project(
                    DepositMode::CurrentAndDensity,
                    &mut currents,
                    Some(rho),
                    &prtls,
                    &dynamics,
                    0,
                    1,
                    ibin,
                    &bins,
                )
                .expect("deposit");
        }
        let residual = continuity_residual(&rho_old, &set.rho, &set.j_x, &set.j_y, &sim);
        prop_assert!(residual < 1e3 * E_TOL, "residual {}", residual);
    }
}
