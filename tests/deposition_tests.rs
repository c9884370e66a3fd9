mod common;

use esirkepov_rs::bins::BinPartition;
use esirkepov_rs::diag::{continuity_residual, total_charge};
use esirkepov_rs::flds::field::Field;
use esirkepov_rs::flds::{BinBuffer, Flds, Target};
use esirkepov_rs::projector::{sweep, DepositMode, Projector2D2Order};
use esirkepov_rs::prtls::pusher::FreeStreaming;
use esirkepov_rs::species::Species;
use esirkepov_rs::{run, Float, E_TOL};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn charge_is_conserved_over_several_steps() {
    let sim = common::setup_sim();
    let projector = Projector2D2Order::new(&sim);
    let pusher = FreeStreaming::new(&sim);
    let mut rng = StdRng::seed_from_u64(99);
    let mut sp = Species::new(&sim, &common::electrons(), &mut rng);
    let mut flds = Flds::new(&sim, 1);
    let mut rho_old = Field::new("Rho_old", &sim.dim_prim);

    for _ in 0..5 {
        flds.zero_currents();
        rho_old.put_to(0.0);
        sp.prepare(&projector);
        sp.deposit_density(&projector, &mut rho_old);
        sp.push(&pusher);
        let mode = DepositMode::CurrentAndDensity;
        sweep::deposit_species(
            &projector,
            &mut flds,
            mode.target(0),
            &sp.particles,
            &sp.dynamics,
            &sp.bins,
            mode,
        )
        .expect("deposit");
        flds.compute_totals();

        let residual = continuity_residual(
            &rho_old,
            &flds.total.rho,
            &flds.total.j_x,
            &flds.total.j_y,
            &sim,
        );
        assert!(residual < 1e3 * E_TOL, "residual {}", residual);
        // deposited before any particle is removed
        assert!((total_charge(&flds.total.rho) - total_charge(&rho_old)).abs() < 1e3 * E_TOL);
        sp.remove_out_of_domain();
    }
}

#[test]
fn each_bin_stays_in_its_window() {
    let sim = common::setup_sim();
    let projector = Projector2D2Order::new(&sim);
    let pusher = FreeStreaming::new(&sim);
    let mut rng = StdRng::seed_from_u64(7);
    let mut sp = Species::new(&sim, &common::electrons(), &mut rng);
    sp.prepare(&projector);
    sp.push(&pusher);

    let bins: &BinPartition = &sp.bins;
    for ibin in 0..bins.n_bins() {
        let range = bins.range(ibin);
        assert!(!range.is_empty());
        let mut buf = BinBuffer::new(bins.b_dim());
        {
            let (mut currents, rho) = buf.view();
            projector
                .project(
                    DepositMode::CurrentAndDensity,
                    &mut currents,
                    Some(rho),
                    &sp.particles,
                    &sp.dynamics,
                    range.start,
                    range.end,
                    ibin,
                    bins,
                )
                .expect("deposit");
        }
        let charge: Float = range
            .clone()
            .map(|i| sp.particles.charge(i) as Float * sp.particles.weight(i))
            .sum();
        let deposited: Float = buf.rho.iter().sum();
        assert!((deposited - charge).abs() < 1e3 * E_TOL);

        // the halo rows only ever receive the stencil tails
        let b1 = bins.b_dim()[1];
        let first_row: Float = buf.rho[..b1].iter().map(|v| v.abs()).sum();
        assert!(first_row < 0.5 * charge.abs());
    }
}

#[test]
fn parallel_reduction_is_deterministic() {
    let sim = common::setup_sim();
    let projector = Projector2D2Order::new(&sim);
    let pusher = FreeStreaming::new(&sim);
    let mut rng = StdRng::seed_from_u64(17);
    let mut sp = Species::new(&sim, &common::electrons(), &mut rng);
    sp.prepare(&projector);
    sp.push(&pusher);

    let deposit = || {
        let mut flds = Flds::new(&sim, 1);
        sweep::deposit_species(
            &projector,
            &mut flds,
            Target::Total,
            &sp.particles,
            &sp.dynamics,
            &sp.bins,
            DepositMode::Current,
        )
        .expect("deposit");
        flds
    };
    let a = deposit();
    let b = deposit();
    assert_eq!(a.total.j_x.data, b.total.j_x.data);
    assert_eq!(a.total.j_y.data, b.total.j_y.data);
    assert_eq!(a.total.j_z.data, b.total.j_z.data);
}

#[test]
fn full_run_with_frozen_background() {
    let mut cfg = common::setup_config();
    cfg.setup.t_final = 6;
    cfg.output.diag_interval = 2;
    let mut ions = common::electrons();
    ions.name = "ion".to_string();
    ions.charge = 1;
    ions.frozen = true;
    ions.vth = 0.0;
    ions.drift = [0.0; 3];
    cfg.species.push(ions);
    run(cfg).expect("run completes");
}

#[test]
fn bad_config_is_rejected() {
    let mut cfg = common::setup_config();
    cfg.params.clrw = 7;
    let err = run(cfg).expect_err("clrw does not divide the cells");
    assert!(err.to_string().contains("clrw"));
}
