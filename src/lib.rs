use serde::Deserialize;
use std::fs;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod bins;
pub mod diag;
pub mod error;
pub mod flds;
pub mod projector;
pub mod prtls;
pub mod save;
pub mod species;

use crate::error::DepositError;
use crate::flds::{field::Field, Flds, LocalFields};
use crate::projector::{sweep, DepositMode, Projector2D2Order, HALO};
use crate::prtls::pusher::FreeStreaming;
use crate::species::Species;

// We use a type alias for f64/Float to easily support
// double and single precision.
#[cfg(feature = "dprec")]
pub type Float = f64;

#[cfg(not(feature = "dprec"))]
pub type Float = f32;

// How many particles a rayon worker takes at once when the work is
// per particle rather than per bin.
pub const PRTL_CHUNK_SIZE: usize = 1024;

// Tolerance used when comparing deposited values.
#[cfg(feature = "dprec")]
pub const E_TOL: Float = 1e-10;

#[cfg(not(feature = "dprec"))]
pub const E_TOL: Float = 1e-4;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub params: Params,
    pub setup: Setup,
    pub output: Output,
    #[serde(default)]
    pub species: Vec<SpeciesCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Setup {
    pub t_final: u32,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Output {
    pub write_output: bool,
    pub output_interval: u32,
    // steps on which the charge density is deposited alongside the currents
    pub diag_interval: u32,
    pub stride: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Params {
    // number of cells in the patch along x and y
    pub n_space: [usize; 2],
    pub cell_length: [Float; 2],
    pub dt: Float,
    // number of cells along x per bin
    pub clrw: usize,
    // bounds and finiteness checks; defaults to on in debug builds
    #[serde(default)]
    pub validate: Option<bool>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SpeciesCfg {
    pub name: String,
    pub charge: i16,
    // particles per cell
    pub ppc: usize,
    pub density: Float,
    pub vth: Float,
    #[serde(default)]
    pub drift: [Float; 3],
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub ionization_current: bool,
}

impl Config {
    pub fn new() -> Result<Config> {
        Config::from_file("config.toml")
    }

    pub fn from_file(path: &str) -> Result<Config> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not open the {} file", path))?;
        toml::from_str(&contents).with_context(|| "Could not parse Config file")
    }
}

/// Geometry and run parameters shared by every component of a patch.
///
/// Field arrays carry `oversize` extra primal points on each side of the
/// `n_space` cells, so local index `0` sits at global cell
/// `domain_begin = -oversize`.
#[derive(Clone, Debug)]
pub struct Sim {
    pub t_final: u32,
    pub n_space: [usize; 2],
    pub dim_prim: [usize; 2],
    pub cell_length: [Float; 2],
    pub dt: Float,
    pub clrw: usize,
    pub n_bins: usize,
    pub oversize: usize,
    pub domain_begin: [isize; 2],
    pub validate: bool,
}

impl Sim {
    pub fn new(cfg: &Config) -> Result<Sim, DepositError> {
        let p = &cfg.params;
        if p.n_space.iter().any(|&n| n == 0) {
            return Err(DepositError::Config(
                "Number of cells must be positive along every axis".to_string(),
            ));
        }
        if p.cell_length.iter().any(|&dl| !(dl > 0.0)) {
            return Err(DepositError::Config(
                "Cell lengths must be positive".to_string(),
            ));
        }
        if p.clrw == 0 || p.n_space[0] % p.clrw != 0 {
            return Err(DepositError::Config(format!(
                "clrw ({}) must divide the number of cells in x ({})",
                p.clrw, p.n_space[0]
            )));
        }
        // |v| < c, so dt == cell length still moves less than one cell per step.
        let min_cell = p.cell_length[0].min(p.cell_length[1]);
        if !(p.dt > 0.0) || p.dt > min_cell {
            return Err(DepositError::Config(format!(
                "dt ({}) must be positive and at most the smallest cell length ({})",
                p.dt, min_cell
            )));
        }
        if cfg.output.diag_interval == 0 || cfg.output.output_interval == 0 {
            return Err(DepositError::Config(
                "Output and diag intervals must be positive".to_string(),
            ));
        }

        let oversize = HALO;
        Ok(Sim {
            t_final: cfg.setup.t_final,
            n_space: p.n_space,
            dim_prim: [
                p.n_space[0] + 1 + 2 * oversize,
                p.n_space[1] + 1 + 2 * oversize,
            ],
            cell_length: p.cell_length,
            dt: p.dt,
            clrw: p.clrw,
            n_bins: p.n_space[0] / p.clrw,
            oversize,
            domain_begin: [-(oversize as isize), -(oversize as isize)],
            validate: p.validate.unwrap_or(cfg!(debug_assertions)),
        })
    }

    /// Upper corner of the patch in physical units.
    pub fn domain_max(&self) -> [Float; 2] {
        [
            self.n_space[0] as Float * self.cell_length[0],
            self.n_space[1] as Float * self.cell_length[1],
        ]
    }
}

pub fn run(cfg: Config) -> Result<()> {
    let sim = Sim::new(&cfg)?;
    let projector = Projector2D2Order::new(&sim);
    let pusher = FreeStreaming::new(&sim);
    let mut rng = StdRng::seed_from_u64(cfg.setup.seed);

    info!("initializing {} species", cfg.species.len());
    let mut species = Vec::<Species>::with_capacity(cfg.species.len());
    let mut id_offset = 0u64;
    for spec_cfg in &cfg.species {
        let mut sp = Species::new(&sim, spec_cfg, &mut rng);
        sp.particles.add_id_offsets(id_offset);
        id_offset += sp.particles.size() as u64;
        info!("{}: {} particles", sp.name, sp.particles.size());
        species.push(sp);
    }

    let mut flds = Flds::new(&sim, species.len());
    // charge density at the start of a diag step, for the continuity check
    let mut rho_old = Field::new("Rho_old", &sim.dim_prim).with_validation(sim.validate);

    for t in 0..=sim.t_final {
        let diag_step = t % cfg.output.diag_interval == 0;
        let mode = DepositMode::from_diag_flag(diag_step);
        let check_continuity = diag_step && sim.validate;

        flds.zero_currents();
        if check_continuity {
            rho_old.put_to(0.0);
        }

        for (ispec, sp) in species.iter_mut().enumerate() {
            sp.prepare(&projector);
            if check_continuity {
                sp.deposit_density(&projector, &mut rho_old);
            }
            if sp.frozen {
                if diag_step {
                    sp.deposit_density(&projector, &mut flds.species[ispec].rho);
                }
                continue;
            }

            sp.push(&pusher);
            sweep::deposit_species(
                &projector,
                &mut flds,
                mode.target(ispec),
                &sp.particles,
                &sp.dynamics,
                &sp.bins,
                mode,
            )?;

            if sp.ionization_current {
                let total = &mut flds.total;
                for ipart in 0..sp.particles.size() {
                    projector
                        .deposit_ionization_current(
                            &mut total.j_x,
                            &mut total.j_y,
                            &mut total.j_z,
                            &sp.particles,
                            ipart,
                            LocalFields::default(),
                        )
                        .with_context(|| format!("species {}", sp.name))?;
                }
            }

            let removed = sp.remove_out_of_domain();
            if removed > 0 {
                debug!("step {}: removed {} {} particles", t, removed, sp.name);
            }
        }

        if diag_step {
            flds.compute_totals();
            info!(
                "step {}: total charge {:.6e}, kinetic energy {:.6e}",
                t,
                diag::total_charge(&flds.total.rho),
                species
                    .iter()
                    .map(|sp| diag::kinetic_energy(&sp.particles))
                    .sum::<Float>()
            );
            if check_continuity {
                let residual = diag::continuity_residual(
                    &rho_old,
                    &flds.total.rho,
                    &flds.total.j_x,
                    &flds.total.j_y,
                    &sim,
                );
                debug!("step {}: max continuity residual {:e}", t, residual);
                if residual > 1e3 * E_TOL {
                    warn!(
                        "step {}: continuity residual {:e} above tolerance",
                        t, residual
                    );
                }
            }
        }

        if cfg.output.write_output {
            save::save_output(t, &cfg, &flds, &species)?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn build_test_config() -> Config {
    // A dummy small simulation used in unit tests.
    Config {
        output: Output {
            write_output: false,
            output_interval: 100,
            diag_interval: 1,
            stride: 4,
        },
        setup: Setup {
            t_final: 10,
            seed: 42,
        },
        params: Params {
            n_space: [24, 12],
            cell_length: [1.0, 1.0],
            dt: 0.5,
            clrw: 4,
            validate: Some(true),
        },
        species: Vec::new(),
    }
}

#[cfg(test)]
pub(crate) fn build_test_sim() -> Sim {
    Sim::new(&build_test_config()).expect("test config is valid")
}
