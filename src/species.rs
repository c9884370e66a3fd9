use crate::bins::BinPartition;
use crate::flds::field::Field;
use crate::projector::Projector2D2Order;
use crate::prtls::dynamics::Dynamics;
use crate::prtls::loading::load_uniform;
use crate::prtls::pusher::Pusher;
use crate::prtls::Particles;
use crate::{Sim, SpeciesCfg};

use log::trace;
use rand::Rng;

/// One particle species of the patch with the buffers its deposition needs.
pub struct Species {
    pub name: String,
    pub particles: Particles,
    pub dynamics: Dynamics,
    pub bins: BinPartition,
    pub frozen: bool,
    pub ionization_current: bool,
    validate: bool,
    domain_max: [crate::Float; 2],
}

impl Species {
    pub fn new<R: Rng>(sim: &Sim, cfg: &SpeciesCfg, rng: &mut R) -> Species {
        let mut particles = Particles::new(2);
        load_uniform(
            &mut particles,
            sim,
            cfg.ppc,
            cfg.density,
            cfg.charge,
            cfg.vth,
            cfg.drift,
            rng,
        );
        particles.set_ids();
        Species {
            name: cfg.name.clone(),
            particles,
            dynamics: Dynamics::default(),
            bins: BinPartition::new(sim),
            frozen: cfg.frozen,
            ionization_current: cfg.ionization_current,
            validate: sim.validate,
            domain_max: sim.domain_max(),
        }
    }

    /// Sort by bin and snapshot the state every deposit of this step reads.
    pub fn prepare(&mut self, projector: &Projector2D2Order) {
        self.bins.sort_particles(&mut self.particles, projector);
        self.dynamics.record_old(&self.particles, projector);
        if self.validate {
            assert!(self.particles.check_lockstep());
            self.bins.validate(&self.dynamics);
        }
        trace!("{}: bins {:?}", self.name, self.bins.last_index);
    }

    pub fn push<P: Pusher>(&mut self, pusher: &P) {
        let n = self.particles.size();
        pusher.push(&mut self.particles, &mut self.dynamics, 0, n);
    }

    /// Add the charge density at the current positions into `rho`, bin by
    /// bin. Particles must be sorted by bin.
    pub fn deposit_density(&self, projector: &Projector2D2Order, rho: &mut Field) {
        let b_dim = self.bins.b_dim();
        let window = b_dim[0] * b_dim[1];
        for ibin in 0..self.bins.n_bins() {
            let offset = self.bins.offset(ibin, rho);
            let rho_bin = &mut rho.data[offset..offset + window];
            for ipart in self.bins.range(ibin) {
                projector.deposit_density_frozen(
                    rho_bin,
                    &self.particles,
                    ipart,
                    self.bins.bin_start(ibin),
                    b_dim,
                );
            }
        }
    }

    /// Drop particles that left the patch, moving the last particle into
    /// each freed slot. Returns how many were removed.
    pub fn remove_out_of_domain(&mut self) -> usize {
        let min = [0.0; 2];
        let mut n = self.particles.size();
        let mut ipart = 0;
        while ipart < n {
            if self.particles.is_part_in_domain(ipart, &min, &self.domain_max) {
                ipart += 1;
            } else {
                n -= 1;
                if ipart < n {
                    self.particles.overwrite_part(n, ipart);
                    self.dynamics.gf[ipart] = self.dynamics.gf[n];
                    self.dynamics.iold[ipart] = self.dynamics.iold[n];
                    self.dynamics.deltaold[ipart] = self.dynamics.deltaold[n];
                }
            }
        }
        let removed = self.particles.size() - n;
        self.particles.erase_particle_trail(n);
        self.dynamics.resize(n);
        removed
    }
}
