use crate::bins::BinPartition;
use crate::error::DepositError;
use crate::flds::field::Field;
use crate::flds::{BinCurrents, LocalFields, Target};
use crate::prtls::dynamics::Dynamics;
use crate::prtls::Particles;
use crate::{Float, Sim};

pub mod shape;
pub mod sweep;

pub use shape::{shape_2nd_order, stencil, HALO, ORDER, STENCIL_RADIUS, STENCIL_WIDTH};

/// What a sweep deposits for a species on the current step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepositMode {
    // currents into the patch totals
    Current,
    // currents and charge density into the species' own arrays
    CurrentAndDensity,
    // charge density only, for particles that do not move
    DensityFrozen,
    IonizationCurrent,
}

impl DepositMode {
    pub fn from_diag_flag(diag: bool) -> DepositMode {
        if diag {
            DepositMode::CurrentAndDensity
        } else {
            DepositMode::Current
        }
    }

    pub fn target(self, ispec: usize) -> Target {
        match self {
            DepositMode::Current | DepositMode::IonizationCurrent => Target::Total,
            DepositMode::CurrentAndDensity | DepositMode::DensityFrozen => Target::Species(ispec),
        }
    }

    pub fn deposits_density(self) -> bool {
        matches!(
            self,
            DepositMode::CurrentAndDensity | DepositMode::DensityFrozen
        )
    }

    pub fn deposits_current(self) -> bool {
        matches!(self, DepositMode::Current | DepositMode::CurrentAndDensity)
    }

    pub fn name(self) -> &'static str {
        match self {
            DepositMode::Current => "current",
            DepositMode::CurrentAndDensity => "current and density",
            DepositMode::DensityFrozen => "frozen density",
            DepositMode::IonizationCurrent => "ionization current",
        }
    }
}

/// Charge conserving current deposition (Esirkepov) with quadratic shape
/// functions on a 2D Cartesian grid.
///
/// Every per-particle entry point writes into the window of one bin:
/// slices starting at primal row `bin` of the patch arrays, `b_dim[1]`
/// entries per row (`b_dim[1] + 1` for Jy). `iold` and `deltaold` locate
/// the particle at the start of the step, as produced by [`locate`].
///
/// [`locate`]: Projector2D2Order::locate
#[derive(Clone, Debug)]
pub struct Projector2D2Order {
    dx_inv: Float,
    dx_ov_dt: Float,
    dy_inv: Float,
    dy_ov_dt: Float,
    one_third: Float,
    i_domain_begin: isize,
    j_domain_begin: isize,
    validate: bool,
}

impl Projector2D2Order {
    pub fn new(sim: &Sim) -> Projector2D2Order {
        Projector2D2Order {
            dx_inv: 1.0 / sim.cell_length[0],
            dx_ov_dt: sim.cell_length[0] / sim.dt,
            dy_inv: 1.0 / sim.cell_length[1],
            dy_ov_dt: sim.cell_length[1] / sim.dt,
            one_third: 1.0 / 3.0,
            i_domain_begin: sim.domain_begin[0],
            j_domain_begin: sim.domain_begin[1],
            validate: sim.validate,
        }
    }

    /// Nearest primal index relative to the patch start and the offset
    /// from it in cell units.
    #[inline(always)]
    pub fn locate(&self, x: Float, y: Float) -> ([isize; 2], [Float; 2]) {
        let xpn = x * self.dx_inv;
        let ypn = y * self.dy_inv;
        let ip = xpn.round();
        let jp = ypn.round();
        (
            [
                ip as isize - self.i_domain_begin,
                jp as isize - self.j_domain_begin,
            ],
            [xpn - ip, ypn - jp],
        )
    }

    /// Deposit the current of particle `ipart` into a bin window.
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub fn deposit_current(
        &self,
        currents: &mut BinCurrents,
        particles: &Particles,
        ipart: usize,
        gf: Float,
        bin: usize,
        b_dim: [usize; 2],
        iold: [isize; 2],
        deltaold: [Float; 2],
    ) {
        self.esirkepov(currents, None, particles, ipart, gf, bin, b_dim, iold, deltaold);
    }

    /// Same as [`deposit_current`](Self::deposit_current), and also the
    /// charge density at the new position.
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub fn deposit_current_and_density(
        &self,
        currents: &mut BinCurrents,
        rho: &mut [Float],
        particles: &Particles,
        ipart: usize,
        gf: Float,
        bin: usize,
        b_dim: [usize; 2],
        iold: [isize; 2],
        deltaold: [Float; 2],
    ) {
        self.esirkepov(currents, Some(rho), particles, ipart, gf, bin, b_dim, iold, deltaold);
    }

    /// Charge density of a particle that has not moved this step: only the
    /// current position is read.
    pub fn deposit_density_frozen(
        &self,
        rho: &mut [Float],
        particles: &Particles,
        ipart: usize,
        bin: usize,
        b_dim: [usize; 2],
    ) {
        let charge_weight = particles.charge(ipart) as Float * particles.weight(ipart);

        let xpn = particles.position(0, ipart) * self.dx_inv;
        let ypn = particles.position(1, ipart) * self.dy_inv;
        let ip = xpn.round();
        let jp = ypn.round();
        let sx1 = stencil(xpn - ip, 1);
        let sy1 = stencil(ypn - jp, 1);

        let ip = ip as isize - self.i_domain_begin - bin as isize - STENCIL_RADIUS as isize;
        let jp = jp as isize - self.j_domain_begin - STENCIL_RADIUS as isize;
        if self.validate {
            assert!(xpn.is_finite() && ypn.is_finite(), "particle {} position is not finite", ipart);
            assert!(ip >= 0 && jp >= 0, "particle {} has a negative local index", ipart);
            let last = (ip as usize + STENCIL_WIDTH - 1) * b_dim[1] + jp as usize + STENCIL_WIDTH - 1;
            assert!(last < rho.len(), "particle {} density stencil outside the bin window", ipart);
        }
        let (ip, jp) = (ip as usize, jp as usize);

        let dim1 = b_dim[1];
        for i in 0..STENCIL_WIDTH {
            let iloc = (i + ip) * dim1 + jp;
            for j in 0..STENCIL_WIDTH {
                rho[iloc + j] += charge_weight * sx1[i] * sy1[j];
            }
        }
    }

    /// Current from ionization is not available with 2D quadratic shapes.
    pub fn deposit_ionization_current(
        &self,
        _j_x: &mut Field,
        _j_y: &mut Field,
        _j_z: &mut Field,
        _particles: &Particles,
        _ipart: usize,
        _j_ion: LocalFields,
    ) -> Result<(), DepositError> {
        Err(DepositError::IonizationCurrentUnsupported {
            order: ORDER,
            ndim: 2,
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    fn esirkepov(
        &self,
        currents: &mut BinCurrents,
        rho: Option<&mut [Float]>,
        particles: &Particles,
        ipart: usize,
        gf: Float,
        bin: usize,
        b_dim: [usize; 2],
        iold: [isize; 2],
        deltaold: [Float; 2],
    ) {
        let charge_weight = particles.charge(ipart) as Float * particles.weight(ipart);
        let crx_p = charge_weight * self.dx_ov_dt;
        let cry_p = charge_weight * self.dy_ov_dt;
        let crz_p = charge_weight * particles.momentum(2, ipart) / gf;

        // shape at the start of the step, centred on slot 2
        let sx0 = stencil(deltaold[0], 1);
        let sy0 = stencil(deltaold[1], 1);

        // shape at the new position, shifted by at most one slot
        let xpn = particles.position(0, ipart) * self.dx_inv;
        let ypn = particles.position(1, ipart) * self.dy_inv;
        let ip = xpn.round();
        let jp = ypn.round();
        let ip_m_ipo = ip as isize - iold[0] - self.i_domain_begin;
        let jp_m_jpo = jp as isize - iold[1] - self.j_domain_begin;

        let ipo = iold[0] - bin as isize - STENCIL_RADIUS as isize;
        let jpo = iold[1] - STENCIL_RADIUS as isize;
        let dim1 = b_dim[1];

        if self.validate {
            assert!(gf.is_finite() && gf > 0.0, "particle {} has Lorentz factor {}", ipart, gf);
            assert!(
                xpn.is_finite() && ypn.is_finite() && crz_p.is_finite(),
                "particle {} state is not finite",
                ipart
            );
            assert!(
                ip_m_ipo.abs() <= 1 && jp_m_jpo.abs() <= 1,
                "particle {} moved more than one cell in a step",
                ipart
            );
            assert!(ipo >= 0 && jpo >= 0, "particle {} has a negative local index", ipart);
            let (ipo, jpo) = (ipo as usize, jpo as usize);
            let last_row = ipo + STENCIL_WIDTH - 1;
            let last_col = jpo + STENCIL_WIDTH - 1;
            assert!(
                last_row * dim1 + last_col < currents.j_x.len()
                    && last_row * dim1 + last_col < currents.j_z.len()
                    && last_row * (dim1 + 1) + last_col < currents.j_y.len(),
                "particle {} current stencil outside the bin window",
                ipart
            );
            if let Some(rho) = &rho {
                assert!(
                    last_row * dim1 + last_col < rho.len(),
                    "particle {} density stencil outside the bin window",
                    ipart
                );
            }
        }

        let sx1 = stencil(xpn - ip, (ip_m_ipo + 1) as usize);
        let sy1 = stencil(ypn - jp, (jp_m_jpo + 1) as usize);

        let mut dsx = [0.0; STENCIL_WIDTH];
        let mut dsy = [0.0; STENCIL_WIDTH];
        for i in 0..STENCIL_WIDTH {
            dsx[i] = sx1[i] - sx0[i];
            dsy[i] = sy1[i] - sy0[i];
        }

        let (ipo, jpo) = (ipo as usize, jpo as usize);
        let jx = &mut *currents.j_x;
        let jy = &mut *currents.j_y;
        let jz = &mut *currents.j_z;
        let mut rho = rho;

        // Jx accumulates along x, so each row adds onto the one before
        let mut tmp_jx = [0.0; STENCIL_WIDTH];
        for i in 0..STENCIL_WIDTH {
            let iloc = (i + ipo) * dim1 + jpo;
            let tmp2 = 0.5 * sx1[i] + sx0[i];
            let tmp3 = 0.5 * sx0[i] + sx1[i];

            if i > 0 {
                for j in 0..STENCIL_WIDTH {
                    tmp_jx[j] -= crx_p * dsx[i - 1] * (sy0[j] + 0.5 * dsy[j]);
                    jx[iloc + j] += tmp_jx[j];
                }
            }

            for j in 0..STENCIL_WIDTH {
                jz[iloc + j] += crz_p * self.one_third * (sy0[j] * tmp2 + sy1[j] * tmp3);
            }

            // Jy has one more point per row
            let iloc_y = iloc + i + ipo;
            let tmp_y = sx0[i] + 0.5 * dsx[i];
            let mut tmp = 0.0;
            for j in 1..STENCIL_WIDTH {
                tmp -= cry_p * dsy[j - 1] * tmp_y;
                jy[iloc_y + j] += tmp;
            }

            if let Some(rho) = rho.as_deref_mut() {
                for j in 0..STENCIL_WIDTH {
                    rho[iloc + j] += charge_weight * sx1[i] * sy1[j];
                }
            }
        }
    }

    /// Deposit particles `istart..iend` of bin `ibin` into that bin's window.
    /// `rho` must be given whenever `mode` deposits a density.
    #[allow(clippy::too_many_arguments)]
    pub fn project(
        &self,
        mode: DepositMode,
        currents: &mut BinCurrents,
        rho: Option<&mut [Float]>,
        particles: &Particles,
        dynamics: &Dynamics,
        istart: usize,
        iend: usize,
        ibin: usize,
        bins: &BinPartition,
    ) -> Result<(), DepositError> {
        let bin = bins.bin_start(ibin);
        let b_dim = bins.b_dim();
        match (mode, rho) {
            (DepositMode::Current, _) => {
                for ipart in istart..iend {
                    self.deposit_current(
                        currents,
                        particles,
                        ipart,
                        dynamics.gf[ipart],
                        bin,
                        b_dim,
                        dynamics.iold[ipart],
                        dynamics.deltaold[ipart],
                    );
                }
            }
            (DepositMode::CurrentAndDensity, Some(rho)) => {
                for ipart in istart..iend {
                    self.deposit_current_and_density(
                        currents,
                        rho,
                        particles,
                        ipart,
                        dynamics.gf[ipart],
                        bin,
                        b_dim,
                        dynamics.iold[ipart],
                        dynamics.deltaold[ipart],
                    );
                }
            }
            (DepositMode::DensityFrozen, Some(rho)) => {
                for ipart in istart..iend {
                    self.deposit_density_frozen(rho, particles, ipart, bin, b_dim);
                }
            }
            (DepositMode::IonizationCurrent, _) => {
                return Err(DepositError::IonizationCurrentUnsupported {
                    order: ORDER,
                    ndim: 2,
                });
            }
            (mode, None) => {
                return Err(DepositError::DensityArrayMissing { mode: mode.name() });
            }
        }
        Ok(())
    }
}
