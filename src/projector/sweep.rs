use crate::bins::BinPartition;
use crate::error::DepositError;
use crate::flds::{BinBuffer, Flds, Target};
use crate::projector::{DepositMode, Projector2D2Order};
use crate::prtls::dynamics::Dynamics;
use crate::prtls::Particles;

use rayon::prelude::*;

/// Deposit a whole species, one rayon task per bin.
///
/// Neighbouring bin windows overlap by the stencil halo, so every bin
/// deposits into its own buffer. The buffers are then added into the
/// target arrays in bin order, which keeps the result independent of the
/// thread count.
pub fn deposit_species(
    projector: &Projector2D2Order,
    flds: &mut Flds,
    target: Target,
    particles: &Particles,
    dynamics: &Dynamics,
    bins: &BinPartition,
    mode: DepositMode,
) -> Result<(), DepositError> {
    let with_rho = mode.deposits_density();
    let b_dim = bins.b_dim();

    let buffers = (0..bins.n_bins())
        .into_par_iter()
        .map(|ibin| {
            let mut buf = BinBuffer::new(b_dim);
            let range = bins.range(ibin);
            if !range.is_empty() {
                let (mut currents, rho) = buf.view();
                projector.project(
                    mode,
                    &mut currents,
                    if with_rho { Some(rho) } else { None },
                    particles,
                    dynamics,
                    range.start,
                    range.end,
                    ibin,
                    bins,
                )?;
            }
            Ok(buf)
        })
        .collect::<Result<Vec<BinBuffer>, DepositError>>()?;

    for (ibin, buf) in buffers.iter().enumerate() {
        flds.add_bin_buffer(target, bins, ibin, buf, with_rho);
    }
    Ok(())
}

/// Same result as [`deposit_species`], walking the bins on one thread and
/// writing straight into the target arrays.
pub fn deposit_species_serial(
    projector: &Projector2D2Order,
    flds: &mut Flds,
    target: Target,
    particles: &Particles,
    dynamics: &Dynamics,
    bins: &BinPartition,
    mode: DepositMode,
) -> Result<(), DepositError> {
    let with_rho = mode.deposits_density();
    let set = flds.set_mut(target);
    for ibin in 0..bins.n_bins() {
        let range = bins.range(ibin);
        let (mut currents, rho) = set.bin_view(bins, ibin);
        projector.project(
            mode,
            &mut currents,
            if with_rho { Some(rho) } else { None },
            particles,
            dynamics,
            range.start,
            range.end,
            ibin,
            bins,
        )?;
    }
    Ok(())
}
