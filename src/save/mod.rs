use crate::{
    flds::{field::Field, Flds},
    species::Species,
    Config, Float,
};
use anyhow::{Context, Result};
use log::info;

/// Write the whole array, halo included, plus its shape next to it.
pub(crate) fn save_field(fld: &Field, outdir: &str) -> Result<()> {
    npy::to_file(format!("{}/flds/{}.npy", outdir, fld.name), fld.data.clone())
        .context(format!("Could not save {} data to file", fld.name))?;
    let dims: Vec<u64> = fld.dims().iter().map(|&n| n as u64).collect();
    npy::to_file(format!("{}/flds/{}_dims.npy", outdir, fld.name), dims)
        .context(format!("Could not save {} dims to file", fld.name))?;
    Ok(())
}

fn save_species(sp: &Species, outdir: &str, stride: usize) -> Result<()> {
    let prtl_dir = format!("{}/prtls/{}", outdir, sp.name);
    std::fs::create_dir_all(&prtl_dir).context("Unable to create output directory")?;
    let prtls = &sp.particles;

    let x: Vec<Float> = prtls.positions(0).iter().step_by(stride).copied().collect();
    npy::to_file(format!("{}/x.npy", prtl_dir), x).context("Could not save x data to file")?;

    let y: Vec<Float> = prtls.positions(1).iter().step_by(stride).copied().collect();
    npy::to_file(format!("{}/y.npy", prtl_dir), y).context("Could not save y prtl data")?;

    let gam: Vec<Float> = (0..prtls.size())
        .step_by(stride)
        .map(|i| prtls.lor_fac(i))
        .collect();
    npy::to_file(format!("{}/gam.npy", prtl_dir), gam)
        .context("Error saving writing lorentz factor to file")?;
    Ok(())
}

pub fn save_output(t: u32, cfg: &Config, flds: &Flds, species: &[Species]) -> Result<()> {
    if t % cfg.output.output_interval == 0 {
        let output_prefix = format!("output/dat_{:05}", t / cfg.output.output_interval);
        std::fs::create_dir_all(format!("{}/flds", &output_prefix))
            .context("Unable to create output directory")?;

        info!("saving output to {}", output_prefix);
        let stride = cfg.output.stride.max(1);
        for sp in species {
            save_species(sp, &output_prefix, stride)?;
        }

        for fld in &[
            &flds.total.j_x,
            &flds.total.j_y,
            &flds.total.j_z,
            &flds.total.rho,
        ] {
            save_field(fld, &output_prefix)?;
        }
    }

    Ok(())
}
