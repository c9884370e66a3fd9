#![allow(dead_code)]
use esirkepov_rs::{Config, Output, Params, Setup, Sim, SpeciesCfg};

pub fn setup_config() -> Config {
    // This is a function that sets up a dummy small
    // simulation so that it can be used in testing;
    Config {
        output: Output {
            write_output: false,
            output_interval: 100,
            diag_interval: 1,
            stride: 4,
        },
        setup: Setup {
            t_final: 20,
            seed: 1234,
        },
        params: Params {
            n_space: [24, 12],
            cell_length: [1.0, 0.5],
            dt: 0.4,
            clrw: 6,
            validate: Some(true),
        },
        species: vec![electrons()],
    }
}

pub fn setup_sim() -> Sim {
    Sim::new(&setup_config()).expect("test config is valid")
}

pub fn electrons() -> SpeciesCfg {
    SpeciesCfg {
        name: "electron".to_string(),
        charge: -1,
        ppc: 3,
        density: 1.0,
        vth: 0.4,
        drift: [0.2, -0.1, 0.5],
        frozen: false,
        ionization_current: false,
    }
}
