use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepositError {
    #[error("Projection of ionization current not defined for {ndim}D order-{order} shape functions")]
    IonizationCurrentUnsupported { order: usize, ndim: usize },

    #[error("{mode} deposition needs a charge density array but none was given")]
    DensityArrayMissing { mode: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),
}
