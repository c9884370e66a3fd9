use anyhow::Result;
use esirkepov_rs::{run, Config};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cfg = Config::new()?;
    run(cfg)
}
