use std::error::Error;

use clap::Parser;
use goupgrader::{
    cli::args::{CliArgs, Command},
    config::GoUpgraderConfig,
    GoUpgrader,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();

    let mut builder = GoUpgrader::builder();
    if let Some(token) = cli_args.github_token {
        builder = builder.github_token(token);
    }
    let goupgrader = builder.with_config(GoUpgraderConfig::load()?).try_build()?;

    match cli_args.cmd {
        Command::Generate {
            target_openshift_version,
            in_use_op_sdk_version,
            output,
        } => {
            goupgrader.generate(&target_openshift_version, &in_use_op_sdk_version, output)?;
        }
        Command::Upgrade { config, project } => {
            goupgrader.upgrade(config, project)?;
        }
    }

    Ok(())
}
