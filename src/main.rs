mod cli;

use clap::Parser;
use log::error;

use parking_provision::ProvisionConfig;
use parking_provision::install::EXIT_CONFIG;

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = cli::Args::parse();

    let config = match ProvisionConfig::load(args.manifest.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    std::process::exit(run(&config));
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        fn run(config: &ProvisionConfig) -> i32 {
            use parking_provision::install::{self, report};
            use termcolor::{ColorChoice, StandardStream};

            let host = install::LinuxHost::new();
            let mut stdout = StandardStream::stdout(ColorChoice::Auto);

            match install::provision(&host, config, &mut stdout) {
                Ok(_) => 0,
                Err(e) => {
                    error!("{e}");
                    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
                    report::show_failure(&mut stderr, &e);
                    e.exit_code()
                }
            }
        }
    } else {
        fn run(config: &ProvisionConfig) -> i32 {
            error!(
                "{} can only be provisioned on Linux hosts with systemd",
                config.service_name
            );
            parking_provision::install::EXIT_REGISTRATION
        }
    }
}
