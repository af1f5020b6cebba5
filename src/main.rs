mod check;
mod probe;
mod report;
mod settings;
mod target;
use std::{env, io, process};

use log::error;
use probe::ConnectivityProbe;
use report::Reporter;
use settings::ProbeSettings;

fn main() {
    let matches = settings::app().get_matches();
    let settings = ProbeSettings::from_matches(&matches).unwrap_or_else(|err| err.exit());

    let current = env::var("RUST_BROKERPROBE_LOG").ok();
    if let Some(level) = settings.log_override(current.as_deref()) {
        env::set_var("RUST_BROKERPROBE_LOG", level);
    }
    pretty_env_logger::init_custom_env("RUST_BROKERPROBE_LOG");

    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    let code = match ConnectivityProbe::new(settings).run(&mut reporter) {
        Ok(verdict) => verdict.exit_code(),
        Err(err) => {
            error!("Failed to write diagnostic report: {}", err);
            1
        }
    };
    process::exit(code);
}
