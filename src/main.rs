use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use axisview::{AxisviewApp, ViewerConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config_path = None;
    let mut models = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config expects a file path")?;
                config_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ => models.push(PathBuf::from(&arg)),
        }
    }

    let config = match config_path {
        Some(path) => ViewerConfig::load(&path)?,
        None => {
            log::warn!("No config file given, using defaults");
            ViewerConfig::default()
        }
    };

    let mut app = AxisviewApp::new(config);
    for path in models {
        app.import_file(path);
    }
    app.run()
}
