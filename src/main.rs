//! # Assembly Line - Entry Point
//! src/main.rs
//!
//! Punto de entrada: lee la configuración (CLI o entorno), ejecuta las
//! corridas pedidas e imprime el resumen de cada una.

use assembly_line::config::Config;
use assembly_line::factory::Factory;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let config = Config::from_args();

    let runs = config.runs.max(1);
    let json = config.json;
    let mut factory = Factory::new(config);

    for run in 1..=runs {
        if runs > 1 {
            log::info!("--- Corrida {}/{} ---", run, runs);
        }

        let result = factory.run()?;

        if json {
            println!("{}", result.summary.to_json()?);
        } else {
            println!("{}", result.summary.render());
        }
    }

    Ok(())
}
