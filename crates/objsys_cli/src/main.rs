//! Demo entry point for the object system.
//!
//! # Responsibility
//! - Build the car extension on top of the root class and print what
//!   dispatch returns.
//! - Keep output deterministic for quick local sanity checks.

mod vehicle;

use objsys_core::{dispatch, init_logging_from_env, object_class, ObjectResult, ObjectSystem};
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("objsys: logging disabled: {err}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=demo_run module=cli status=error error={err}");
            eprintln!("objsys: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ObjectResult<()> {
    let mut system = ObjectSystem::new();
    let root = object_class(&mut system)?;
    let car = vehicle::car_class(&mut system, root)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "objsys_core version={}", objsys_core::core_version())?;
    dispatch::write(&mut system, car, &mut out)?;
    writeln!(
        out,
        "wheelsize={:.1}",
        vehicle::car_wheelsize(&mut system, car)?
    )?;
    let stats = serde_json::to_string(&system.stats()).map_err(std::io::Error::other)?;
    writeln!(out, "registry={stats}")?;

    system.free(car)?;
    system.free(root)?;
    system.destroy()
}
