//! deskdriver-probe -- prints what the driver can see.
//!
//! Runs the read-only facade queries against the current session and dumps
//! the results. Useful for checking permissions (macOS accessibility, X11
//! session reachability) before wiring the driver into a host.
//!
//! Usage: deskdriver-probe [timing-config.toml]

use std::path::Path;

use deskdriver::{create_driver, DriverConfig};

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match DriverConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("deskdriver-probe: {e}");
                std::process::exit(1);
            }
        },
        None => DriverConfig::default(),
    };

    let driver = match create_driver(config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("deskdriver-probe: {e}");
            std::process::exit(1);
        }
    };

    match driver.active_application() {
        Ok(identity) => println!("active application: {identity}"),
        Err(e) => println!("active application: <{e}>"),
    }

    match driver.active_window_bounds() {
        Ok(bounds) => println!(
            "active window bounds: {}x{} at ({}, {})",
            bounds.width, bounds.height, bounds.x, bounds.y
        ),
        Err(e) => println!("active window bounds: <{e}>"),
    }

    match driver.mouse_location() {
        Ok(location) => println!("mouse location: ({}, {})", location.x, location.y),
        Err(e) => println!("mouse location: <{e}>"),
    }

    match driver.running_applications() {
        Ok(applications) => {
            println!("running applications ({}):", applications.len());
            for identity in applications {
                println!("  {identity}");
            }
        }
        Err(e) => println!("running applications: <{e}>"),
    }

    match driver.editor_state() {
        Ok(state) if state.unreadable => println!("editor state: unreadable"),
        Ok(state) => println!(
            "editor state: {} chars, cursor at {}",
            state.text.chars().count(),
            state.cursor
        ),
        Err(e) => println!("editor state: <{e}>"),
    }
}
