// Inspection entry point: resolve the target window and report what the
// driver can currently see - the control tree, the tab strip, and whether a
// grid pair is resolvable on the active tab.

use log::info;

use spread_driver::DriverConfig;

fn load_config() -> DriverConfig {
    match std::env::var("SPREAD_CONFIG") {
        Ok(path) => match DriverConfig::load_from_file(&path) {
            Ok(config) => {
                info!("configuration loaded from {}", path);
                config
            }
            Err(err) => {
                eprintln!("could not load '{}': {}", path, err);
                std::process::exit(1);
            }
        },
        Err(_) => DriverConfig::from_env(),
    }
}

#[cfg(windows)]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use spread_driver::system::win32::Win32System;
    use spread_driver::DriverSession;

    let config = load_config();
    let mut session = DriverSession::new(Win32System::new(), config)?;

    let window = session.main_window()?;
    println!("main window: 0x{:X}", window);

    for line in session.dump_tree()? {
        println!("{}", line);
    }

    match session.grid_pair() {
        Ok(pair) => println!(
            "grid pair resolvable: source 0x{:X} (x={}), detail 0x{:X} (x={})",
            pair.source.handle, pair.source.rect.left, pair.detail.handle, pair.detail.rect.left
        ),
        Err(err) => println!("grid pair not resolvable: {}", err),
    }

    Ok(())
}

#[cfg(not(windows))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    config.validate()?;
    Err("the live backend requires Windows; this build can only validate configuration".into())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
