/*!
 * WebDesk Daemon
 * Assembles the desktop core from configuration and seeds demo content
 */

use log::{error, info};
use std::process;
use std::sync::Arc;
use webdesk::core::Desktop;
use webdesk::handler::DemoHandler;
use webdesk::vfs::PackageManifest;
use webdesk::Config;

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("webdeskd: {e}");
            process::exit(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.loglevel),
    )
    .init();

    if let Err(e) = run(config) {
        error!("Fatal: {e}");
        process::exit(1);
    }
}

fn run(config: Config) -> webdesk::DesktopResult<()> {
    info!(
        "Starting webdeskd on {}:{} (debug: {})",
        config.hostname, config.port, config.debug
    );

    let handler = Arc::new(
        DemoHandler::new().with_settings_file(config.serverdir.join("settings.json")),
    );
    let desktop = Desktop::builder()
        .with_config(config)
        .with_handler(handler)
        .build()?;

    for manifest in demo_packages() {
        desktop.packages().register(manifest);
    }

    for (name, root, flags) in desktop.mounts().list() {
        info!(
            "Mount '{}' at {} (read_only: {}, special: {})",
            name, root, flags.read_only, flags.special
        );
    }
    info!(
        "Desktop ready: {} package(s), {} API method(s)",
        desktop.packages().len(),
        desktop.api().len()
    );
    Ok(())
}

fn demo_packages() -> Vec<PackageManifest> {
    vec![
        PackageManifest {
            name: "FileManager".to_string(),
            title: "File Manager".to_string(),
            icon: Some("apps/file-manager.png".to_string()),
            singleton: false,
        },
        PackageManifest {
            name: "Settings".to_string(),
            title: "Settings".to_string(),
            icon: Some("apps/settings.png".to_string()),
            singleton: true,
        },
        PackageManifest {
            name: "TextEditor".to_string(),
            title: "Text Editor".to_string(),
            icon: Some("apps/text-editor.png".to_string()),
            singleton: false,
        },
    ]
}
