use std::process::ExitCode;

use soup::SceneConfig;

fn main() -> ExitCode {
    env_logger::init();

    let scene = match std::env::args().nth(1) {
        Some(path) => match SceneConfig::load(&path) {
            Ok(scene) => {
                log::info!("loaded scene from {}", path);
                scene
            }
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => SceneConfig::default(),
    };

    match soup::run(scene) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
