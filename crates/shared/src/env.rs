use std::path::PathBuf;

use tracing::{debug, trace, warn};

fn traverse_up_for_env_file(file_name: &str) -> Option<PathBuf> {
    let relative_workspace_root = PathBuf::from("./../../").join(file_name);

    if PathBuf::from(file_name).exists() {
        trace!("Loading environment variables from: {file_name}");
        Some(PathBuf::from(file_name))
    } else if relative_workspace_root.exists() {
        trace!(
            "Loading environment variables from: {}",
            relative_workspace_root.display()
        );
        Some(relative_workspace_root)
    } else {
        trace!(
            "No environment variables file found with name: {:?} in current directory or workspace root",
            file_name
        );
        None
    }
}

fn load_optional_env_file(path: Option<PathBuf>) {
    let Some(path) = path else {
        return;
    };

    match dotenv::from_filename(&path) {
        Ok(_) => debug!("Loaded environment variables from: {}", path.display()),
        Err(e) => warn!(
            "Failed to load environment variables from {}: {}",
            path.display(),
            e
        ),
    }
}

pub fn load_optional_env_files() {
    load_optional_env_file(traverse_up_for_env_file(".env"));
    load_optional_env_file(traverse_up_for_env_file(".env.secrets"));
}

pub fn configure_env() -> Result<(), anyhow::Error> {
    load_optional_env_files();
    Ok(())
}
