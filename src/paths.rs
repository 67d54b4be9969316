use std::path::PathBuf;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "clipline", "clipline")
}

pub fn projects_dir() -> PathBuf {
    let dir = match project_dirs() {
        Some(dirs) => dirs.data_dir().join("projects"),
        None => PathBuf::from("./projects"),
    };
    let _ = std::fs::create_dir_all(&dir);
    dir
}

pub fn config_path() -> PathBuf {
    let dir = match project_dirs() {
        Some(dirs) => dirs.config_dir().to_path_buf(),
        None => PathBuf::from("./config"),
    };
    let _ = std::fs::create_dir_all(&dir);
    dir.join("config.json")
}
