use std::env;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

#[cfg(all(target_family = "unix", not(target_os = "macos")))]
pub fn data_dir() -> Result<PathBuf, io::Error> {
    env::var("HOME")
        .map_err(|_| io::Error::new(ErrorKind::NotFound, "HOME not found"))
        .map(|home| PathBuf::from(home).join(".config/nasdl/"))
}

#[cfg(target_os = "macos")]
pub fn data_dir() -> Result<PathBuf, io::Error> {
    env::var("HOME")
        .map_err(|_| io::Error::new(ErrorKind::NotFound, "HOME not found"))
        .map(|home| PathBuf::from(home).join("Library/Application Support/nasdl/"))
}

#[cfg(target_family = "windows")]
pub fn data_dir() -> Result<PathBuf, io::Error> {
    env::var("APPDATA")
        .map_err(|_| io::Error::new(ErrorKind::NotFound, "APPDATA not found"))
        .map(|app_data| PathBuf::from(app_data).join("nasdl/"))
}
