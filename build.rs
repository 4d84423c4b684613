use std::fs::File;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use flate2::write::GzEncoder;
use flate2::Compression;

const RES_DIR: &str = "res";

fn get_file_name(path: &Path) -> io::Result<PathBuf> {
    let last = path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::other(format!("Invalid resource path {}", path.display())))?;
    let out_dir = env::var("OUT_DIR").map_err(io::Error::other)?;
    Ok(PathBuf::from(out_dir).join(format!("{}.tar.gz", last)))
}

fn compress_dir(path: &Path) -> io::Result<()> {
    let archive_path = get_file_name(path)?;
    let _ = fs::remove_file(&archive_path);

    let tar_gz = File::create(archive_path)?;
    let enc = GzEncoder::new(tar_gz, Compression::default());
    let mut tar = tar::Builder::new(enc);
    tar.append_dir_all(".", path)?;
    tar.into_inner()?.finish()?;
    Ok(())
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed={}", RES_DIR);
    println!("cargo:rerun-if-changed=folio.toml");

    let current_dir = env::var("CARGO_MANIFEST_DIR").map_err(io::Error::other)?;
    compress_dir(&PathBuf::from(current_dir).join(RES_DIR))
}
