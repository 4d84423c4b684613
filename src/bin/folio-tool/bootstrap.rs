use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;

use crate::decompress::decompress_files;
use crate::BootstrapArgs;

const CFG_FILE_NAME: &str = "folio.toml";
const SAMPLE_START_DATE: &str = "2024-04-22";

lazy_static! {
    static ref RES_REGEX: Regex = Regex::new(r"(res)/\w+").unwrap();
}

fn get_sample_cfg() -> &'static str {
    include_str!("../../../folio.toml")
}

fn write_folio_cfg(out_dir: &Path) -> Result<()> {
    let file = File::create(out_dir.join(CFG_FILE_NAME))?;
    let mut writer = BufWriter::new(file);

    let sample_cfg = replace_paths(out_dir, get_sample_cfg());
    let sample_cfg = replace_date(&sample_cfg);

    writer.write_all(sample_cfg.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Points every `res/...` path of the sample configuration at `prefix`.
fn replace_paths(prefix: &Path, config_data: &str) -> String {
    let prefix = prefix.to_string_lossy();
    let prefix = prefix.trim_end_matches('/');

    RES_REGEX.replace_all(config_data, |captures: &regex::Captures| {
        captures[0].replacen(&captures[1], prefix, 1)
    }).to_string()
}

fn get_current_date() -> String {
    let current_local: DateTime<Local> = Local::now();
    current_local.format("%Y-%m-%d").to_string()
}

fn replace_date(config_data: &str) -> String {
    config_data.replace(SAMPLE_START_DATE, &get_current_date())
}

pub fn bootstrap_cmd(args: BootstrapArgs) -> Result<()> {
    let out_path = fs::canonicalize(&args.out_dir)
        .with_context(|| format!("Error converting path to absolute: {}", args.out_dir))?;

    if !out_path.is_dir() {
        bail!("Output path must be a directory: {}", out_path.display());
    }

    decompress_files(&out_path).context("Error bootstrapping")?;
    write_folio_cfg(&out_path).context("Error writing folio configuration")?;

    println!("Site created at {}", out_path.display());
    println!("Start the server with: folio --config-path {}", out_path.join(CFG_FILE_NAME).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_sample_cfg() {
        let cfg = get_sample_cfg();
        let res = replace_paths(&PathBuf::from("/abs/path/"), cfg);
        assert!(res.contains(r##"template_dir = "/abs/path/template""##));
        assert!(res.contains(r##"public_dir = "/abs/path/public""##));
        assert!(res.contains(r##"data_file = "/abs/path/data/posts.json""##));
        assert!(!res.contains("res/"));

        let res = replace_date(&res);
        let blog_start_date = format!("blog_start_date = {}", get_current_date());
        assert!(res.contains(&blog_start_date));
    }

    #[test]
    fn test_sample_cfg_parses() {
        let cfg = replace_date(&replace_paths(Path::new("/srv/site"), get_sample_cfg()));
        let config = folio::config::parse_config(&cfg).unwrap();
        assert_eq!(config.paths.data_file, PathBuf::from("/srv/site/data/posts.json"));
        assert!(config.admin.token.is_empty());
    }
}
