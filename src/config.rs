use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;

use crate::content::content_renderer::{RawMarkup, RenderOptions, StyleProfile};
use crate::error::{BlogError, Result};
use crate::util::toml_date::TomlDate;

const EXE_DIR_VAR: &str = "${exe_dir}";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub data_file: PathBuf,
}

#[derive(Deserialize)]
pub struct Personal {
    pub activity_start_year: i32,
    pub blog_start_date: TomlDate,
}

#[derive(Deserialize, Clone)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    #[serde(default)]
    pub tech: Vec<String>,
}

#[derive(Deserialize, Clone)]
pub struct Skill {
    pub name: String,
    pub level: u8,
}

#[derive(Deserialize)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    pub about: String,
    pub email: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

fn default_page_size() -> u32 { 10 }
fn default_excerpt_length() -> usize { 150 }
fn default_toc_min_headings() -> usize { 2 }
fn default_toc_max_entries() -> usize { 10 }

#[derive(Deserialize)]
pub struct Defaults {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
    #[serde(default)]
    pub rendering_cache_enabled: bool,
    #[serde(default = "default_toc_min_headings")]
    pub toc_min_headings: usize,
    #[serde(default = "default_toc_max_entries")]
    pub toc_max_entries: usize,
}

#[derive(Deserialize, Default)]
pub struct Render {
    #[serde(default)]
    pub style: StyleProfile,
    #[serde(default)]
    pub allow_raw_markup: bool,
}

impl Render {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            style: self.style,
            raw_markup: if self.allow_raw_markup { RawMarkup::Allow } else { RawMarkup::Disallow },
        }
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Admin {
    pub token: String,
}

impl Admin {
    /// Checks an `Authorization` header value. An empty configured token
    /// accepts nobody.
    pub fn accepts(&self, authorization: Option<&str>) -> bool {
        if self.token.is_empty() {
            return false;
        }
        authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .is_some_and(|token| constant_time_eq(token.as_bytes(), self.token.as_bytes()))
    }

    pub fn authorize(&self, authorization: Option<&str>) -> Result<()> {
        if self.accepts(authorization) {
            Ok(())
        } else {
            Err(BlogError::Unauthorized)
        }
    }
}

/// Compares every byte regardless of where the first difference is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub personal: Personal,
    pub profile: Profile,
    pub paths: Paths,
    pub defaults: Defaults,
    #[serde(default)]
    pub render: Render,
    pub server: Server,
    pub admin: Admin,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with(EXE_DIR_VAR) {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace(EXE_DIR_VAR, &exe_dir.to_string_lossy())),
        None => path,
    }
}

pub fn parse_config(cfg_content: &str) -> Result<Config> {
    let mut cfg: Config = toml::from_str::<Config>(cfg_content)
        .map_err(|e| BlogError::Config(format!("Error parsing configuration file: {}", e)))?;

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
        data_file: parse_path(cfg.paths.data_file),
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> Result<Config> {
    let cfg_content = fs::read_to_string(cfg_path)
        .map_err(|e| BlogError::Config(format!("Error opening configuration file {}: {}", cfg_path.display(), e)))?;

    parse_config(&cfg_content)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub(crate) const CONFIG_TOML: &str = r##"
[personal]
activity_start_year = 2000
blog_start_date = 2024-04-22

[profile]
name = "Jane Doe"
headline = "Systems engineer"
about = "I build things."
email = "jane@example.com"

[[profile.projects]]
title = "folio"
description = "This site"
tech = ["rust", "ntex"]

[[profile.skills]]
name = "Rust"
level = 90

[paths]
template_dir = "res/template"
public_dir = "res/public"
data_file = "res/data/posts.json"

[defaults]
page_size = 2
rendering_cache_enabled = true

[render]
style = "Tailwind"

[server]
address = "127.0.0.1"
port = 8001

[admin]
token = "s3cret"
"##;

    #[test]
    fn test_parse_config() {
        let cfg = parse_config(CONFIG_TOML).unwrap();
        assert_eq!(cfg.personal.blog_start_date, TomlDate(NaiveDate::from_ymd_opt(2024, 4, 22).unwrap()));
        assert_eq!(cfg.profile.projects[0].tech, ["rust", "ntex"]);
        assert_eq!(cfg.profile.skills[0].level, 90);
        assert_eq!(cfg.paths.data_file, PathBuf::from("res/data/posts.json"));
        assert_eq!(cfg.defaults.page_size, 2);
        assert_eq!(cfg.defaults.excerpt_length, 150);
        assert_eq!(cfg.defaults.toc_min_headings, 2);
        assert_eq!(cfg.defaults.toc_max_entries, 10);
        assert_eq!(cfg.render.options(), RenderOptions { style: StyleProfile::Tailwind, raw_markup: RawMarkup::Disallow });
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(parse_config("[personal]\n"), Err(BlogError::Config(_))));
        assert!(matches!(read_config(Path::new("/does/not/exist.toml")), Err(BlogError::Config(_))));
    }

    #[test]
    fn test_exe_dir_expansion() {
        let path = parse_path(PathBuf::from("${exe_dir}/template"));
        assert!(!path.to_string_lossy().contains(EXE_DIR_VAR));
        assert!(path.ends_with("template"));
        assert_eq!(parse_path(PathBuf::from("relative/dir")), PathBuf::from("relative/dir"));
    }

    #[test]
    fn test_admin_token() {
        let admin = Admin { token: "s3cret".to_string() };
        assert!(admin.accepts(Some("Bearer s3cret")));
        assert!(!admin.accepts(Some("Bearer wrong")));
        assert!(!admin.accepts(Some("s3cret")));
        assert!(!admin.accepts(None));
        assert!(matches!(admin.authorize(None), Err(BlogError::Unauthorized)));

        let nobody = Admin { token: "".to_string() };
        assert!(!nobody.accepts(Some("Bearer ")));
    }

    #[test]
    fn test_admin_token_compared_verbatim() {
        let padded = Admin { token: " s3cret ".to_string() };
        assert!(padded.accepts(Some("Bearer  s3cret ")));
        assert!(!padded.accepts(Some("Bearer s3cret")));

        let admin = Admin { token: "s3cret".to_string() };
        assert!(!admin.accepts(Some("Bearer s3cret ")));
        assert!(!admin.accepts(Some("Bearer s3cre")));
        assert!(!admin.accepts(Some("Bearer s3cret0")));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
