pub mod toml_date;
