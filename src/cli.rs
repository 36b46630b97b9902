//! 命令行参数

use std::path::PathBuf;

use anyhow::{bail, Result};

pub const USAGE: &str =
    "Usage: ironcore-derivations <export-file> --root <0x...> [--config <file>] [--dry-run]";

/// 命令行参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub export_file: PathBuf,
    pub root: String,
    pub config_path: Option<PathBuf>,
    pub dry_run: bool,
}

impl CliArgs {
    /// 解析参数（不含程序名）
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut export_file = None;
        let mut root = None;
        let mut config_path = std::env::var("CONFIG_PATH").ok().map(PathBuf::from);
        let mut dry_run = false;

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--root" => match args.next() {
                    Some(v) => root = Some(v),
                    None => bail!("--root requires a value\n{}", USAGE),
                },
                "--config" => match args.next() {
                    Some(v) => config_path = Some(PathBuf::from(v)),
                    None => bail!("--config requires a value\n{}", USAGE),
                },
                "--dry-run" => dry_run = true,
                flag if flag.starts_with("--") => bail!("Unknown option {}\n{}", flag, USAGE),
                _ if export_file.is_none() => export_file = Some(PathBuf::from(&arg)),
                _ => bail!("Unexpected argument {}\n{}", arg, USAGE),
            }
        }

        let Some(export_file) = export_file else {
            bail!("Missing export file\n{}", USAGE);
        };
        let Some(root) = root else {
            bail!("Missing --root\n{}", USAGE);
        };

        Ok(Self {
            export_file,
            root,
            config_path,
            dry_run,
        })
    }
}
