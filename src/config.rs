use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use config::{Config as ConfigLoader, Environment, File};
use is_terminal::IsTerminal;
use serde::Deserialize;

const PREFIX: &str = "IPGEO";
const CONFIG_FILE: &str = "config";

#[derive(Debug, Clone, Copy, Default)]
pub enum LogStyle {
    #[default]
    Auto,
    Always,
    Never,
}

impl LogStyle {
    pub fn is_color(&self) -> bool {
        match self {
            LogStyle::Auto => std::io::stdout().is_terminal(),
            LogStyle::Always => true,
            LogStyle::Never => false,
        }
    }
}

impl<'de> Deserialize<'de> for LogStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?.to_lowercase();
        match s.as_str() {
            "auto" => Ok(LogStyle::Auto),
            "always" => Ok(LogStyle::Always),
            "never" => Ok(LogStyle::Never),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["auto", "always", "never"],
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Log {
    pub level: String,
    pub style: LogStyle,
    /// Directory for daily log files. Console only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: Self::level(),
            style: LogStyle::default(),
            dir: None,
        }
    }
}

impl Log {
    fn level() -> String {
        String::from("ipgeo=info")
    }
}

/// Language tags used when picking names out of localized name maps.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Language {
    pub preferred: String,
    pub fallback: String,
}

impl Default for Language {
    fn default() -> Self {
        Self {
            preferred: String::from("zh-CN"),
            fallback: String::from("en"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseFile {
    pub path: PathBuf,
    pub url: String,
}

impl DatabaseFile {
    fn new(path: &str, url: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            url: String::from(url),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Databases {
    pub asn: DatabaseFile,
    pub city: DatabaseFile,
    pub geo_cn: DatabaseFile,
}

impl Default for Databases {
    fn default() -> Self {
        Self {
            asn: DatabaseFile::new(
                "mmdb/GeoLite2-ASN.mmdb",
                "https://github.com/P3TERX/GeoLite.mmdb/raw/download/GeoLite2-ASN.mmdb",
            ),
            city: DatabaseFile::new(
                "mmdb/GeoLite2-City.mmdb",
                "https://github.com/P3TERX/GeoLite.mmdb/raw/download/GeoLite2-City.mmdb",
            ),
            geo_cn: DatabaseFile::new(
                "mmdb/GeoCN.mmdb",
                "https://github.com/ljxi/GeoCN/releases/download/Latest/GeoCN.mmdb",
            ),
        }
    }
}

impl Databases {
    pub fn files(&self) -> [&DatabaseFile; 3] {
        [&self.asn, &self.city, &self.geo_cn]
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Download {
    pub max_attempts: usize,
    pub backoff_secs: u64,
    pub timeout_secs: u64,
}

impl Default for Download {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_secs: 1,
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub log: Log,
    pub addr: SocketAddr,
    pub cors: bool,
    pub language: Language,
    pub database: Databases,
    pub download: Download,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log: Log::default(),
            addr: Self::addr(),
            cors: true,
            language: Language::default(),
            database: Databases::default(),
            download: Download::default(),
        }
    }
}

impl Config {
    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.download.max_attempts == 0 {
            return Err("download max_attempts must be greater than zero".into());
        }
        if self.download.timeout_secs == 0 {
            return Err("download timeout_secs must be greater than zero".into());
        }
        if self.language.preferred.trim().is_empty() {
            return Err("preferred language must be set".into());
        }
        for file in self.database.files() {
            if file.path.as_os_str().is_empty() {
                return Err("database path must not be empty".into());
            }
        }
        Ok(())
    }

    /// Reads `config.json` (optional) and `IPGEO_*` environment variables.
    pub fn load() -> Config {
        let config = ConfigLoader::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(PREFIX)
                    .separator("__")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Config>());

        match config {
            Ok(config) => {
                if let Err(err) = config.validate() {
                    panic!("{}", err);
                }
                println!("{:#?}", config);
                config
            }
            Err(err) => {
                panic!("{:?}", err);
            }
        }
    }
}
