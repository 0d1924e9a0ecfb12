use contracts::domain::a002_page_section::{SelectionLimits, SelectionRules, SubcategoryStaging};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub page_sections: PageSectionsConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Ограничения редактора секций категорий
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PageSectionsConfig {
    pub min_main: usize,
    pub max_main: usize,
    pub max_sub_per_main: usize,
    pub subcategory_staging: SubcategoryStaging,
}

impl Default for PageSectionsConfig {
    fn default() -> Self {
        let limits = SelectionLimits::default();
        Self {
            min_main: limits.min_main,
            max_main: limits.max_main,
            max_sub_per_main: limits.max_sub_per_main,
            subcategory_staging: SubcategoryStaging::default(),
        }
    }
}

impl PageSectionsConfig {
    pub fn rules(&self) -> SelectionRules {
        SelectionRules {
            limits: SelectionLimits {
                min_main: self.min_main,
                max_main: self.max_main,
                max_sub_per_main: self.max_sub_per_main,
            },
            staging: self.subcategory_staging,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "target/db/app.db".into(),
            },
            server: ServerConfig::default(),
            page_sections: PageSectionsConfig::default(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000

[page_sections]
min_main = 1
max_main = 10
max_sub_per_main = 10
subcategory_staging = "permissive"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            }
            tracing::warn!("config.toml not found at: {}", config_path.display());
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config
        .page_sections
        .rules()
        .limits
        .check()
        .map_err(|e| anyhow::anyhow!("Invalid [page_sections]: {}", e))?;
    Ok(config)
}

/// Загружает конфигурацию один раз; ошибка чтения откатывает на значения по умолчанию
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| {
        load_config().unwrap_or_else(|e| {
            tracing::error!("Failed to load config.toml, using defaults: {}", e);
            Config::default()
        })
    })
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    match std::env::current_exe() {
        Ok(exe_path) => match exe_path.parent() {
            Some(exe_dir) => exe_dir.join(db_path),
            None => db_path.to_path_buf(),
        },
        Err(_) => db_path.to_path_buf(),
    }
}
