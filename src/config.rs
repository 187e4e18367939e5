//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{NaipError, NaipResult};
use crate::location::{FileLocation, Location, LocationParts, MemoryLocation};
use crate::registry::MosaicRegistry;
use crate::shell::ShellConfig;
use crate::style::{StyleDocument, StyleSettings};
use crate::tile_url::{DEFAULT_COLOR_OPS, DEFAULT_TILE_TEMPLATE};

#[derive(Parser, Debug, Clone)]
#[command(name = "naip-map")]
#[command(about = "Browse NAIP aerial imagery mosaics from the terminal")]
pub struct Args {
    /// Initial location, e.g. "/?mosaic=2014-2015#13/36.07/-111.87" or a full URL
    #[arg(long, env = "NAIP_URL")]
    pub url: Option<String>,

    /// File that stores the location between runs
    #[arg(long, env = "NAIP_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Base style JSON (defaults to the bundled style)
    #[arg(long, env = "NAIP_STYLE")]
    pub style: Option<PathBuf>,

    /// Directory that relative GeoJSON source paths resolve against
    #[arg(long, env = "NAIP_DATA_ROOT", default_value = ".")]
    pub data_root: PathBuf,

    /// Epoch used when none or an unknown one is requested
    #[arg(long, env = "NAIP_DEFAULT_EPOCH", default_value = "2016-2018")]
    pub default_epoch: String,

    /// Below this zoom the panel shows a "zoom in" hint
    #[arg(long, env = "NAIP_HINT_ZOOM", default_value = "6")]
    pub hint_zoom: f64,

    /// Imagery tile template with {z}/{x}/{y} placeholders
    #[arg(long, env = "NAIP_TILE_TEMPLATE", default_value = DEFAULT_TILE_TEMPLATE)]
    pub tile_template: String,

    /// Server-side color operations applied to imagery tiles
    #[arg(long, env = "NAIP_COLOR_OPS", default_value = DEFAULT_COLOR_OPS)]
    pub color_ops: String,

    /// Do not write the camera into the location hash
    #[arg(long)]
    pub no_hash_sync: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write logs to this file (the terminal belongs to the map)
    #[arg(long, env = "NAIP_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the assembled style for the initial location and exit
    #[arg(long)]
    pub print_style: bool,
}

/// Validated viewer configuration
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub settings: StyleSettings,
    pub shell: ShellConfig,
    pub hint_zoom: f64,
    pub initial_location: Option<LocationParts>,
    pub state_file: Option<PathBuf>,
    pub style_path: Option<PathBuf>,
    pub data_root: PathBuf,
}

impl ViewerConfig {
    pub fn from_args(args: &Args, registry: &MosaicRegistry) -> NaipResult<Self> {
        if !registry.contains(&args.default_epoch) {
            return Err(NaipError::InvalidConfig(format!(
                "default epoch {} is not registered",
                args.default_epoch
            )));
        }
        if !args.hint_zoom.is_finite() {
            return Err(NaipError::InvalidConfig(format!("hint zoom {} is not finite", args.hint_zoom)));
        }
        if !args.tile_template.contains("{z}") || !args.tile_template.contains("{x}") || !args.tile_template.contains("{y}") {
            return Err(NaipError::InvalidConfig(format!(
                "tile template {} lacks {{z}}/{{x}}/{{y}} placeholders",
                args.tile_template
            )));
        }

        let initial_location = args.url.as_deref().map(LocationParts::from_url_str).transpose()?;

        let settings = StyleSettings {
            tile_template: args.tile_template.clone(),
            color_ops: args.color_ops.clone(),
            default_epoch: args.default_epoch.clone(),
            ..StyleSettings::default()
        };

        let shell = ShellConfig {
            sync_hash: !args.no_hash_sync,
            ..ShellConfig::default()
        };

        Ok(Self {
            settings,
            shell,
            hint_zoom: args.hint_zoom,
            initial_location,
            state_file: args.state_file.clone(),
            style_path: args.style.clone(),
            data_root: args.data_root.clone(),
        })
    }

    /// File-backed when a state file is configured, otherwise in memory
    pub fn open_location(&self) -> NaipResult<Box<dyn Location>> {
        match &self.state_file {
            Some(path) => Ok(Box::new(FileLocation::open(path, self.initial_location.clone())?)),
            None => Ok(Box::new(MemoryLocation::from_parts(
                self.initial_location.clone().unwrap_or_default(),
            ))),
        }
    }

    pub fn load_base_style(&self) -> NaipResult<StyleDocument> {
        match &self.style_path {
            Some(path) => StyleDocument::from_path(path),
            None => StyleDocument::embedded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["naip-map"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::from_args(&args(&[]), &MosaicRegistry::default()).unwrap();
        assert_eq!(config.settings.default_epoch, "2016-2018");
        assert_eq!(config.settings.tile_template, DEFAULT_TILE_TEMPLATE);
        assert_eq!(config.hint_zoom, 6.0);
        assert!(config.shell.sync_hash);
        assert!(config.initial_location.is_none());
    }

    #[test]
    fn test_unregistered_default_epoch_rejected() {
        let result = ViewerConfig::from_args(&args(&["--default-epoch", "1999"]), &MosaicRegistry::default());
        assert!(matches!(result, Err(NaipError::InvalidConfig(_))));
    }

    #[test]
    fn test_template_without_placeholders_rejected() {
        let result = ViewerConfig::from_args(
            &args(&["--tile-template", "https://example.com/tile.png"]),
            &MosaicRegistry::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_url_seeds_memory_location() {
        let config = ViewerConfig::from_args(
            &args(&["--url", "https://naip.example/?mosaic=2011-2013#9/35/-100", "--no-hash-sync"]),
            &MosaicRegistry::default(),
        )
        .unwrap();
        assert!(!config.shell.sync_hash);
        let location = config.open_location().unwrap();
        assert_eq!(location.href(), "/?mosaic=2011-2013#9/35/-100");
    }

    #[test]
    fn test_tunables_read_environment() {
        use clap::CommandFactory;

        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|name| name.to_str())
                .map(str::to_string)
        };
        assert_eq!(env_of("hint_zoom").as_deref(), Some("NAIP_HINT_ZOOM"));
        assert_eq!(env_of("color_ops").as_deref(), Some("NAIP_COLOR_OPS"));
        assert_eq!(env_of("tile_template").as_deref(), Some("NAIP_TILE_TEMPLATE"));
    }

    #[test]
    fn test_style_path_replaces_bundled_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            r#"{"version": 8, "sources": {"hillshade": {"type": "raster", "tiles": ["h"]}}, "layers": []}"#,
        )
        .unwrap();
        let config = ViewerConfig::from_args(
            &args(&["--style", path.to_str().unwrap()]),
            &MosaicRegistry::default(),
        )
        .unwrap();
        let style = config.load_base_style().unwrap();
        assert!(style.sources.contains_key("hillshade"));
        assert!(style.layers().is_empty());

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(config.load_base_style(), Err(NaipError::StyleParse(_))));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(config.load_base_style(), Err(NaipError::Io(_))));
    }
}
