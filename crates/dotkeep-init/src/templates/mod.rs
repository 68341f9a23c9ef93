//! Config file templates
//!
//! - `functions`: named functions callable from templates (defaults and prompts)
//! - `data`: the render context, runtime defaults merged with user data
//! - `bootstrap`: discovery, rendering and fingerprinting of the config template
//!
//! # Example
//!
//! ```no_run
//! use dotkeep_core::{Config, JsonFileState, ToolDirs};
//! use dotkeep_init::prompt::Prompter;
//! use dotkeep_init::templates::{template_data, ConfigBootstrapper, TemplateFunctions};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dirs = ToolDirs::discover()?;
//! let config = Config::load(None, &dirs)?;
//! let state = JsonFileState::new(dirs.state_file());
//!
//! let functions = TemplateFunctions::standard(&config.source_dir, Arc::new(Prompter::stdio()));
//! let data = template_data(&config, &dirs.config_dir, env!("CARGO_PKG_VERSION"));
//!
//! let bootstrapper = ConfigBootstrapper::new(&dirs.config_dir, &state, functions, data);
//! if let Some(rendered) = bootstrapper.bootstrap(&config.source_dir)? {
//!     println!("wrote {}", rendered.path);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod data;
pub mod functions;

pub use bootstrap::{
    find_config_template, template_name, ConfigBootstrapper, ConfigTemplate, RenderedConfig,
    FINGERPRINT_FIELD,
};
pub use data::{default_data, template_data, DEFAULT_DATA_KEY};
pub use functions::TemplateFunctions;
