//! Config file bootstrap from a template in the source directory
//!
//! A source directory may carry one config template, `.dotkeep.<ext>.tmpl`.
//! Bootstrapping renders it completely in memory, writes the result to
//! `<config_dir>/dotkeep.<ext>` and records a fingerprint of the template
//! source. A failed render leaves neither a config file nor a new fingerprint.

use super::functions::TemplateFunctions;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use dotkeep_core::paths::TOOL_NAME;
use dotkeep_core::state::{PersistentState, CONFIG_STATE_BUCKET, CONFIG_STATE_KEY};
use dotkeep_core::ConfigFormat;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::error::Error as StdError;
use std::fs;
use std::io::{ErrorKind, Write};
use tera::{Context, Tera};
use tracing::{debug, info};

/// Field of the fingerprint record holding the hex digest
pub const FINGERPRINT_FIELD: &str = "configTemplateContentsSHA256";

/// Mode of the config directory before umask
const CONFIG_DIR_MODE: u32 = 0o777;

/// Mode of the rendered config file
const CONFIG_FILE_MODE: u32 = 0o600;

/// A config template discovered in the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTemplate {
    /// File name relative to the source directory
    pub relative_path: String,
    pub format: ConfigFormat,
    pub source_path: Utf8PathBuf,
    /// Template source bytes
    pub raw: Vec<u8>,
}

impl ConfigTemplate {
    /// Name of the rendered config file, `dotkeep.<ext>`
    pub fn output_name(&self) -> String {
        format!("{}.{}", TOOL_NAME, self.format.extension())
    }

    /// Hex SHA-256 of the template source bytes
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.raw))
    }
}

/// A config file produced by a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig {
    pub path: Utf8PathBuf,
    pub format: ConfigFormat,
    pub contents: String,
}

/// Template file name for a format, `.dotkeep.<ext>.tmpl`
pub fn template_name(format: ConfigFormat) -> String {
    format!(".{}.{}.tmpl", TOOL_NAME, format.extension())
}

/// Find the config template in the root of `source_dir`.
///
/// Returns `None` when there is no template and an error when there is more
/// than one. Stat failures other than not-found are errors.
pub fn find_config_template(source_dir: &Utf8Path) -> Result<Option<ConfigTemplate>> {
    let mut found = Vec::new();
    for format in ConfigFormat::ALL {
        let name = template_name(format);
        let path = source_dir.join(&name);
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => found.push((name, format, path)),
            Ok(_) => debug!("{} is not a regular file, ignoring", path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    if found.len() > 1 {
        let paths: Vec<&str> = found.iter().map(|(_, _, path)| path.as_str()).collect();
        return Err(Error::multiple_config_templates(&paths));
    }

    let Some((relative_path, format, source_path)) = found.pop() else {
        return Ok(None);
    };

    let raw = fs::read(&source_path)?;
    debug!("Found {} config template at {}", format, source_path);

    Ok(Some(ConfigTemplate {
        relative_path,
        format,
        source_path,
        raw,
    }))
}

/// Renders the config template and records its fingerprint
pub struct ConfigBootstrapper<'a> {
    config_dir: Utf8PathBuf,
    state: &'a dyn PersistentState,
    functions: TemplateFunctions,
    data: Map<String, Value>,
}

impl std::fmt::Debug for ConfigBootstrapper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBootstrapper")
            .field("config_dir", &self.config_dir)
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

impl<'a> ConfigBootstrapper<'a> {
    pub fn new(
        config_dir: impl Into<Utf8PathBuf>,
        state: &'a dyn PersistentState,
        functions: TemplateFunctions,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            state,
            functions,
            data,
        }
    }

    /// Render the template in `source_dir`, if any, into the config directory.
    ///
    /// With no template the stored fingerprint is deleted and `None` is
    /// returned. Any parse or render failure returns before anything is
    /// written.
    pub fn bootstrap(&self, source_dir: &Utf8Path) -> Result<Option<RenderedConfig>> {
        let Some(template) = find_config_template(source_dir)? else {
            debug!("No config template in {}", source_dir);
            self.state.delete(CONFIG_STATE_BUCKET, CONFIG_STATE_KEY)?;
            return Ok(None);
        };

        let contents = self.render(&template)?;
        let path = self.config_dir.join(template.output_name());
        write_config(&self.config_dir, &path, &contents)?;
        info!("Wrote config file {}", path);

        self.state.set(
            CONFIG_STATE_BUCKET,
            CONFIG_STATE_KEY,
            json!({ FINGERPRINT_FIELD: template.fingerprint() }),
        )?;

        Ok(Some(RenderedConfig {
            path,
            format: template.format,
            contents,
        }))
    }

    fn render(&self, template: &ConfigTemplate) -> Result<String> {
        let name = template.relative_path.as_str();
        let source = std::str::from_utf8(&template.raw)
            .map_err(|_| Error::NonUtf8Template {
                path: template.source_path.to_string(),
            })?;

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        self.functions.register(&mut tera);
        tera.add_raw_template(name, source)
            .map_err(|e| Error::template_parse(name, error_chain(&e)))?;

        let context = Context::from_value(Value::Object(self.data.clone()))
            .map_err(|e| Error::template_render(name, error_chain(&e)))?;

        tera.render(name, &context)
            .map_err(|e| Error::template_render(name, error_chain(&e)))
    }
}

/// Join an error and its sources into one message
fn error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn write_config(config_dir: &Utf8Path, path: &Utf8Path, contents: &str) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(CONFIG_DIR_MODE);
    }
    builder.create(config_dir)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CONFIG_FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(CONFIG_FILE_MODE))?;
    }

    Ok(())
}
