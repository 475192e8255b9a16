use log::info;
use tera::{Context, Tera};

use std::path::{Path, PathBuf};

use crate::config::{JobConfig, Mode};
use crate::consts::TEMPLATE_SLOTS_VERSION;
use crate::error::{MothulityError, Result};

const PREPROC_TEMPLATE: &str = include_str!("../templates/preproc.sh.tera");
const ANALYSIS_TEMPLATE: &str = include_str!("../templates/analysis.sh.tera");
const SUMMARY_TEMPLATE: &str = include_str!("../templates/summary.html.tera");

/// A named template source. Slots are the serialized fields of
/// [`JobConfig`]; an unknown slot is a render error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    pub name: String,
    pub source: String,
    /// HTML-escape substituted values; the name must end in `.html`.
    pub autoescape: bool,
}

impl ScriptTemplate {
    /// Built-in mothur batch script for `mode`.
    pub fn builtin(mode: Mode) -> Self {
        let (name, source) = match mode {
            Mode::FirstPhase => ("preproc.sh", PREPROC_TEMPLATE),
            Mode::Continuation => ("analysis.sh", ANALYSIS_TEMPLATE),
        };

        Self {
            name: name.to_string(),
            source: source.to_string(),
            autoescape: false,
        }
    }

    /// Built-in HTML summary of the job parameters.
    pub fn summary() -> Self {
        Self {
            name: "summary.html".to_string(),
            source: SUMMARY_TEMPLATE.to_string(),
            autoescape: true,
        }
    }

    /// User-supplied template read from `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|source| MothulityError::TemplateNotFound {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            name: path.display().to_string(),
            source,
            autoescape: false,
        })
    }
}

/// Substitute every slot of `template` from `config`.
///
/// Pure and deterministic: the same config and template always
/// produce the same text.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::config::*;
/// use mothulity::render::{render, ScriptTemplate};
///
/// let config = resolve(&JobOptions::default(), Mode::FirstPhase, None, PresetPolicy::Fallback, None).unwrap();
/// let script = render(&ScriptTemplate::builtin(Mode::FirstPhase), &config).unwrap();
/// ```
pub fn render(template: &ScriptTemplate, config: &JobConfig) -> Result<String> {
    let err = |source| MothulityError::Render {
        name: template.name.clone(),
        source,
    };

    let mut context = Context::from_serialize(config).map_err(err)?;
    context.insert("slots_version", &TEMPLATE_SLOTS_VERSION);

    let mut tera = Tera::default();
    tera.autoescape_on(if template.autoescape {
        vec![".html"]
    } else {
        vec![]
    });
    tera.add_raw_template(&template.name, &template.source)
        .map_err(err)?;

    tera.render(&template.name, &context).map_err(err)
}

/// Write rendered text to `path`, returning the path.
pub fn save(path: PathBuf, rendered: &str) -> Result<PathBuf> {
    std::fs::write(&path, rendered).map_err(|e| MothulityError::io(&path, e))?;
    info!("INFO: wrote {}", path.display());

    Ok(path)
}
