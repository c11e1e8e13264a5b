//! Output formats for parse results
//!
//! - `treeviz`: one line per node, see [`treeviz`]
//! - `json`: `{"tokens": [...], "value": ...}`, pretty-printed
//! - `yaml`: the same structure as YAML

pub mod registry;
pub mod treeviz;

pub use registry::{FormatError, FormatRegistry, Formatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};

use crate::grammar::Tree;
use crate::matching::Parsed;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, parsed: &Parsed<Tree>) -> Result<String, FormatError> {
        serde_json::to_string_pretty(parsed)
            .map(|mut out| {
                out.push('\n');
                out
            })
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Consumed tokens and result tree as JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, parsed: &Parsed<Tree>) -> Result<String, FormatError> {
        serde_yaml::to_string(parsed).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Consumed tokens and result tree as YAML"
    }
}
