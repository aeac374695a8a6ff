//! Template resolution.
//!
//! The template picker offers every catalogue entry plus one "custom"
//! sentinel. Custom is explicitly unsupported: it prints a notice and the
//! pipeline continues with an empty settings record. A name that is neither
//! in the catalogue nor the sentinel is a configuration error and fatal.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::IssueTemplate;
use crate::services::Prompter;

/// Outcome of resolving a template name.
#[derive(Debug, Clone)]
pub enum TemplateChoice {
    /// A catalogue entry matched.
    Matched(IssueTemplate),
    /// The custom sentinel was chosen.
    Custom,
    /// Name not in the catalogue and not the sentinel.
    Unknown,
}

/// Resolve a template name against the catalogue.
pub fn resolve(config: &AppConfig, name: &str) -> TemplateChoice {
    if name == config.custom_template {
        return TemplateChoice::Custom;
    }
    match config.templates.iter().find(|t| t.name == name) {
        Some(template) => TemplateChoice::Matched(template.clone()),
        None => TemplateChoice::Unknown,
    }
}

/// Prompt for a template and resolve it to a settings record.
///
/// Custom yields an empty record after a printed notice; an unknown or
/// aborted selection is fatal with the configuration exit code.
pub fn pick(config: &AppConfig, prompter: &dyn Prompter) -> Result<IssueTemplate, AppError> {
    let mut names: Vec<String> = config.templates.iter().map(|t| t.name.clone()).collect();
    names.push(config.custom_template.clone());

    let chosen = prompter
        .select("Select template", &names)?
        .ok_or_else(|| AppError::config("no template selected"))?;

    match resolve(config, &chosen) {
        TemplateChoice::Matched(template) => Ok(template),
        TemplateChoice::Custom => {
            println!("Custom templates are not supported yet; continuing without settings.");
            Ok(IssueTemplate::default())
        }
        TemplateChoice::Unknown => Err(AppError::config(format!(
            "no template named {:?} in the catalogue",
            chosen
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(names: &[&str]) -> AppConfig {
        let templates = names
            .iter()
            .map(|n| format!("[[templates]]\nname = \"{}\"\n", n))
            .collect::<String>();
        toml::from_str(&format!("group = \"g\"\n{}", templates)).unwrap()
    }

    #[test]
    fn test_resolve_matched() {
        let config = config_with(&["Bug", "Feature"]);
        match resolve(&config, "Feature") {
            TemplateChoice::Matched(t) => assert_eq!(t.name, "Feature"),
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn test_resolve_custom_sentinel() {
        let config = config_with(&["Bug"]);
        assert!(matches!(
            resolve(&config, "Custom"),
            TemplateChoice::Custom
        ));
    }

    #[test]
    fn test_resolve_unknown() {
        let config = config_with(&["Bug"]);
        assert!(matches!(
            resolve(&config, "Nope"),
            TemplateChoice::Unknown
        ));
    }
}
