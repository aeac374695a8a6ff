//! Interactive terminal prompting boundary.
//!
//! Pipelines ask questions through the [`Prompter`] trait so they can be
//! driven by scripted answers in tests. The terminal implementation uses
//! `dialoguer`.

use crate::error::AppError;
use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input, Select};

/// Interactive prompting operations.
pub trait Prompter {
    /// Single choice from a list. Returns the chosen item, or `None` when
    /// the user aborts.
    fn select(&self, message: &str, options: &[String]) -> Result<Option<String>, AppError>;

    /// Single choice with live substring filtering over the options.
    fn fuzzy_select(&self, message: &str, options: &[String])
        -> Result<Option<String>, AppError>;

    /// Free-text input; empty input yields `None`.
    fn input(&self, message: &str) -> Result<Option<String>, AppError>;

    /// Yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, AppError>;
}

/// Terminal prompter backed by `dialoguer`.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, options: &[String]) -> Result<Option<String>, AppError> {
        if options.is_empty() {
            return Ok(None);
        }
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(|e| AppError::internal(format!("prompt failed: {}", e)))?;
        Ok(choice.map(|i| options[i].clone()))
    }

    fn fuzzy_select(
        &self,
        message: &str,
        options: &[String],
    ) -> Result<Option<String>, AppError> {
        if options.is_empty() {
            return Ok(None);
        }
        let choice = FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(|e| AppError::internal(format!("prompt failed: {}", e)))?;
        Ok(choice.map(|i| options[i].clone()))
    }

    fn input(&self, message: &str) -> Result<Option<String>, AppError> {
        let text: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AppError::internal(format!("prompt failed: {}", e)))?;
        let text = text.trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, AppError> {
        dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| AppError::internal(format!("prompt failed: {}", e)))
    }
}

/// Case-insensitive substring filter used for epic search.
pub fn filter_by_query(options: &[String], query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    options
        .iter()
        .filter(|o| o.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
