//! Interactive menu for the CLI.

use std::collections::BTreeMap;

use dialoguer::{Input, Select};
use seismo_map_database_models::FilterField;

/// Top-level actions offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    Latest,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[Self::Search, Self::Latest, Self::Serve];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Search => "Search events",
            Self::Latest => "Show latest event",
            Self::Serve => "Start server",
        }
    }
}

/// Asks which action to run.
///
/// # Errors
///
/// Returns a [`dialoguer::Error`] if the terminal cannot be read.
pub fn select_action() -> Result<Action, dialoguer::Error> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Action::ALL[idx])
}

/// Prompts for every criteria field; blank answers leave a field unset.
///
/// # Errors
///
/// Returns a [`dialoguer::Error`] if the terminal cannot be read.
pub fn prompt_fields() -> Result<BTreeMap<String, String>, dialoguer::Error> {
    println!("Leave a field blank to skip it.");

    let mut fields = BTreeMap::new();
    for &field in FilterField::all() {
        let value: String = Input::new()
            .with_prompt(format!("{field} ({})", field.expected()))
            .allow_empty(true)
            .interact_text()?;

        if !value.trim().is_empty() {
            fields.insert(field.to_string(), value);
        }
    }

    Ok(fields)
}
