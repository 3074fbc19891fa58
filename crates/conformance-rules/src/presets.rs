//! Rule presets for common convention bundles.

use crate::{
    ArgumentRequirement, ForbidInstantiation, ForbidMethodCall, NameFormat, RequireAttribute,
    RequireBaseType, RequireCollaborator, RequireMethod,
};
use conformance_core::{Receiver, RuleBox, Selector, SelectorError};

/// Preset convention bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Conventions for console command types.
    Commands,
    /// Conventions for tests that cover console commands.
    CommandTests,
    /// Conventions for repository types.
    Repositories,
}

impl Preset {
    /// Returns the rules for this preset.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when a built-in pattern fails to compile.
    /// The patterns are static, so this only surfaces programming errors.
    pub fn rules(self) -> Result<Vec<RuleBox>, SelectorError> {
        match self {
            Self::Commands => command_rules(),
            Self::CommandTests => command_test_rules(),
            Self::Repositories => repository_rules(),
        }
    }
}

/// Conventions for console command types.
///
/// Includes:
/// - `command.nameSuffix`: command type names end in `Command`
/// - `command.missingAsCommand`: commands carry the `AsCommand` attribute
/// - `command.nameFormat`: the declared command name is `app:`-prefixed
///   kebab-case
///
/// # Errors
///
/// Returns [`SelectorError`] when a built-in pattern fails to compile.
pub fn command_rules() -> Result<Vec<RuleBox>, SelectorError> {
    let commands = Selector::extends("console::Command");
    Ok(vec![
        Box::new(NameFormat::new(
            "command.nameSuffix",
            commands.clone(),
            "Command$",
            false,
        )?),
        Box::new(
            RequireAttribute::new("command.missingAsCommand", commands.clone(), "AsCommand")
                .with_tip("Declare the command name with the `AsCommand` attribute"),
        ),
        Box::new(
            RequireAttribute::new("command.nameFormat", commands, "AsCommand")
                .with_argument(ArgumentRequirement::matching(
                    "name",
                    0,
                    "^app:[a-z][a-z0-9-]*(:[a-z][a-z0-9-]*)*$",
                )?)
                .with_tip("Command names use the `app:` prefix and kebab-case segments"),
        ),
    ])
}

/// Conventions for tests covering console commands.
///
/// Includes:
/// - `commandTest.baseClass`: command tests extend the integration base,
///   not the framework's kernel test directly
/// - `commandTest.directInstantiation`: tests never construct any command
///   subtype by hand
/// - `commandTest.missingCommandTester`: tests drive the command through
///   the tester
///
/// # Errors
///
/// Returns [`SelectorError`] when a built-in pattern fails to compile.
pub fn command_test_rules() -> Result<Vec<RuleBox>, SelectorError> {
    let command_tests = Selector::name_matches("CommandTest$", false)?;
    Ok(vec![
        Box::new(
            RequireBaseType::new(
                "commandTest.baseClass",
                command_tests.clone(),
                "testing::IntegrationTestCase",
            )
            .with_tip("Extend the project integration base instead of the framework kernel test"),
        ),
        Box::new(
            ForbidInstantiation::new(
                "commandTest.directInstantiation",
                command_tests.clone(),
                "console::Command",
            )
            .including_subtypes()
            .with_tip("Fetch the command from the application container instead"),
        ),
        Box::new(
            RequireCollaborator::new(
                "commandTest.missingCommandTester",
                command_tests,
                "Covers",
                "console::Command",
                "console::CommandTester",
            )
            .with_conventional_name("command_tester")
            .with_tip("Drive the command with `console::CommandTester` and assert on its output"),
        ),
    ])
}

/// Conventions for repository types.
///
/// Includes:
/// - `repository.transactionHandling`: repositories never open, commit or
///   roll back transactions themselves
/// - `repository.missingFind`: repositories expose a `find` method
///
/// # Errors
///
/// Returns [`SelectorError`] when a built-in pattern fails to compile.
pub fn repository_rules() -> Result<Vec<RuleBox>, SelectorError> {
    let repositories = Selector::name_matches("Repository$", false)?;
    let tip = "Let the calling service own the transaction boundary";
    let mut rules: Vec<RuleBox> = ["begin_transaction", "commit", "rollback"]
        .into_iter()
        .map(|method| {
            Box::new(
                ForbidMethodCall::new(
                    "repository.transactionHandling",
                    repositories.clone(),
                    method,
                    Receiver::CurrentInstance,
                )
                .with_tip(tip),
            ) as RuleBox
        })
        .collect();
    rules.push(Box::new(RequireMethod::new(
        "repository.missingFind",
        repositories,
        "find",
        None,
    )));
    Ok(rules)
}

/// Returns every preset's rules in one bundle.
///
/// # Errors
///
/// Returns [`SelectorError`] when a built-in pattern fails to compile.
pub fn all_rules() -> Result<Vec<RuleBox>, SelectorError> {
    let mut rules = command_rules()?;
    rules.extend(command_test_rules()?);
    rules.extend(repository_rules()?);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_rules_compile() {
        assert!(!Preset::Commands.rules().expect("static patterns").is_empty());
        assert!(!Preset::CommandTests.rules().expect("static patterns").is_empty());
        assert!(!Preset::Repositories.rules().expect("static patterns").is_empty());
    }

    #[test]
    fn all_rules_covers_every_preset() {
        let all = all_rules().expect("static patterns");
        let per_preset = Preset::Commands.rules().expect("static patterns").len()
            + Preset::CommandTests.rules().expect("static patterns").len()
            + Preset::Repositories.rules().expect("static patterns").len();
        assert_eq!(all.len(), per_preset);
    }
}
