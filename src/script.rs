//! Conversation script and person directory, loaded once before the exhibit starts.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::events::PersonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PersonRef {
    pub index: u8,
}

impl PersonRef {
    pub fn id(self) -> PersonId {
        PersonId(self.index)
    }
}

/// One scripted call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEntry {
    pub caller: PersonRef,
    pub callee: PersonRef,
    pub hello_file: String,
    pub hello_text: String,
    #[serde(default)]
    pub convo_file: String,
    #[serde(default)]
    pub convo_text: String,
    #[serde(default)]
    pub retry_after_wrong_file: String,
    #[serde(default)]
    pub retry_after_wrong_text: String,
    /// Caption track; defaults to the conversation's media ref.
    #[serde(default)]
    pub caption_file: Option<String>,
    /// The caller only talks to the operator; no callee leg.
    #[serde(default)]
    pub hello_only: bool,
}

impl CallEntry {
    pub fn caption_ref(&self) -> &str {
        self.caption_file.as_deref().unwrap_or(&self.convo_file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub wrong_num_file: String,
    #[serde(default)]
    pub wrong_num_text: String,
}

/// Ordered calls, indexed by the conversation cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationScript {
    calls: Vec<CallEntry>,
}

impl ConversationScript {
    pub fn new(calls: Vec<CallEntry>) -> Self {
        Self { calls }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let calls: Vec<CallEntry> =
            serde_json::from_str(text).context("conversation script is not valid JSON")?;
        Ok(Self::new(calls))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn get(&self, cursor: usize) -> Option<&CallEntry> {
        self.calls.get(cursor)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Persons indexed by [`PersonId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDirectory {
    persons: Vec<Person>,
}

impl PersonDirectory {
    pub fn new(persons: Vec<Person>) -> Self {
        Self { persons }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let persons: Vec<Person> =
            serde_json::from_str(text).context("person directory is not valid JSON")?;
        Ok(Self::new(persons))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read persons {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn get(&self, person: PersonId) -> Option<&Person> {
        self.persons.get(person.slot())
    }

    pub fn name(&self, person: PersonId) -> &str {
        self.get(person).map_or("unknown", |p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

/// Reject scripts that would reference a jack or person that does not exist.
pub fn validate_script(script: &ConversationScript, persons: &PersonDirectory) -> Result<()> {
    for (cursor, call) in script.calls.iter().enumerate() {
        for (role, person) in [("caller", call.caller.id()), ("callee", call.callee.id())] {
            if !person.has_jack() {
                bail!("call {cursor}: {role} {person} has no jack");
            }
            if persons.get(person).is_none() {
                bail!("call {cursor}: {role} {person} is missing from the person directory");
            }
        }
        if call.caller == call.callee {
            bail!("call {cursor}: caller and callee are the same person");
        }
        if call.hello_file.trim().is_empty() {
            bail!("call {cursor}: helloFile is empty");
        }
        if !call.hello_only && call.convo_file.trim().is_empty() {
            bail!("call {cursor}: convoFile is required unless helloOnly is set");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSONS: &str = r#"[
        {"name": "Charlie", "wrongNumFile": "wrong-charlie", "wrongNumText": "Not me!"},
        {"name": "Olive", "wrongNumFile": "wrong-olive", "wrongNumText": "Wrong line."},
        {"name": "Mabel"}
    ]"#;

    const SCRIPT: &str = r#"[
        {
            "caller": {"index": 0},
            "callee": {"index": 1},
            "helloFile": "1-Charlie_Operator",
            "helloText": "Operator, get me Olive.",
            "convoFile": "2-Charlie_Calls_Olive",
            "convoText": "Charlie and Olive talk.",
            "retryAfterWrongFile": "retry-charlie",
            "retryAfterWrongText": "I asked for Olive."
        },
        {
            "caller": {"index": 2},
            "callee": {"index": 0},
            "helloFile": "3-Mabel_Operator",
            "helloText": "Just checking the line works.",
            "helloOnly": true
        }
    ]"#;

    #[test]
    fn parses_camel_case_script() {
        let script = ConversationScript::from_json(SCRIPT).unwrap();
        assert_eq!(script.len(), 2);
        let first = script.get(0).unwrap();
        assert_eq!(first.caller.id(), PersonId(0));
        assert_eq!(first.callee.id(), PersonId(1));
        assert_eq!(first.caption_ref(), "2-Charlie_Calls_Olive");
        assert!(!first.hello_only);
        assert!(script.get(1).unwrap().hello_only);
        assert!(script.get(2).is_none());
    }

    #[test]
    fn person_fields_default_when_missing() {
        let persons = PersonDirectory::from_json(PERSONS).unwrap();
        assert_eq!(persons.name(PersonId(2)), "Mabel");
        assert_eq!(persons.get(PersonId(2)).unwrap().wrong_num_file, "");
        assert_eq!(persons.name(PersonId(9)), "unknown");
    }

    #[test]
    fn valid_script_passes_cross_checks() {
        let script = ConversationScript::from_json(SCRIPT).unwrap();
        let persons = PersonDirectory::from_json(PERSONS).unwrap();
        assert!(validate_script(&script, &persons).is_ok());
    }

    #[test]
    fn rejects_person_without_jack() {
        let script = ConversationScript::from_json(
            r#"[{"caller": {"index": 12}, "callee": {"index": 1},
                 "helloFile": "h", "helloText": "t", "convoFile": "c"}]"#,
        )
        .unwrap();
        let persons = PersonDirectory::from_json(PERSONS).unwrap();
        assert!(validate_script(&script, &persons).is_err());
    }

    #[test]
    fn rejects_missing_conversation_for_full_call() {
        let script = ConversationScript::from_json(
            r#"[{"caller": {"index": 0}, "callee": {"index": 1},
                 "helloFile": "h", "helloText": "t"}]"#,
        )
        .unwrap();
        let persons = PersonDirectory::from_json(PERSONS).unwrap();
        assert!(validate_script(&script, &persons).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ConversationScript::from_json("{not json").is_err());
    }
}
