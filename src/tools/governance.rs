//! Governance note tool
//!
//! Appends notes to proposals in a process-wide [`NoteStore`]. The store is
//! created once at startup and shared by the tool, the HTTP API and the REPL,
//! so counts accumulate across runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{JsonMap, ToolError};
use crate::tools::{parse_input, require_non_empty, to_output, Tool};

/// In-memory, append-only note storage keyed by proposal id
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: RwLock<HashMap<String, Vec<String>>>,
}

impl NoteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note and return the proposal's new note count
    pub fn add_note(&self, proposal_id: &str, note: &str) -> usize {
        let mut notes = self.notes.write().unwrap_or_else(|e| e.into_inner());
        let entry = notes.entry(proposal_id.to_string()).or_default();
        entry.push(note.to_string());
        entry.len()
    }

    /// All notes for a proposal, oldest first (empty if unknown)
    pub fn notes(&self, proposal_id: &str) -> Vec<String> {
        let notes = self.notes.read().unwrap_or_else(|e| e.into_inner());
        notes.get(proposal_id).cloned().unwrap_or_default()
    }

    /// Number of notes stored for a proposal
    pub fn count(&self, proposal_id: &str) -> usize {
        let notes = self.notes.read().unwrap_or_else(|e| e.into_inner());
        notes.get(proposal_id).map(Vec::len).unwrap_or(0)
    }

    /// Proposal ids with at least one note, sorted
    pub fn proposal_ids(&self) -> Vec<String> {
        let notes = self.notes.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = notes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every note
    pub fn clear(&self) {
        self.notes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[derive(Debug, Deserialize)]
struct NoteInput {
    proposal_id: String,
    note: String,
}

#[derive(Debug, Serialize)]
struct NoteOutput {
    proposal_id: String,
    note_added: String,
    total_notes: usize,
}

/// Tool that appends notes to governance proposals
#[derive(Debug, Clone)]
pub struct GovernanceNoteTool {
    store: Arc<NoteStore>,
}

impl GovernanceNoteTool {
    /// Create a tool writing into the given store
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }

    /// The store this tool writes into
    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }
}

#[async_trait]
impl Tool for GovernanceNoteTool {
    fn name(&self) -> &str {
        "governance_note"
    }

    fn description(&self) -> &str {
        "Appends a note to a governance proposal. \
         Input: {'proposal_id': 'PROP-123', 'note': 'Review completed'}. \
         Returns: confirmation with total note count."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "proposal_id": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Proposal identifier"
                },
                "note": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Note content to append"
                }
            },
            "required": ["proposal_id", "note"]
        })
    }

    async fn execute(&self, input: &JsonMap) -> Result<JsonMap, ToolError> {
        let input: NoteInput = parse_input(input)?;
        require_non_empty("proposal_id", &input.proposal_id)?;
        require_non_empty("note", &input.note)?;

        let total_notes = self.store.add_note(&input.proposal_id, &input.note);

        to_output(&NoteOutput {
            proposal_id: input.proposal_id,
            note_added: input.note,
            total_notes,
        })
    }
}
