// Shared prompt fragments used by every specialist agent.
// Agent-specific instructions live in `agents/prompts.rs`.

/// Keeps agents from claiming they wrote anything themselves.
pub const READ_ONLY_POLICY: &str = "\
- Read-only: you cannot write to the database and must not claim you did. \
The user's UI handles data entry.";

/// How a specialist must phrase a write suggestion so the service can pick it up.
/// `{table}` and `{record}` are filled in per agent.
pub const WRITE_SUGGESTION_FORMAT: &str = r#"- If the user asks to add or log something, reply with ONLY a JSON write suggestion in a fenced ```json code block using this schema:
{
  "write_requests": [
    {
      "action": "insert",
      "table": {table},
      "records": [
        {record}
      ]
    }
  ]
}
- For goals, use fields: description, target_date|week_of|month_of (YYYY-MM-DD), completed (false), and link IDs (job_application_id, coding_problem_id, project_id, contact_id) as null if unknown.
- The user will be asked to confirm before anything is saved."#;

/// Appended when the service has no database handle.
pub const NO_DATA_NOTICE: &str =
    "The tracker database is currently unavailable, so no history could be loaded. Say so briefly.";
