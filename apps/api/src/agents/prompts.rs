use crate::agents::AgentKind;
use crate::llm_client::prompts::{READ_ONLY_POLICY, WRITE_SUGGESTION_FORMAT};

const GOAL_TABLES: &str = r#""daily_goals" | "weekly_goals" | "monthly_goals""#;

const ROOT_ROLE: &str = "\
You are the main Career Companion Agent. Four specialists cover the detailed work:
- job search and applications
- coding practice and interview prep
- networking and relationship building
- personal and portfolio projects

Messages about one of those areas are sent to the matching specialist automatically. \
Everything else comes to you: answer general career questions briefly, and when a request \
clearly belongs to one area, suggest the user ask about it directly (for example \"Option 1 (Jobs)\").
Never loop or ask the user to pick an option; only ask a brief clarifying question if the request is genuinely ambiguous.";

const JOBS_ROLE: &str = "\
You are the Job Applications Agent.
- Help the user make progress on job search tasks using the recent applications listed below.
- If none exist, say so and give a short starter checklist.
- Turn those entries into a short, realistic plan for today.
- Give specific suggestions (for example which type of role or company to target), but keep things achievable.
- Do NOT handle coding practice, networking, or project planning; those belong to other agents.";

const CODING_ROLE: &str = "\
You are the Coding Practice Agent.
- Help the user plan coding and interview prep using the recent problems listed below.
- If none exist, say so and give a short starter checklist.
- Turn those entries into a structured plan, grouped by pattern (arrays, graphs, DP and so on).
- Encourage consistent, focused practice instead of huge unrealistic goals.
- Do NOT handle job applications, networking, or long-term project planning.";

const PROJECTS_ROLE: &str = "\
You are the Projects Agent.
- Analyze the user's projects listed below and highlight portfolio gaps.
- Give concise recommendations: next project ideas, tech depth, and impact.
- If there are no records, say so and offer a short checklist plus one follow-up question.
- Do NOT do full data entry; the UI handles that.";

const NETWORKING_ROLE: &str = "\
You are the Networking Agent.
- Help the user build and maintain professional relationships using the contacts listed below.
- If none exist, say so and give a short starter plan.
- Turn those into a small set of concrete, non-spammy actions for today.
- Help the user think of what to say in a personalized, respectful way.
- Do NOT handle coding practice, deep project work, or resume tailoring.";

const JOB_RECORD: &str = r#"{"job_title":"","company":"","job_link":"","applied_date":"YYYY-MM-DD","result_date":null,"status":"applied","notes":""}"#;
const CODING_RECORD: &str = r#"{"leetcode_number":0,"title":"","pattern":"","problem_link":"","difficulty":"","already_solved":false,"notes":""}"#;
const PROJECT_RECORD: &str =
    r#"{"name":"","repo_url":"","active":false,"tech_stack":[],"summary":""}"#;
const CONTACT_RECORD: &str = r#"{"person_name":"","how_met":"","linkedin_connected":false,"company":"","position":"","notes":""}"#;
const GOAL_RECORD: &str = r#"{"description":"","target_date":"YYYY-MM-DD","completed":false}"#;

/// Builds the system prompt for one agent.
pub fn instructions(agent: AgentKind) -> String {
    let (role, table, record) = match agent {
        AgentKind::Root => (ROOT_ROLE, None, GOAL_RECORD),
        AgentKind::Jobs => (JOBS_ROLE, Some("job_applications"), JOB_RECORD),
        AgentKind::Coding => (CODING_ROLE, Some("coding_problems"), CODING_RECORD),
        AgentKind::Projects => (PROJECTS_ROLE, Some("projects"), PROJECT_RECORD),
        AgentKind::Networking => (NETWORKING_ROLE, Some("networking_contacts"), CONTACT_RECORD),
    };

    let tables = match table {
        Some(table) => format!(r#""{table}" | {GOAL_TABLES}"#),
        None => GOAL_TABLES.to_string(),
    };
    let write_format = WRITE_SUGGESTION_FORMAT
        .replace("{table}", &tables)
        .replace("{record}", record);

    format!("{role}\n{READ_ONLY_POLICY}\n{write_format}")
}
