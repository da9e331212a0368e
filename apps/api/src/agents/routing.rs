use crate::agents::AgentKind;

/// The agent a message goes to, and the message text it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    pub agent: AgentKind,
    pub message: String,
}

const AREAS: [(AgentKind, &str, &str); 4] = [
    (AgentKind::Jobs, "1", "Jobs"),
    (AgentKind::Coding, "2", "Coding"),
    (AgentKind::Projects, "3", "Projects"),
    (AgentKind::Networking, "4", "Networking"),
];

/// Picks the agent for a chat turn. An explicit specialist wins; blank,
/// "auto" or unknown names fall back to `route_message`.
pub fn select_agent(requested: &str, message: &str) -> RoutedMessage {
    match AgentKind::from_name(requested) {
        Some(agent) if agent != AgentKind::Root => RoutedMessage {
            agent,
            message: message.to_string(),
        },
        _ => route_message(message),
    }
}

/// Automatic routing. Messages that already carry a hint (`[agent:x]`,
/// `option N`) keep their text; otherwise a matching area prefixes the
/// message with `Option N (Area): `.
pub fn route_message(message: &str) -> RoutedMessage {
    let lowered = message.trim().to_lowercase();

    if let Some(agent) = explicit_hint(&lowered) {
        return RoutedMessage {
            agent,
            message: message.to_string(),
        };
    }

    match area_for(&lowered) {
        Some(agent) => {
            let (_, number, label) = AREAS
                .iter()
                .find(|(kind, _, _)| *kind == agent)
                .copied()
                .unwrap_or((agent, "", ""));
            RoutedMessage {
                agent,
                message: format!("Option {number} ({label}): {message}"),
            }
        }
        None => RoutedMessage {
            agent: AgentKind::Root,
            message: message.to_string(),
        },
    }
}

fn explicit_hint(lowered: &str) -> Option<AgentKind> {
    if let Some(start) = lowered.find("[agent:") {
        let rest = &lowered[start + "[agent:".len()..];
        let name = rest.split(']').next().unwrap_or_default();
        return Some(AgentKind::from_name(name).unwrap_or(AgentKind::Root));
    }
    AREAS
        .iter()
        .find(|(_, number, _)| lowered.contains(&format!("option {number}")))
        .map(|(kind, _, _)| *kind)
}

fn area_for(lowered: &str) -> Option<AgentKind> {
    match lowered {
        "1" | "jobs" | "job" | "job applications" | "job application" => {
            return Some(AgentKind::Jobs)
        }
        "2" | "coding" | "code" | "leetcode" | "problem" => return Some(AgentKind::Coding),
        "3" | "projects" | "project" => return Some(AgentKind::Projects),
        "4" | "networking" | "network" => return Some(AgentKind::Networking),
        _ => {}
    }

    let has_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));
    if has_any(&["job", "application", "resume"]) {
        Some(AgentKind::Jobs)
    } else if has_any(&["code", "leetcode", "problem"]) {
        Some(AgentKind::Coding)
    } else if has_any(&["project", "repo", "portfolio"]) {
        Some(AgentKind::Projects)
    } else if has_any(&["network", "contact", "coffee chat"]) {
        Some(AgentKind::Networking)
    } else {
        None
    }
}
