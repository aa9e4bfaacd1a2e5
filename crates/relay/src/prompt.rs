// Prompt construction for the relay endpoints

use crate::snapshot::DatasetSnapshot;

/// Free-text query over the dataset (endpoint A). The reply is prose; the
/// rule-conversion path feeds the same endpoint and parses whatever comes
/// back.
pub fn query_prompt(snapshot: &DatasetSnapshot, query: &str) -> String {
    format!(
        "\
You are a helpful assistant for exploring structured data.
Given:
Clients: {clients}
Workers: {workers}
Tasks: {tasks}

User query: \"{query}\"

Respond with explanation and relevant info.
",
        clients = snapshot.clients,
        workers = snapshot.workers,
        tasks = snapshot.tasks,
        query = query,
    )
}

/// Dataset quality review (endpoint B). JSON-only reply.
pub fn validate_prompt(snapshot: &DatasetSnapshot) -> String {
    format!(
        "\
You are a data-quality reviewer for structured allocation data.
Given:
Clients: {clients}
Workers: {workers}
Tasks: {tasks}

List every data-quality problem you can find (missing values, out-of-range
priorities, durations below 1, malformed AttributesJSON, dangling task IDs).

Respond with a single JSON object and nothing else:
{{\"issues\": [\"<description>\", ...]}}
",
        clients = snapshot.clients,
        workers = snapshot.workers,
        tasks = snapshot.tasks,
    )
}

/// Rule recommendation (endpoint C). JSON-only reply.
pub fn recommend_prompt(snapshot: &DatasetSnapshot) -> String {
    format!(
        "\
You are an allocation-rules assistant.
Given:
Clients: {clients}
Workers: {workers}
Tasks: {tasks}

Suggest allocation rules this dataset would benefit from. Valid rule shapes:
  {{\"type\": \"coRun\", \"tasks\": [\"T1\", \"T2\"]}}
  {{\"type\": \"phaseWindow\", \"tasks\": [\"T1\"], \"allowedPhases\": [1, 2]}}
  {{\"type\": \"slotRestriction\", \"group\": \"<label>\", \"minCommonSlots\": 2}}

Respond with a single JSON object and nothing else:
{{\"rules\": [<rule>, ...]}}
",
        clients = snapshot.clients,
        workers = snapshot.workers,
        tasks = snapshot.tasks,
    )
}

/// Rule error check (endpoint D). JSON-only reply.
pub fn rule_check_prompt(rules_json: &str) -> String {
    format!(
        "\
You are an allocation-rules reviewer.
Given this rule list:
{rules}

Flag contradictions, duplicates, impossible phase windows, and rules that
reference unknown tasks.

Respond with a single JSON object and nothing else:
{{\"issues\": [\"<description>\", ...]}}
",
        rules = rules_json,
    )
}
