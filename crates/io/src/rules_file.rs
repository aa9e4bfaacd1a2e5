// The rules.json export artifact

use std::fs;
use std::path::Path;

use alchemist_engine::rules::{parse_relay_rules, RuleSet};

/// Load an existing rules file, or an empty set when the file does not
/// exist yet. The content goes through the same schema gate as relay
/// output, so a hand-edited file cannot smuggle malformed rules back in.
pub fn load_or_default(path: &Path) -> Result<RuleSet, String> {
    if !path.exists() {
        return Ok(RuleSet::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    let rules = parse_relay_rules(&content)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    Ok(rules.into_iter().collect())
}

/// Write the accumulator's pretty-printed JSON to disk.
pub fn save(path: &Path, rules: &RuleSet) -> Result<(), String> {
    let json = rules.export_json().map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemist_engine::rules::Rule;
    use tempfile::tempdir;

    #[test]
    fn round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");

        let set: RuleSet = [
            Rule::co_run(vec!["T1".into(), "T2".into()]).unwrap(),
            Rule::phase_window(vec!["T3".into()], vec![1, 2]).unwrap(),
        ]
        .into_iter()
        .collect();

        save(&path, &set).unwrap();
        let back = load_or_default(&path).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn missing_file_is_empty_set() {
        let dir = tempdir().unwrap();
        let set = load_or_default(&dir.path().join("rules.json")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn hand_edited_garbage_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"[{"type":"coRun","tasks":"T1,T2"}]"#).unwrap();
        assert!(load_or_default(&path).is_err());
    }
}
