use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const DIFF_CASES_FORMAT_V1: &str = "domdelta-diff-cases-v1";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct DiffCaseManifest {
    format: String,
    #[serde(default)]
    cases: Vec<DiffCase>,
}

/// One before/after case loaded from a TOML manifest.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiffCase {
    pub id: String,
    pub before: String,
    pub after: String,
    /// Engine configuration for this case, as a TOML table.
    #[serde(default)]
    pub config: Option<toml::Table>,
    /// Expected operation actions in order, when the case pins the exact script.
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    /// Upper bound on script length, for capped cases.
    #[serde(default)]
    pub max_ops: Option<usize>,
    /// Whether applying the script must reproduce `after` exactly.
    #[serde(default = "default_true")]
    pub converges: bool,
}

fn default_true() -> bool {
    true
}

impl DiffCase {
    /// The case configuration re-serialized as TOML text (empty when absent).
    pub fn config_toml(&self) -> String {
        self.config
            .as_ref()
            .map(|table| table.to_string())
            .unwrap_or_default()
    }
}

pub fn load_diff_cases(path: &Path) -> Vec<DiffCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read diff case TOML {path:?}: {err}"));
    let manifest: DiffCaseManifest = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse diff case TOML {path:?}: {err}"));
    assert_eq!(
        manifest.format, DIFF_CASES_FORMAT_V1,
        "unsupported diff case format in {path:?}"
    );
    assert!(!manifest.cases.is_empty(), "no cases in {path:?}");
    let mut seen = BTreeSet::new();
    for case in &manifest.cases {
        assert!(
            seen.insert(case.id.as_str()),
            "duplicate diff case id in {path:?}: {}",
            case.id
        );
        if let Some(actions) = &case.actions {
            assert!(
                case.max_ops.is_none_or(|max| actions.len() <= max),
                "case {} pins more actions than max_ops",
                case.id
            );
        }
    }
    manifest.cases
}

/// Pretty JSON of any serializable value, for assertion messages.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_manifest_with_defaults() {
        let manifest: DiffCaseManifest = toml::from_str(
            r#"
format = "domdelta-diff-cases-v1"

[[cases]]
id = "a"
before = "<p>1</p>"
after = "<p>2</p>"
actions = ["modifyText"]

[cases.config]
skip_selector = "script"
"#,
        )
        .expect("valid manifest");
        let case = &manifest.cases[0];
        assert!(case.converges);
        assert_eq!(case.actions.as_deref(), Some(&["modifyText".to_string()][..]));
        assert!(case.config_toml().contains("skip_selector = \"script\""));
    }

    #[test]
    fn cases_with_config_tables_compare_by_value() {
        let manifest: DiffCaseManifest = toml::from_str(
            r#"
format = "domdelta-diff-cases-v1"

[[cases]]
id = "a"
before = "<p>1</p>"
after = "<p>2</p>"

[cases.config]
diff_cap = 2
"#,
        )
        .expect("valid manifest");
        let case = manifest.cases[0].clone();
        assert_eq!(case, manifest.cases[0]);
        let mut other = case.clone();
        other.config = None;
        assert_ne!(case, other);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<DiffCaseManifest, _> = toml::from_str(
            r#"
format = "domdelta-diff-cases-v1"

[[cases]]
id = "a"
before = ""
after = ""
surprise = true
"#,
        );
        assert!(result.is_err());
    }
}
