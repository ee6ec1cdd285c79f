//! Role extraction from token claims

use std::collections::BTreeSet;

use serde_json::Value;

use super::claims::Claims;

/// Canonical, upper-cased role labels
pub type RoleSet = BTreeSet<String>;

/// Claim fields consulted for roles, in priority order
const ROLE_CLAIMS: [&str; 3] = ["authorities", "roles", "scope"];

/// Fields of a role object that carry its label
const ROLE_OBJECT_FIELDS: [&str; 3] = ["authority", "role", "name"];

/// Extract the canonical role set from claims.
///
/// Reads the first populated field among `authorities`, `roles` and `scope`.
/// Never fails: anything unrecognised yields an empty set.
pub fn extract_roles(claims: &Claims) -> RoleSet {
    let Some(value) = ROLE_CLAIMS
        .iter()
        .filter_map(|field| claims.get(field))
        .find(|value| is_populated(value))
    else {
        return RoleSet::new();
    };

    let mut raw = Vec::new();
    collect_entries(value, &mut raw);

    raw.iter().filter_map(|entry| normalize_role(entry)).collect()
}

/// Upper-case a raw role label, dropping empty ones
pub fn normalize_role(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn collect_entries(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(split_scope(s)),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    Value::Object(_) => out.push(role_object_label(item)),
                    Value::Null => {}
                    other => out.push(other.to_string()),
                }
            }
        }
        Value::Object(_) => out.push(role_object_label(value)),
        Value::Null => {}
        other => out.push(other.to_string()),
    }
}

fn role_object_label(object: &Value) -> String {
    ROLE_OBJECT_FIELDS
        .iter()
        .find_map(|field| object.get(field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| object.to_string())
}

fn split_scope(scope: &str) -> impl Iterator<Item = String> + '_ {
    scope
        .split(|c: char| c == ';' || c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roles_of(value: Value) -> Vec<String> {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        extract_roles(&Claims::new(map)).into_iter().collect()
    }

    #[test]
    fn test_authorities_list_keeps_prefix() {
        assert_eq!(
            roles_of(json!({"authorities": ["ROLE_ADMIN"]})),
            vec!["ROLE_ADMIN"]
        );
    }

    #[test]
    fn test_lowercase_entries_are_uppercased() {
        assert_eq!(
            roles_of(json!({"roles": ["medico", "Paciente"]})),
            vec!["MEDICO", "PACIENTE"]
        );
    }

    #[test]
    fn test_role_objects() {
        let roles = roles_of(json!({
            "authorities": [
                {"authority": "ROLE_MEDICO"},
                {"role": "admin"},
                {"name": "paciente"}
            ]
        }));
        assert_eq!(roles, vec!["ADMIN", "PACIENTE", "ROLE_MEDICO"]);
    }

    #[test]
    fn test_role_object_without_label_uses_rendering() {
        let roles = roles_of(json!({"authorities": [{"id": 7}]}));
        assert_eq!(roles, vec![r#"{"ID":7}"#]);
    }

    #[test]
    fn test_scope_string_is_split() {
        assert_eq!(
            roles_of(json!({"scope": "read;write, admin  audit"})),
            vec!["ADMIN", "AUDIT", "READ", "WRITE"]
        );
    }

    #[test]
    fn test_authorities_take_priority() {
        assert_eq!(
            roles_of(json!({"authorities": ["a"], "roles": ["b"], "scope": "c"})),
            vec!["A"]
        );
    }

    #[test]
    fn test_empty_string_falls_through() {
        assert_eq!(roles_of(json!({"authorities": "", "roles": ["b"]})), vec!["B"]);
    }

    #[test]
    fn test_empty_entries_dropped() {
        assert_eq!(roles_of(json!({"roles": ["", "  ", "x"]})), vec!["X"]);
    }

    #[test]
    fn test_no_role_fields() {
        assert!(roles_of(json!({"sub": "someone"})).is_empty());
    }
}
