use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Ordered, sanitized column names taken from a file's header line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    names: Vec<String>,
}

impl Schema {
    pub fn from_header<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut used: HashSet<String> = HashSet::new();
        let mut next_suffix: HashMap<String, usize> = HashMap::new();
        let mut names = Vec::new();
        for name in raw {
            let base = sanitize_name(name.as_ref());
            let mut candidate = base.clone();
            if used.contains(&candidate) {
                let suffix = next_suffix.entry(base.clone()).or_insert(2);
                loop {
                    candidate = format!("{base}_{suffix}");
                    *suffix += 1;
                    if !used.contains(&candidate) {
                        break;
                    }
                }
            }
            used.insert(candidate.clone());
            names.push(candidate);
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

/// Lowercase snake_case identifier: `"Monitor Protocol (MP) ID"` becomes
/// `"monitor_protocol_mp_id"`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if out.is_empty() {
        return "x".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'x');
    }
    out
}
