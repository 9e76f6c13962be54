//! Status workflow: the configured cycle of board columns.

use std::collections::BTreeMap;

/// Status assigned to a task when neither the document nor the workflow
/// provides one.
pub const DEFAULT_STATUS: &str = "backlog";

/// Default ordered workflow columns
pub fn default_columns() -> Vec<String> {
    vec![
        "backlog".to_string(),
        "in_progress".to_string(),
        "done".to_string(),
    ]
}

/// Default display labels for the default columns
pub fn default_status_labels() -> BTreeMap<String, String> {
    [
        ("backlog", "Backlog"),
        ("in_progress", "In Progress"),
        ("done", "Done"),
    ]
    .into_iter()
    .map(|(key, label)| (key.to_string(), label.to_string()))
    .collect()
}

/// Status that follows `current` in `columns`.
///
/// Empty `columns` leaves the status unchanged, an unknown status moves to
/// the first column, and the last column wraps around to the first.
pub fn next_status(current: &str, columns: &[String]) -> String {
    let Some(first) = columns.first() else {
        return current.to_string();
    };
    match columns.iter().position(|column| column == current) {
        Some(index) => columns[(index + 1) % columns.len()].clone(),
        None => first.clone(),
    }
}

/// Initial status for new tasks
pub fn first_status(columns: &[String]) -> String {
    columns
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_STATUS.to_string())
}

/// Terminal column used by the mark-done shortcut
pub fn last_status(columns: &[String]) -> Option<&str> {
    columns.last().map(String::as_str)
}

/// Display label for a status: the configured label, or the key in title case.
pub fn status_label(status: &str, labels: &BTreeMap<String, String>) -> String {
    if let Some(label) = labels.get(status) {
        return label.clone();
    }
    status
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["todo".to_string(), "doing".to_string(), "done".to_string()]
    }

    #[test]
    fn next_status_cycles_and_wraps() {
        let cols = columns();
        assert_eq!(next_status("todo", &cols), "doing");
        assert_eq!(next_status("doing", &cols), "done");
        assert_eq!(next_status("done", &cols), "todo");
    }

    #[test]
    fn unknown_status_moves_to_first_column() {
        assert_eq!(next_status("missing", &columns()), "todo");
    }

    #[test]
    fn empty_columns_keep_status() {
        assert_eq!(next_status("todo", &[]), "todo");
        assert_eq!(next_status("", &[]), "");
    }

    #[test]
    fn single_column_cycles_to_itself() {
        let cols = vec!["only".to_string()];
        assert_eq!(next_status("only", &cols), "only");
        assert_eq!(next_status("other", &cols), "only");
    }

    #[test]
    fn first_and_last_status() {
        assert_eq!(first_status(&columns()), "todo");
        assert_eq!(first_status(&[]), DEFAULT_STATUS);
        assert_eq!(last_status(&columns()), Some("done"));
        assert_eq!(last_status(&[]), None);
    }

    #[test]
    fn labels_prefer_configured_value() {
        let labels = default_status_labels();
        assert_eq!(status_label("in_progress", &labels), "In Progress");
        assert_eq!(status_label("waiting_on_review", &labels), "Waiting On Review");
        assert_eq!(status_label("QA", &labels), "Qa");
    }
}
