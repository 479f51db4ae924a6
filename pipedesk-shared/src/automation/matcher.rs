/// Task matching strategy for checklist auto-closure
///
/// Deciding which open tasks a completed checklist item should close is a
/// heuristic, and a fragile one (generic titles produce false positives), so
/// it lives behind a trait: the orchestration in
/// [`super::checklist`] never needs to change when the heuristic does.

/// Strategy deciding whether a checklist item refers to a task
pub trait TaskMatcher: Send + Sync {
    /// Checks whether completing `item_title` should close the task
    fn matches(&self, item_title: &str, task_title: &str, task_description: Option<&str>) -> bool;
}

/// Default strategy: case-insensitive substring containment
///
/// A task matches when the checklist item's title appears anywhere in the
/// task's title or description, ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TaskMatcher for SubstringMatcher {
    fn matches(&self, item_title: &str, task_title: &str, task_description: Option<&str>) -> bool {
        let needle = item_title.to_lowercase();
        if needle.is_empty() {
            return false;
        }

        task_title.to_lowercase().contains(&needle)
            || task_description
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_title_substring() {
        let m = SubstringMatcher;
        assert!(m.matches(
            "Договор подготовлен",
            "Договор подготовлен для клиента",
            None
        ));
        assert!(m.matches("contract", "Send CONTRACT draft", None));
    }

    #[test]
    fn test_matches_description_substring() {
        let m = SubstringMatcher;
        assert!(m.matches(
            "Скидка согласована",
            "Позвонить клиенту",
            Some("Уточнить, что скидка согласована с руководителем")
        ));
    }

    #[test]
    fn test_no_match() {
        let m = SubstringMatcher;
        assert!(!m.matches("Оплата получена", "Позвонить клиенту", None));
        assert!(!m.matches("Оплата получена", "Позвонить клиенту", Some("без деталей")));
    }

    #[test]
    fn test_case_insensitive() {
        let m = SubstringMatcher;
        assert!(m.matches("ДОГОВОР", "договор подготовлен", None));
    }

    #[test]
    fn test_empty_item_title_never_matches() {
        let m = SubstringMatcher;
        assert!(!m.matches("", "anything", Some("anything")));
    }
}
