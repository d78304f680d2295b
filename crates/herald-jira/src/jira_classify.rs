//! Classification of Jira webhook events into message variants.
//!
//! Multi-item changelogs are decomposed into single-item copies of the event,
//! in changelog order, before the decision table is applied. Classification is
//! total: unrecognized shapes resolve to [`JiraMessageVariant::Unknown`].

use crate::jira_event::JiraWebhookEvent;

/// Upper bound on changelog items decomposed from one delivery.
pub const MAX_CHANGELOG_ITEMS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `JiraMessageVariant` values.
pub enum JiraMessageVariant {
    Created,
    Deleted,
    Renamed,
    Commented,
    Assigned,
    Unassigned,
    Reassigned,
    AttachmentCreated,
    AttachmentDeleted,
    FieldUpdated,
    GenericUpdate,
    TimeLogged,
    Unknown,
}

impl JiraMessageVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Commented => "commented",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::Reassigned => "reassigned",
            Self::AttachmentCreated => "attachment_created",
            Self::AttachmentDeleted => "attachment_deleted",
            Self::FieldUpdated => "field_updated",
            Self::GenericUpdate => "generic_update",
            Self::TimeLogged => "time_logged",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A classified event holding at most one changelog item.
pub struct ClassifiedJiraEvent {
    pub variant: JiraMessageVariant,
    pub event: JiraWebhookEvent,
}

/// Classifies `event`, decomposing multi-item changelogs one item at a time.
///
/// Suppressed events (worklog updates that did not change time spent) yield no
/// entry, so the result may be empty.
pub fn classify_jira_event(event: &JiraWebhookEvent) -> Vec<ClassifiedJiraEvent> {
    if event.change_count() > MAX_CHANGELOG_ITEMS {
        return vec![ClassifiedJiraEvent {
            variant: JiraMessageVariant::Unknown,
            event: event.clone(),
        }];
    }
    if event.change_count() <= 1 {
        return classify_single_change_event(event)
            .map(|variant| ClassifiedJiraEvent {
                variant,
                event: event.clone(),
            })
            .into_iter()
            .collect();
    }

    event
        .changelog
        .items
        .iter()
        .filter_map(|item| {
            let single = event.with_single_change(item);
            classify_single_change_event(&single).map(|variant| ClassifiedJiraEvent {
                variant,
                event: single,
            })
        })
        .collect()
}

/// Applies the decision table to an event with zero or one changelog items.
///
/// Returns `None` when the event is suppressed.
pub fn classify_single_change_event(event: &JiraWebhookEvent) -> Option<JiraMessageVariant> {
    let change = event.first_change();
    let field = change.map(|item| item.field.as_str());
    let from_present = change.is_some_and(|item| item.has_from());
    let to_present = change.is_some_and(|item| item.has_to());

    let variant = match event.webhook_event_name() {
        "issue_created" => JiraMessageVariant::Created,
        "issue_deleted" => JiraMessageVariant::Deleted,
        "issue_updated" => match event.issue_event_type_name.trim() {
            "issue_updated" => match (field, from_present, to_present) {
                (Some("Attachment"), false, true) => JiraMessageVariant::AttachmentCreated,
                (Some("Attachment"), true, false) => JiraMessageVariant::AttachmentDeleted,
                (Some("summary"), _, _) => JiraMessageVariant::Renamed,
                _ => JiraMessageVariant::FieldUpdated,
            },
            "issue_commented" => JiraMessageVariant::Commented,
            "issue_assigned" => match (change.is_some(), from_present, to_present) {
                (true, false, true) => JiraMessageVariant::Assigned,
                (true, true, false) => JiraMessageVariant::Unassigned,
                (true, true, true) => JiraMessageVariant::Reassigned,
                _ => JiraMessageVariant::Unknown,
            },
            "issue_generic" => JiraMessageVariant::GenericUpdate,
            _ => JiraMessageVariant::Unknown,
        },
        "worklog_updated" => match field {
            Some("timespent") => JiraMessageVariant::TimeLogged,
            _ => return None,
        },
        _ => JiraMessageVariant::Unknown,
    };
    Some(variant)
}

#[cfg(test)]
mod tests {
    use super::{
        classify_jira_event, classify_single_change_event, JiraMessageVariant,
        MAX_CHANGELOG_ITEMS,
    };
    use crate::jira_event::{JiraChangelogItem, JiraWebhookEvent};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn change(field: &str, from: Option<Value>, to: Option<Value>) -> JiraChangelogItem {
        JiraChangelogItem {
            field: field.to_string(),
            from,
            from_text: String::new(),
            to,
            to_text: String::new(),
        }
    }

    fn event(webhook: &str, type_name: &str, items: Vec<JiraChangelogItem>) -> JiraWebhookEvent {
        let mut event = JiraWebhookEvent {
            webhook_event: webhook.to_string(),
            issue_event_type_name: type_name.to_string(),
            ..JiraWebhookEvent::default()
        };
        event.changelog.items = items;
        event
    }

    fn variants(event: &JiraWebhookEvent) -> Vec<JiraMessageVariant> {
        classify_jira_event(event)
            .into_iter()
            .map(|classified| classified.variant)
            .collect()
    }

    #[test]
    fn unit_decision_table_covers_every_row() {
        let some = || Some(json!("x"));
        let cases = vec![
            (event("issue_created", "", vec![]), JiraMessageVariant::Created),
            (event("issue_deleted", "", vec![]), JiraMessageVariant::Deleted),
            (
                event("issue_updated", "issue_updated", vec![change("Attachment", None, some())]),
                JiraMessageVariant::AttachmentCreated,
            ),
            (
                event("issue_updated", "issue_updated", vec![change("Attachment", some(), None)]),
                JiraMessageVariant::AttachmentDeleted,
            ),
            (
                event("issue_updated", "issue_updated", vec![change("summary", some(), some())]),
                JiraMessageVariant::Renamed,
            ),
            (
                event("issue_updated", "issue_updated", vec![change("priority", some(), some())]),
                JiraMessageVariant::FieldUpdated,
            ),
            (
                event("issue_updated", "issue_commented", vec![]),
                JiraMessageVariant::Commented,
            ),
            (
                event("issue_updated", "issue_assigned", vec![change("assignee", None, some())]),
                JiraMessageVariant::Assigned,
            ),
            (
                event("issue_updated", "issue_assigned", vec![change("assignee", some(), None)]),
                JiraMessageVariant::Unassigned,
            ),
            (
                event("issue_updated", "issue_assigned", vec![change("assignee", some(), some())]),
                JiraMessageVariant::Reassigned,
            ),
            (
                event("issue_updated", "issue_generic", vec![change("status", some(), some())]),
                JiraMessageVariant::GenericUpdate,
            ),
            (
                event("worklog_updated", "", vec![change("timespent", some(), some())]),
                JiraMessageVariant::TimeLogged,
            ),
            (event("sprint_started", "", vec![]), JiraMessageVariant::Unknown),
        ];
        for (input, expected) in cases {
            assert_eq!(
                variants(&input),
                vec![expected],
                "webhook={} type={}",
                input.webhook_event,
                input.issue_event_type_name
            );
        }
    }

    #[test]
    fn functional_accepts_jira_namespaced_webhook_names() {
        assert_eq!(
            variants(&event("jira:issue_created", "issue_created", vec![])),
            vec![JiraMessageVariant::Created]
        );
        assert_eq!(
            variants(&event(
                "jira:worklog_updated",
                "",
                vec![change("timespent", Some(json!(1)), Some(json!(2)))]
            )),
            vec![JiraMessageVariant::TimeLogged]
        );
    }

    #[test]
    fn regression_empty_changelog_field_update_falls_through_to_field_updated() {
        assert_eq!(
            classify_single_change_event(&event("issue_updated", "issue_updated", vec![])),
            Some(JiraMessageVariant::FieldUpdated)
        );
    }

    #[test]
    fn regression_attachment_with_both_values_is_a_field_update() {
        let input = event(
            "issue_updated",
            "issue_updated",
            vec![change("Attachment", Some(json!("1")), Some(json!("2")))],
        );
        assert_eq!(variants(&input), vec![JiraMessageVariant::FieldUpdated]);
    }

    #[test]
    fn regression_assignment_without_usable_change_is_unknown() {
        assert_eq!(
            variants(&event("issue_updated", "issue_assigned", vec![])),
            vec![JiraMessageVariant::Unknown]
        );
        assert_eq!(
            variants(&event(
                "issue_updated",
                "issue_assigned",
                vec![change("assignee", None, None)]
            )),
            vec![JiraMessageVariant::Unknown]
        );
    }

    #[test]
    fn functional_worklog_updates_other_than_time_spent_are_suppressed() {
        let input = event(
            "worklog_updated",
            "",
            vec![change("timeestimate", Some(json!(1)), Some(json!(2)))],
        );
        assert!(classify_jira_event(&input).is_empty());
        assert!(classify_jira_event(&event("worklog_updated", "", vec![])).is_empty());
    }

    #[test]
    fn functional_multi_item_changelog_decomposes_in_order() {
        let input = event(
            "issue_updated",
            "issue_updated",
            vec![
                change("summary", Some(json!("a")), Some(json!("b"))),
                change("priority", Some(json!("1")), Some(json!("2"))),
                change("Attachment", None, Some(json!("9"))),
            ],
        );
        let classified = classify_jira_event(&input);
        assert_eq!(
            classified.iter().map(|entry| entry.variant).collect::<Vec<_>>(),
            vec![
                JiraMessageVariant::Renamed,
                JiraMessageVariant::FieldUpdated,
                JiraMessageVariant::AttachmentCreated,
            ]
        );
        for (entry, item) in classified.iter().zip(input.changelog.items.iter()) {
            assert_eq!(entry.event.changelog.items, vec![item.clone()]);
        }
    }

    #[test]
    fn functional_decomposition_skips_suppressed_items() {
        let input = event(
            "worklog_updated",
            "",
            vec![
                change("timeestimate", Some(json!(1)), Some(json!(2))),
                change("timespent", Some(json!(60)), Some(json!(120))),
            ],
        );
        assert_eq!(variants(&input), vec![JiraMessageVariant::TimeLogged]);
    }

    #[test]
    fn regression_oversized_changelog_resolves_to_single_unknown() {
        let items = (0..=MAX_CHANGELOG_ITEMS)
            .map(|index| change(&format!("field-{index}"), None, None))
            .collect();
        let input = event("issue_updated", "issue_updated", items);
        let classified = classify_jira_event(&input);
        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].variant, JiraMessageVariant::Unknown);
        assert_eq!(classified[0].event, input);
    }

    #[test]
    fn regression_changelog_at_item_cap_still_decomposes() {
        let items = (0..MAX_CHANGELOG_ITEMS)
            .map(|index| change(&format!("field-{index}"), None, Some(json!(index))))
            .collect::<Vec<_>>();
        let input = event("issue_updated", "issue_updated", items);
        let classified = classify_jira_event(&input);
        assert_eq!(classified.len(), MAX_CHANGELOG_ITEMS);
        assert!(classified
            .iter()
            .all(|entry| entry.variant == JiraMessageVariant::FieldUpdated));
        let last = &classified[MAX_CHANGELOG_ITEMS - 1].event.changelog.items;
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].field, format!("field-{}", MAX_CHANGELOG_ITEMS - 1));
    }

    fn arbitrary_change() -> impl Strategy<Value = JiraChangelogItem> {
        (
            prop_oneof![
                Just("summary"),
                Just("Attachment"),
                Just("priority"),
                Just("timespent"),
                Just("assignee"),
            ],
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(field, from, to)| {
                change(
                    field,
                    from.then(|| json!("old")),
                    to.then(|| json!("new")),
                )
            })
    }

    fn arbitrary_event() -> impl Strategy<Value = JiraWebhookEvent> {
        (
            prop_oneof![
                Just("jira:issue_updated"),
                Just("issue_created"),
                Just("jira:worklog_updated"),
                Just("board_configuration_changed"),
            ],
            prop_oneof![
                Just("issue_updated"),
                Just("issue_assigned"),
                Just("issue_generic"),
                Just("issue_commented"),
                Just(""),
            ],
            prop::collection::vec(arbitrary_change(), 0..8),
        )
            .prop_map(|(webhook, type_name, items)| event(webhook, type_name, items))
    }

    proptest! {
        #[test]
        fn reclassifying_a_single_item_event_is_stable(input in arbitrary_event()) {
            for classified in classify_jira_event(&input) {
                prop_assert!(classified.event.change_count() <= 1);
                let again = classify_jira_event(&classified.event);
                prop_assert_eq!(again.len(), 1);
                prop_assert_eq!(again[0].variant, classified.variant);
            }
        }

        #[test]
        fn decomposition_never_yields_more_entries_than_items(input in arbitrary_event()) {
            let classified = classify_jira_event(&input);
            prop_assert!(classified.len() <= input.change_count().max(1));
        }
    }
}
