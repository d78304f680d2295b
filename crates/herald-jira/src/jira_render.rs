//! Message rendering for classified Jira events.
//!
//! Output is Telegram HTML: issue anchors, `<b>` emphasis and combining-stroke
//! strike-through for superseded values. Rendering never fails; events that
//! do not fit a template render as a structural dump.

use crate::jira_classify::{classify_jira_event, ClassifiedJiraEvent, JiraMessageVariant};
use crate::jira_event::{JiraAttachment, JiraChangelogItem, JiraWebhookEvent};
use crate::jira_markup::{anchor, escape_html, issue_link, issue_url, strike, with_comment};

const JIRA_MESSAGE_SEPARATOR: &str = "\n\n";

/// Classifies and renders `event` into the text handed to delivery.
///
/// Empty output means every part of the event was suppressed.
pub fn compose_jira_message(event: &JiraWebhookEvent) -> String {
    render_jira_sequence(&classify_jira_event(event))
}

/// Renders each classified entry and joins them with a blank line.
pub fn render_jira_sequence(classified: &[ClassifiedJiraEvent]) -> String {
    classified
        .iter()
        .map(|entry| render_jira_message(entry.variant, &entry.event))
        .collect::<Vec<_>>()
        .join(JIRA_MESSAGE_SEPARATOR)
}

pub fn render_jira_message(variant: JiraMessageVariant, event: &JiraWebhookEvent) -> String {
    let no_change = JiraChangelogItem::default();
    let change = event.first_change().unwrap_or(&no_change);
    let user = event.user.display_name.as_str();

    match variant {
        JiraMessageVariant::Created => {
            with_comment(format!("{user} created {}", issue_link(event)), event)
        }
        JiraMessageVariant::Deleted => {
            with_comment(format!("{user} deleted {}", issue_link(event)), event)
        }
        JiraMessageVariant::Renamed => {
            let url = issue_url(event);
            with_comment(
                format!(
                    "{user} renamed {} to {}",
                    anchor(&url, &strike(&change.from_display())),
                    anchor(&url, &change.to_display())
                ),
                event,
            )
        }
        JiraMessageVariant::Commented => format!(
            "{}\n<b>{user}:</b> {}",
            issue_link(event),
            event.comment.body
        ),
        JiraMessageVariant::Assigned => with_comment(
            format!("{} assigned to {}", issue_link(event), change.to_display()),
            event,
        ),
        JiraMessageVariant::Unassigned => with_comment(
            format!(
                "{} unassigned from {}",
                issue_link(event),
                strike(&change.from_display())
            ),
            event,
        ),
        JiraMessageVariant::Reassigned => with_comment(
            format!(
                "{} reassigned from {} to {}",
                issue_link(event),
                strike(&change.from_display()),
                change.to_display()
            ),
            event,
        ),
        JiraMessageVariant::FieldUpdated | JiraMessageVariant::GenericUpdate => with_comment(
            format!(
                "{}. {user} changed <b>{}</b> from \"{}\" to \"{}\"",
                issue_link(event),
                change.field,
                strike(&change.from_display()),
                change.to_display()
            ),
            event,
        ),
        JiraMessageVariant::AttachmentCreated => {
            let text = match find_added_attachment(event, change) {
                Some(attachment) => format!(
                    "{user} attached {}\n<b>Type:</b> {}\n<b>Size:</b> {} bytes",
                    anchor(&attachment.content, &attachment.filename),
                    attachment.mime_type,
                    attachment.size
                ),
                None => format!("{user} changed attachment \"{}\"", change.to_display()),
            };
            with_comment(text, event)
        }
        JiraMessageVariant::AttachmentDeleted => with_comment(
            format!("{user} deleted {}", strike(&change.from_display())),
            event,
        ),
        JiraMessageVariant::TimeLogged => render_time_logged(event, change),
        JiraMessageVariant::Unknown => with_comment(escape_html(&format!("{event:?}")), event),
    }
}

fn render_time_logged(event: &JiraWebhookEvent, change: &JiraChangelogItem) -> String {
    let spent = change
        .to_integer()
        .unwrap_or(0)
        .saturating_sub(change.from_integer().unwrap_or(0));
    let worklog_comment = event
        .issue
        .fields
        .worklog
        .worklogs
        .last()
        .map(|worklog| worklog.comment.as_str())
        .filter(|comment| !comment.is_empty())
        .map(|comment| format!("\n{comment}"))
        .unwrap_or_default();
    format!(
        "{}\n{} contributed <b>{spent}</b> ({} remains){worklog_comment}",
        issue_link(event),
        event.user.display_name,
        event.issue.fields.time_tracking.remaining_estimate
    )
}

// The `to` value indexes the issue's attachment list; Jira also sends the
// attachment id there, so fall back to an id match before giving up.
fn find_added_attachment<'a>(
    event: &'a JiraWebhookEvent,
    change: &JiraChangelogItem,
) -> Option<&'a JiraAttachment> {
    let attachments = &event.issue.fields.attachments;
    let by_index = change
        .to_integer()
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| attachments.get(index));
    by_index.or_else(|| {
        let id = change.to_raw_text()?;
        attachments.iter().find(|attachment| attachment.id == id)
    })
}
