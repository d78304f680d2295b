#![no_main]

use herald_jira::{
    classify_jira_event, compose_jira_message, parse_jira_webhook_event, MAX_CHANGELOG_ITEMS,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Ok(event) = parse_jira_webhook_event(&raw) else {
        return;
    };

    let classified = classify_jira_event(&event);
    assert!(classified.len() <= event.change_count().clamp(1, MAX_CHANGELOG_ITEMS));
    for entry in &classified {
        assert!(entry.event.change_count() <= 1 || classified.len() == 1);
    }

    let text = compose_jira_message(&event);
    if classified.is_empty() {
        assert!(text.is_empty());
    }
});
