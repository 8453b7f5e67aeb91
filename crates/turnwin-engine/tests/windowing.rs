//! Sliding-window behaviour, end to end
//!
//! Transcripts are generated as HTML, parsed, and driven through the
//! optimizer and its JSON control surface.

use turnwin_dom::{Document, NodeId};
use turnwin_engine::classifier::Role;
use turnwin_engine::{
    ControlRequest, ControlResponse, ManualClock, MemoryStore, MessageClassifier, Optimizer,
    PlatformRegistry, SettingsPatch, VisibilityEngine, EMPTY_HIDDEN_CLASS, HIDDEN_CLASS,
    PROTECTED_ATTR,
};

fn transcript(n: usize) -> Document {
    let turns: String = (0..n)
        .map(|i| format!(r#"<div class="chat-message">Message body number {i}</div>"#))
        .collect();
    let html = format!(
        r#"<html><body><main><div class="chat-container">{turns}</div></main>
        <form class="compose-area"><textarea></textarea></form></body></html>"#
    );
    turnwin_html::parse_document(&html, "https://grok.com/chat/1").unwrap()
}

fn messages(doc: &Document) -> Vec<NodeId> {
    doc.elements()
        .filter(|n| doc.has_class(*n, "chat-message"))
        .collect()
}

fn start(doc: &mut Document, max: i64, show_more: i64) -> (Optimizer, ManualClock) {
    let clock = ManualClock::new();
    let patch = SettingsPatch {
        max_messages: Some(max),
        show_more_count: Some(show_more),
        ..Default::default()
    };
    let optimizer = Optimizer::start(doc, Box::new(MemoryStore::new(patch)), Box::new(clock.clone()))
        .unwrap();
    (optimizer, clock)
}

fn request(opt: &mut Optimizer, doc: &mut Document, json: &str) -> serde_json::Value {
    let req: ControlRequest = serde_json::from_str(json).unwrap();
    let response = opt.handle(doc, &req);
    serde_json::from_str(&response.to_json().unwrap()).unwrap()
}

#[test]
fn test_hides_exactly_the_oldest_overflow() {
    for (n, max) in [(0, 10), (3, 10), (10, 10), (11, 10), (15, 10), (40, 7), (5, 1)] {
        let mut doc = transcript(n);
        let all = messages(&doc);
        let (mut opt, _) = start(&mut doc, max, 5);
        let expected = n.saturating_sub(max as usize);

        assert_eq!(opt.reconcile(&mut doc), expected, "n={n} max={max}");
        assert_eq!(VisibilityEngine::hidden_elements(&doc), all[..expected].to_vec());

        // A second pass changes nothing
        assert_eq!(opt.reconcile(&mut doc), expected);
        assert_eq!(VisibilityEngine::hidden_elements(&doc), all[..expected].to_vec());
    }
}

#[test]
fn test_fifteen_messages_then_show_more() {
    let mut doc = transcript(15);
    let all = messages(&doc);
    let (mut opt, clock) = start(&mut doc, 10, 5);

    clock.set(1000);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_elements(&doc), all[..5].to_vec());

    let stats = request(&mut opt, &mut doc, r#"{"action":"getStats"}"#);
    assert_eq!(
        stats,
        serde_json::json!({"total": 15, "hidden": 5, "visible": 10, "platform": "Grok (X AI)"})
    );

    let shown = request(&mut opt, &mut doc, r#"{"action":"showMore"}"#);
    assert_eq!(shown, serde_json::json!({"success": true, "hidden": 0}));
    assert_eq!(VisibilityEngine::hidden_count(&doc), 0);
}

#[test]
fn test_reveal_more_works_from_the_boundary() {
    let mut doc = transcript(30);
    let all = messages(&doc);
    let (mut opt, _) = start(&mut doc, 10, 8);
    assert_eq!(opt.reconcile(&mut doc), 20);

    assert_eq!(opt.show_more(&mut doc), 12);
    assert_eq!(VisibilityEngine::hidden_elements(&doc), all[..12].to_vec());
    assert_eq!(opt.indicator().label(), "Show More (12)");

    assert_eq!(opt.show_more(&mut doc), 4);
    assert_eq!(opt.show_more(&mut doc), 0);
    assert!(!opt.indicator().is_visible());
}

#[test]
fn test_lowering_the_cap() {
    let mut doc = transcript(10);
    let all = messages(&doc);
    let (mut opt, _) = start(&mut doc, 10, 5);
    assert_eq!(opt.reconcile(&mut doc), 0);

    let ack = request(
        &mut opt,
        &mut doc,
        r#"{"action":"updateSettings","settings":{"maxMessages":3}}"#,
    );
    assert_eq!(ack, serde_json::json!({"success": true}));
    assert_eq!(VisibilityEngine::hidden_elements(&doc), all[..7].to_vec());
}

#[test]
fn test_reveal_all_leaves_no_markers() {
    let mut doc = transcript(12);
    let all = messages(&doc);
    doc.set_text(all[0], "ok");
    let (mut opt, _) = start(&mut doc, 2, 5);
    opt.reconcile(&mut doc);
    assert!(doc.has_class(all[0], EMPTY_HIDDEN_CLASS));

    VisibilityEngine::reveal_all(&mut doc);
    VisibilityEngine::reveal_all(&mut doc);
    assert!(doc
        .elements()
        .all(|n| !doc.has_class(n, HIDDEN_CLASS) && !doc.has_class(n, EMPTY_HIDDEN_CLASS)));
}

#[test]
fn test_protection_round_trip() {
    let mut doc = transcript(12);
    let all = messages(&doc);
    let (mut opt, clock) = start(&mut doc, 10, 5);
    let detailed = request(&mut opt, &mut doc, r#"{"action":"getDetailedStats"}"#);
    let target = detailed["messages"][0]["messageId"].as_str().unwrap().to_string();

    let scroll = request(
        &mut opt,
        &mut doc,
        &format!(r#"{{"action":"scrollToMessage","messageId":"{target}"}}"#),
    );
    assert_eq!(scroll["found"], true);

    clock.set(1000);
    opt.tick(&mut doc);
    assert!(!VisibilityEngine::is_hidden(&doc, all[0]));
    assert!(VisibilityEngine::is_hidden(&doc, all[1]));

    clock.set(30_000);
    opt.tick(&mut doc);
    assert!(!doc.has_attribute(all[0], PROTECTED_ATTR));
    assert_eq!(opt.reconcile(&mut doc), 2);
    assert!(VisibilityEngine::is_hidden(&doc, all[0]));
}

#[test]
fn test_parity_without_signals() {
    let mut doc = transcript(4);
    let all = messages(&doc);
    let registry = PlatformRegistry::builtin();
    let platform = registry.detect("grok.com").unwrap();
    let mut classifier = MessageClassifier::new();
    let roles: Vec<_> = all
        .iter()
        .enumerate()
        .map(|(i, m)| classifier.classify(&mut doc, *m, i, platform).unwrap().role)
        .collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
}

#[test]
fn test_detailed_stats_shape() {
    let mut doc = transcript(4);
    let (mut opt, _) = start(&mut doc, 10, 5);
    let stats = request(&mut opt, &mut doc, r#"{"action":"getDetailedStats"}"#);
    assert_eq!(stats["totalUser"], 2);
    assert_eq!(stats["totalAi"], 2);
    assert_eq!(stats["totalAll"], 4);
    assert_eq!(stats["platform"], "Grok (X AI)");
    assert_eq!(stats["messages"][1]["index"], 2);
    assert_eq!(stats["messages"][1]["sender"], "Grok");
    assert_eq!(stats["messages"][0]["sender"], "You");
    assert_eq!(stats["messages"][0]["content"], "Message body number 0");
}

#[test]
fn test_page_loaded_is_idempotent() {
    let mut doc = transcript(3);
    let (mut opt, _) = start(&mut doc, 10, 5);
    for _ in 0..3 {
        let ack = opt.handle(&mut doc, &ControlRequest::PageLoaded);
        assert_eq!(ack, ControlResponse::ack(true));
    }
    assert_eq!(doc.observer_count(), 1);
}

#[test]
fn test_streaming_burst_reconciles_once_settled() {
    let mut doc = transcript(10);
    let (mut opt, clock) = start(&mut doc, 10, 5);
    clock.set(1000);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_count(&doc), 0);

    let container = doc.parent(messages(&doc)[0]).unwrap();
    for step in 0..4u64 {
        let turn = doc.create_element("div");
        doc.set_attribute(turn, "class", "chat-message");
        doc.set_text(turn, "streamed chunk");
        doc.append_child(container, turn).unwrap();
        clock.set(1000 + step * 200);
        opt.tick(&mut doc);
        assert_eq!(VisibilityEngine::hidden_count(&doc), 0);
    }

    clock.set(1600 + 500);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_count(&doc), 4);
}

#[test]
fn test_navigation_rewatches_new_container() {
    let mut doc = transcript(12);
    let (mut opt, clock) = start(&mut doc, 10, 5);
    clock.set(1000);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_count(&doc), 2);

    // SPA navigation: new conversation replaces the old one
    let main = doc.main().unwrap();
    let old = doc.element_children(main).next().unwrap();
    doc.remove(old);
    let fresh = doc.create_element("div");
    doc.set_attribute(fresh, "class", "chat-container");
    doc.append_child(main, fresh).unwrap();
    doc.set_url("https://grok.com/chat/2");

    clock.set(2000);
    opt.tick(&mut doc);
    clock.set(3000);
    opt.tick(&mut doc);
    assert_eq!(opt.platform().display_name, "Grok (X AI)");

    for i in 0..11 {
        let turn = doc.create_element("div");
        doc.set_attribute(turn, "class", "chat-message");
        doc.set_text(turn, &format!("new conversation {i}"));
        doc.append_child(fresh, turn).unwrap();
    }
    clock.set(3100);
    opt.tick(&mut doc);
    clock.set(3600);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_count(&doc), 1);
}

#[test]
fn test_navigation_to_another_platform_restarts() {
    let mut doc = transcript(12);
    let (mut opt, clock) = start(&mut doc, 10, 5);
    clock.set(1000);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_count(&doc), 2);

    doc.set_url("https://claude.ai/new");
    clock.set(2000);
    opt.tick(&mut doc);
    clock.set(3000);
    opt.tick(&mut doc);
    assert_eq!(opt.platform().display_name, "Claude");
    // Teardown revealed the Grok transcript; nothing on the page is a Claude turn
    assert_eq!(VisibilityEngine::hidden_count(&doc), 0);
    assert!(opt.is_running());

    clock.set(4000);
    opt.tick(&mut doc);
    assert_eq!(VisibilityEngine::hidden_count(&doc), 0);
}
