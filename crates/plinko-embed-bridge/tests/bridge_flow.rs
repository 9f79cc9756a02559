//! Full widget session lifecycle over the in-memory host

use std::cell::RefCell;
use std::rc::Rc;

use plinko_embed_bridge::{EmbedBridge, EmbedHandlers, FrameNesting, MemoryHost};
use plinko_embed_core::MessageEvent;
use serde_json::{Value, json};

fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test_log::test]
fn widget_session_lifecycle() {
    let host = MemoryHost::new()
        .with_nesting(FrameNesting::Embedded)
        .with_pathname("/games/plinko");
    host.set_now_ms(1_722_000_000_000);

    let mut bridge = EmbedBridge::new(host.clone());
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(vec![]));
    let (inits, balances, configs, resets) = (
        Rc::clone(&log),
        Rc::clone(&log),
        Rc::clone(&log),
        Rc::clone(&log),
    );

    assert!(bridge.setup(EmbedHandlers {
        on_init: Some(Box::new(move |payload, origin| {
            inits
                .borrow_mut()
                .push(format!("init balance={:?} from {origin}", payload.balance));
        })),
        on_balance: Some(Box::new(move |payload| {
            balances
                .borrow_mut()
                .push(format!("balance {:?}", payload.balance));
        })),
        on_config: Some(Box::new(move |payload| {
            configs.borrow_mut().push(format!(
                "config bet={:?} rows={:?} risk={:?}",
                payload.bet_amount, payload.row_count, payload.risk_level
            ));
        })),
        on_reset: Some(Box::new(move || {
            resets.borrow_mut().push("reset".into());
        })),
    }));

    // Attaching announces readiness exactly once, to the wildcard origin.
    assert_eq!(
        host.posted()
            .iter()
            .map(|posted| (posted.data.clone(), posted.target_origin.clone()))
            .collect::<Vec<_>>(),
        vec![(
            json!({
                "type": "plinko:ready",
                "payload": {"timestamp": 1_722_000_000_000u64, "pathname": "/games/plinko"}
            }),
            "*".to_string()
        )]
    );
    host.clear_posted();

    // The host page initializes the session.
    bridge.handle_message(&MessageEvent::new(
        json!({
            "type": "plinko:init",
            "payload": {
                "balance": 1000.0,
                "betAmount": 1.0,
                "rowCount": 16,
                "riskLevel": "medium",
                "sessionId": "s1",
                "userId": "u1"
            }
        }),
        "https://casino.example",
    ));
    assert_eq!(bridge.target_origin(), "https://casino.example");
    assert_eq!(bridge.context().session_id.as_deref(), Some("s1"));

    // Game logic reports a round back, tagged with the session context.
    bridge.emit_with_context(
        "plinko:round-result",
        Some(object(json!({"payout": 12.5, "slot": 3}))),
    );
    let posted = host.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].target_origin, "https://casino.example");
    assert_eq!(
        posted[0].data,
        json!({
            "type": "plinko:round-result",
            "payload": {"payout": 12.5, "slot": 3, "sessionId": "s1", "userId": "u1"}
        })
    );
    host.clear_posted();

    // Balance, config and reset all flow through to the handlers.
    bridge.handle_message(&MessageEvent::new(
        json!({"type": "plinko:set-balance", "payload": {"balance": 987.5}}),
        "https://casino.example",
    ));
    bridge.handle_message(&MessageEvent::new(
        json!({"type": "plinko:config", "payload": {"betAmount": 2.0, "rowCount": 8, "riskLevel": "high"}}),
        "https://casino.example",
    ));
    bridge.handle_message(&MessageEvent::new(
        json!({"type": "plinko:reset"}),
        "https://casino.example",
    ));

    // A fresh init replaces the context wholesale; userId is gone.
    bridge.handle_message(&MessageEvent::new(
        json!({"type": "plinko:init", "payload": {"sessionId": "s2"}}),
        "https://casino.example",
    ));
    assert_eq!(bridge.context().session_id.as_deref(), Some("s2"));
    assert_eq!(bridge.context().user_id, None);
    host.clear_posted();

    bridge.emit_with_context("plinko:round-result", Some(object(json!({"payout": 0.2}))));
    assert_eq!(
        host.posted()[0].data,
        json!({
            "type": "plinko:round-result",
            "payload": {"payout": 0.2, "sessionId": "s2"}
        })
    );
    host.clear_posted();

    // Teardown stops dispatch; emission stays possible but handlers are done.
    bridge.teardown();
    bridge.handle_message(&MessageEvent::new(json!({"type": "plinko:reset"}), ""));

    assert_eq!(
        *log.borrow(),
        vec![
            "init balance=Some(1000.0) from https://casino.example",
            "balance Some(987.5)",
            "config bet=Some(2.0) rows=Some(8) risk=Some(\"high\")",
            "reset",
            "init balance=None from https://casino.example",
        ]
    );
}

#[test_log::test]
fn forced_embed_mode_via_query_parameter() {
    // Top-level frame, but the host forces embed mode with ?embed=1.
    let host = MemoryHost::new()
        .with_search("?embed=1&theme=dark")
        .with_pathname("/plinko");

    let mut bridge = EmbedBridge::new(host.clone());
    assert!(bridge.setup(EmbedHandlers::default()));

    let posted = host.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].data["type"], json!("plinko:ready"));
    assert_eq!(posted[0].data["payload"]["pathname"], json!("/plinko"));
}
