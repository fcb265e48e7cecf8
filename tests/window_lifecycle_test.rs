/*!
 * Window Lifecycle Integration Tests
 * Focus discipline, close semantics and dialog modality from the outside
 */

use parking_lot::RwLock;
use serde_json::json;
use std::sync::Arc;
use webdesk::core::types::Viewport;
use webdesk::events::EventOutcome;
use webdesk::wm::{
    Capabilities, DialogAction, DialogResult, DialogWindow, Dimension, WindowAttrs, WindowManager,
};

fn wm() -> Arc<WindowManager> {
    Arc::new(WindowManager::new(Viewport {
        width: 1920,
        height: 1080,
    }))
}

#[test]
fn test_focus_chain_over_many_windows() {
    let wm = wm();
    let wids: Vec<_> = (0..5)
        .map(|i| {
            wm.create_window(WindowAttrs::new(format!("App{i}"), format!("App {i}")))
                .unwrap()
        })
        .collect();

    // The last created window holds focus; everything else is blurred
    assert_eq!(wm.focused_wid(), Some(wids[4]));

    wm.focus(wids[1]).unwrap();
    assert_eq!(wm.focused_wid(), Some(wids[1]));
    assert_eq!(wm.z_order().last(), Some(&wids[1]));

    let focused_count = wm
        .live_windows()
        .iter()
        .filter(|w| w.read().is_focused())
        .count();
    assert_eq!(focused_count, 1);
}

#[test]
fn test_close_events_fire_once_across_paths() {
    let wm = wm();
    let trace = Arc::new(RwLock::new(Vec::new()));

    let a = wm.create_window(WindowAttrs::new("A", "A")).unwrap();
    let b = wm.create_window(WindowAttrs::new("B", "B")).unwrap();

    let sink = Arc::clone(&trace);
    wm.events()
        .on("window:destroy", move |args| {
            sink.write().push(args[0].as_u64().unwrap() as u32);
            Ok(EventOutcome::Pass)
        })
        .unwrap();

    wm.close_window(a, false).unwrap();
    wm.close_window(b, true).unwrap();

    assert_eq!(*trace.read(), vec![a, b]);
    assert!(wm.is_empty());
}

#[test]
fn test_liveness_guard_outlives_window() {
    let wm = wm();
    let wid = wm.create_window(WindowAttrs::new("A", "A")).unwrap();
    let guard = wm.get(wid).unwrap().read().guard();

    assert!(guard.is_alive());
    wm.close_window(wid, false).unwrap();

    // A late backend completion consults the guard and bails out
    assert!(!guard.is_alive());
}

#[test]
fn test_dialog_modality_contract() {
    let wm = wm();
    wm.create_window(WindowAttrs::new("Parent", "Parent")).unwrap();

    let results = Arc::new(RwLock::new(Vec::<DialogResult>::new()));
    let sink = Arc::clone(&results);
    let dialog = DialogWindow::open(
        Arc::clone(&wm),
        "SaveDialog",
        "Save changes?",
        Dimension {
            width: 400,
            height: 200,
        },
        Box::new(move |result| sink.write().push(result)),
    )
    .unwrap();

    // Dialogs take focus but stay out of the window list
    assert_eq!(wm.focused_wid(), Some(dialog.wid()));
    assert_eq!(wm.window_list().len(), 1);

    let window = wm.get(dialog.wid()).unwrap();
    assert_eq!(window.read().capabilities(), Capabilities::dialog());
    assert!(!window.write().set_minimized(true));

    dialog.button(DialogAction::Yes, Some(json!({"path": "home://draft.md"})));
    assert_eq!(results.read().len(), 1);
    assert_eq!(results.read()[0].action, DialogAction::Yes);

    // Focus falls back to the parent
    assert_eq!(wm.window_list().len(), 1);
    assert!(wm.focused_wid().is_some());
}

#[test]
fn test_dialog_escape_and_forced_teardown() {
    let wm = wm();
    let results = Arc::new(RwLock::new(Vec::<DialogResult>::new()));

    let sink = Arc::clone(&results);
    let first = DialogWindow::open(
        Arc::clone(&wm),
        "First",
        "First",
        Dimension::default(),
        Box::new(move |result| sink.write().push(result)),
    )
    .unwrap();
    first.key("Escape");

    let sink = Arc::clone(&results);
    let second = DialogWindow::open(
        Arc::clone(&wm),
        "Second",
        "Second",
        Dimension::default(),
        Box::new(move |result| sink.write().push(result)),
    )
    .unwrap();
    second.set_close_guard(Box::new(|| false));
    assert!(!second.close());
    second.force_close();

    let results = results.read();
    assert_eq!(results[0].action, DialogAction::Cancel);
    assert_eq!(results[1].action, DialogAction::Close);
    assert!(results.iter().all(|r| r.value.is_none()));
}
