//! Integration Tests for the AIO Widgets
//!
//! These tests mount the demo layout (two text filters, each reset by its own
//! button elsewhere in the page) and check the dispatch behavior end to end.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use serde_json::json;

use lattice_aio::error::{CallbackError, ConfigError, LayoutError};
use lattice_aio::ident::{IdScheme, Identifier, InstanceId, PropRef, Wildcard};
use lattice_aio::reactive::{Invocation, Resolved, Update};
use lattice_aio::render::Element;
use lattice_aio::widgets::ids::{BUTTON, INPUT, STORE};
use lattice_aio::widgets::{TextFilter, Toggle, Widget, WidgetType};
use lattice_aio::demo::DemoPage;
use lattice_aio::{App, AppConfig, DispatchError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The demo page, mounted: filter 1, reset 1, filter 2, reset 2.
struct Page {
    app: App,
    filters: [TextFilter; 2],
    resets: [Toggle; 2],
}

fn page() -> Page {
    init_tracing();
    let app = App::with_default_widgets(AppConfig::default()).unwrap();
    let demo = DemoPage::new().unwrap();
    demo.mount(&app).unwrap();
    let DemoPage { filters, resets } = demo;

    Page {
        app,
        filters,
        resets,
    }
}

fn value_of(input: &Identifier) -> PropRef {
    PropRef::new(input.clone(), "value")
}

fn type_into(app: &App, input: &Identifier, text: &str) {
    app.fire(lattice_aio::TriggerEvent::new(input.clone(), "value", text))
        .unwrap();
}

/// Reset updates in candidate order, as emitted by one click.
fn reset_updates(batch: &lattice_aio::RenderBatch) -> Vec<Update> {
    batch
        .for_rule("text-filter-reset")
        .map(|emission| emission.update.clone())
        .collect()
}

/// Clicking a reset button clears only the filter correlated with it.
#[test]
fn reset_clears_only_its_filter() {
    let page = page();
    let [f1, f2] = &page.filters;
    type_into(&page.app, &f1.input_id(), "abc");
    type_into(&page.app, &f2.input_id(), "xyz");

    let batch = page.app.click(&page.resets[0].id()).unwrap();

    assert_eq!(
        reset_updates(&batch),
        vec![Update::Set(json!("")), Update::NoUpdate]
    );
    assert_eq!(page.app.prop(&f1.input_id(), "value"), Some(json!("")));
    assert_eq!(page.app.prop(&f2.input_id(), "value"), Some(json!("xyz")));
}

/// Updates follow candidate order even when the second candidate fires.
#[test]
fn reset_preserves_candidate_order() {
    let page = page();
    let [f1, f2] = &page.filters;
    type_into(&page.app, &f1.input_id(), "abc");
    type_into(&page.app, &f2.input_id(), "xyz");

    let batch = page.app.click(&page.resets[1].id()).unwrap();

    assert_eq!(
        reset_updates(&batch),
        vec![Update::NoUpdate, Update::Set(json!(""))]
    );
    let targets: Vec<&PropRef> = batch
        .for_rule("text-filter-reset")
        .map(|emission| &emission.target)
        .collect();
    assert_eq!(targets, vec![&value_of(&f1.input_id()), &value_of(&f2.input_id())]);
    assert_eq!(page.app.prop(&f1.input_id(), "value"), Some(json!("abc")));
}

/// A click on an uncorrelated button (a filter's own apply button) changes
/// no input, however often it happens.
#[test]
fn apply_clicks_never_reset() {
    let page = page();
    let [f1, f2] = &page.filters;
    type_into(&page.app, &f1.input_id(), "abc");
    type_into(&page.app, &f2.input_id(), "xyz");

    for _ in 0..3 {
        let batch = page.app.click(&f1.apply_button().id()).unwrap();
        assert_eq!(reset_updates(&batch), vec![Update::NoUpdate, Update::NoUpdate]);
    }
    assert_eq!(page.app.prop(&f1.input_id(), "value"), Some(json!("abc")));
    assert_eq!(page.app.prop(&f2.input_id(), "value"), Some(json!("xyz")));
}

/// The reset rule aborts without emitting anything when nothing triggered it.
#[test]
fn reset_without_trigger_is_prevented() {
    let rules = TextFilter::rules(&AppConfig::default()).unwrap();
    let invocation = Invocation::new(
        "text-filter-reset",
        Vec::new(),
        vec![vec![]],
        vec![vec![Resolved::correlation(STORE.id("f1"), Some(BUTTON.id("r")))]],
        vec![vec![value_of(&INPUT.id("f1"))]],
    );
    assert_eq!(rules[0].call(&invocation), Err(CallbackError::PreventUpdate));

    // The initial call made on mount hits the same path.
    let app = App::with_default_widgets(AppConfig::default()).unwrap();
    let filter = TextFilter::builder()
        .reset_source(BUTTON.id("r"))
        .build()
        .unwrap();
    let report = app.mount_widget(&filter).unwrap();
    assert_eq!(report.batch.for_rule("text-filter-reset").count(), 0);
    assert!(report.batch.failures().is_empty());
}

/// Toggle backgrounds follow click parity, starting from one click.
#[test]
fn toggle_background_follows_parity() {
    init_tracing();
    let app = App::with_default_widgets(AppConfig::default()).unwrap();
    let toggle = Toggle::new("Toggle");
    let style = PropRef::new(toggle.id(), "style");

    let report = app.mount_widget(&toggle).unwrap();
    assert_eq!(
        report.batch.update_for(&style),
        Some(&Update::Set(json!({ "background": "#aa5555" })))
    );

    let expected = [(2, "#55aa55"), (3, "#aa5555"), (4, "#55aa55"), (5, "#aa5555")];
    for (n_clicks, background) in expected {
        let batch = app.click(&toggle.id()).unwrap();
        assert_eq!(app.prop(&toggle.id(), "n_clicks"), Some(json!(n_clicks)));
        assert_eq!(
            batch.update_for(&style),
            Some(&Update::Set(json!({ "background": background })))
        );
    }
}

/// A toggle click restyles the clicked toggle only.
#[test]
fn toggle_styles_are_per_instance() {
    let page = page();
    let batch = page.app.click(&page.resets[0].id()).unwrap();

    let styled: Vec<&Identifier> = batch
        .for_rule("toggle-parity")
        .map(|emission| &emission.target.id)
        .collect();
    assert_eq!(styled, vec![&page.resets[0].id()]);
    assert_eq!(
        page.app.prop(&page.resets[1].id(), "style"),
        Some(json!({ "background": "#aa5555" }))
    );
}

/// Unmounted filters stop being candidates and lose their store entry.
#[test]
fn unmounted_filters_are_excluded() {
    init_tracing();
    let app = App::with_default_widgets(AppConfig::default()).unwrap();
    let reset = Toggle::new("Reset");
    let keep = TextFilter::builder().reset_source(reset.id()).build().unwrap();
    let drop = TextFilter::builder().reset_source(reset.id()).build().unwrap();

    app.mount_widget(&keep).unwrap();
    let dropped = app.mount_widget(&drop).unwrap();
    app.mount_widget(&reset).unwrap();
    assert_eq!(app.store().dependents_of(&reset.id()).len(), 2);

    let removed = app.unmount(dropped.mount).unwrap();
    assert!(removed.contains(&drop.input_id()));
    assert!(!app.store().contains(&drop.store_id()));

    let batch = app.click(&reset.id()).unwrap();
    assert_eq!(reset_updates(&batch), vec![Update::Set(json!(""))]);
    assert!(batch.update_for(&value_of(&drop.input_id())).is_none());
}

/// Two filters reset by the same button are both cleared.
#[test]
fn shared_reset_source_clears_every_dependent() {
    init_tracing();
    let app = App::with_default_widgets(AppConfig::default()).unwrap();
    let reset = Toggle::new("Reset all");
    let filters: Vec<TextFilter> = (0..3)
        .map(|_| TextFilter::builder().reset_source(reset.id()).build().unwrap())
        .collect();
    for filter in &filters {
        app.mount_widget(filter).unwrap();
        type_into(&app, &filter.input_id(), "text");
    }
    app.mount_widget(&reset).unwrap();

    let batch = app.click(&reset.id()).unwrap();
    assert_eq!(reset_updates(&batch), vec![Update::Set(json!("")); 3]);
}

/// Mounting a second filter under a live instance token changes nothing.
#[test]
fn duplicate_instances_are_rejected() {
    let page = page();
    let clash = TextFilter::builder()
        .instance(page.filters[0].instance().clone())
        .reset_source(page.resets[1].id())
        .build()
        .unwrap();

    let before = page.app.live_ids();
    let err = page.app.mount_widget(&clash).unwrap_err();
    assert!(matches!(err, DispatchError::Layout(LayoutError::DuplicateId { .. })));
    assert_eq!(page.app.live_ids(), before);
    assert_eq!(page.app.store().get(&clash.store_id()).unwrap(), page.resets[0].id());
}

/// A filter must name the button that resets it.
#[test]
fn text_filter_without_reset_source_is_a_config_error() {
    let err = TextFilter::builder().build().unwrap_err();
    assert!(matches!(err, ConfigError::MissingResetSource { .. }));
}

/// Identifiers print canonically, so the demo's ids survive a text round trip.
#[test]
fn identifiers_parse_back_from_display() {
    let page = page();
    for id in page.app.live_ids() {
        assert_eq!(id.to_string().parse::<Identifier>().unwrap(), id);
    }
    let prop: PropRef = value_of(&page.filters[0].input_id()).to_string().parse().unwrap();
    assert_eq!(prop, value_of(&INPUT.id(page.filters[0].instance().clone())));
}

/// Rules see the app's configuration; unset palette entries keep defaults.
#[test]
fn app_reports_its_configuration() {
    let config = AppConfig::from_json_str(r#"{"toggle": {"odd_background": "red"}}"#).unwrap();
    let app = App::with_default_widgets(config).unwrap();
    let toggle = Toggle::new("t");
    let report = app.mount_widget(&toggle).unwrap();
    assert_eq!(
        report.batch.update_for(&PropRef::new(toggle.id(), "style")),
        Some(&Update::Set(json!({ "background": "red" })))
    );
    assert_eq!(app.config().toggle.even_background, "#55aa55");
    assert_eq!(app.registry().len(), 2);
}

/// Mounting elements under a new component tag works without any rules.
#[test]
fn foreign_elements_mount_without_rules() {
    let app = App::with_default_widgets(AppConfig::default()).unwrap();
    let label = IdScheme::new("Label", "text");
    let report = app
        .mount(Element::container([
            Element::text_input(label.id("a")),
            Element::text_input(label.id("b")),
        ]))
        .unwrap();
    assert_eq!(report.ids.len(), 2);
    assert!(report.batch.is_empty());
}

proptest! {
    /// Distinct tokens give distinct identifiers under the same scheme, and
    /// every one of them matches the scheme's ALL pattern.
    #[test]
    fn distinct_tokens_give_distinct_ids(a in "[a-z0-9_]{1,12}", b in "[a-z0-9_]{1,12}") {
        let id_a = INPUT.id(InstanceId::from(a.clone()));
        let id_b = INPUT.id(InstanceId::from(b.clone()));
        prop_assert_eq!(a == b, id_a == id_b);
        prop_assert!(INPUT.pattern(Wildcard::All).matches(&id_a).is_some());
        prop_assert!(STORE.pattern(Wildcard::All).matches(&id_a).is_none());
    }

    /// Any number of filters can share a layout; each reset clears exactly
    /// its own filter.
    #[test]
    fn each_reset_targets_its_filter(count in 1usize..6, pick in 0usize..6) {
        let pick = pick % count;
        let app = App::with_default_widgets(AppConfig::default()).unwrap();
        let resets: Vec<Toggle> = (0..count).map(|i| Toggle::new(format!("Reset {i}"))).collect();
        let filters: Vec<TextFilter> = resets
            .iter()
            .map(|reset| TextFilter::builder().reset_source(reset.id()).build().unwrap())
            .collect();
        for (filter, reset) in filters.iter().zip(&resets) {
            app.mount_widget(filter).unwrap();
            app.mount_widget(reset).unwrap();
        }

        let batch = app.click(&resets[pick].id()).unwrap();
        let updates = reset_updates(&batch);
        prop_assert_eq!(updates.len(), count);
        for (i, update) in updates.iter().enumerate() {
            prop_assert_eq!(update.is_no_update(), i != pick);
        }
    }
}

/// Clicks from many threads are serialized; none is lost.
#[test]
fn concurrent_clicks_are_all_counted() {
    init_tracing();
    let app = Arc::new(App::with_default_widgets(AppConfig::default()).unwrap());
    let toggle = Toggle::new("Shared");
    app.mount_widget(&toggle).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = Arc::clone(&app);
            let id = toggle.id();
            thread::spawn(move || {
                for _ in 0..100 {
                    app.click(&id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(app.prop(&toggle.id(), "n_clicks"), Some(json!(801)));
    assert_eq!(
        app.prop(&toggle.id(), "style"),
        Some(json!({ "background": "#aa5555" }))
    );
}
