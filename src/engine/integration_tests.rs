// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::backends::stub::{CountingCompiler, StubSource};
use crate::config::{AttributeNames, FragmentOptions};
use crate::dom::{Document, NodeId};
use crate::engine::{ChangeNotification, Engine, MountContext};
use crate::errors::{CompileError, FetchError, LoadError, RenderError};
use crate::store::{Store, Value};
use crate::traits::{FragmentCompiler, FragmentModule, Require};

/// End-to-end tests driving the engine over parsed pages and stub fragments
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine_with(
        page: &str,
        store: Store,
        source: Arc<StubSource>,
    ) -> (Engine, Rc<Cell<usize>>) {
        let (compiler, compiles) = CountingCompiler::with_counter();
        let engine = Engine::new(
            Document::parse(page).unwrap(),
            store,
            source,
            vec![Box::new(compiler)],
            AttributeNames::default(),
            &FragmentOptions::default(),
        );
        (engine, compiles)
    }

    fn engine(page: &str, store: serde_json::Value, source: Arc<StubSource>) -> Engine {
        engine_with(page, Store::from_json(store), source).0
    }

    fn all(engine: &Engine, attribute: &str) -> Vec<NodeId> {
        let document = engine.document();
        document.query_attribute(document.body(), attribute)
    }

    fn first(engine: &Engine, attribute: &str) -> NodeId {
        all(engine, attribute)[0]
    }

    fn text(engine: &Engine, node: NodeId) -> String {
        engine.document().text_content(node)
    }

    /// Renders `<i>{{name}}</i>` and counts every render call.
    struct RenderCounter(Rc<Cell<usize>>);

    impl FragmentModule for RenderCounter {
        fn render(&self, data: &serde_json::Value) -> Result<String, RenderError> {
            self.0.set(self.0.get() + 1);
            Ok(format!("<i>{}</i>", data["name"].as_str().unwrap_or_default()))
        }

        fn styles(&self) -> Result<Option<String>, RenderError> {
            Ok(None)
        }

        fn kind(&self) -> &'static str {
            "render-counter"
        }
    }

    struct RenderCounterCompiler(Rc<Cell<usize>>);

    impl FragmentCompiler for RenderCounterCompiler {
        fn name(&self) -> &'static str {
            "render-counter"
        }

        fn accepts(&self, _bytes: &[u8]) -> bool {
            true
        }

        fn compile(
            &self,
            _identifier: &str,
            _bytes: &[u8],
            _require: Require,
        ) -> Result<Rc<dyn FragmentModule>, CompileError> {
            Ok(Rc::new(RenderCounter(self.0.clone())))
        }
    }

    #[tokio::test]
    async fn test_display_binding_follows_store() {
        let mut engine = engine(
            r#"<span data-bind="counter"></span>"#,
            json!({"counter": 0}),
            Arc::new(StubSource::new()),
        );
        engine.start().await;
        let span = first(&engine, "data-bind");
        assert_eq!(text(&engine, span), "0");

        engine.store().set("counter", Value::from(1)).unwrap();
        engine.notify_changed();
        assert_eq!(text(&engine, span), "1");
    }

    #[tokio::test]
    async fn test_form_control_writes_back_on_change() {
        let mut engine = engine(
            r#"<input data-bind="name"><p data-bind="name"></p>"#,
            json!({"name": "Ada"}),
            Arc::new(StubSource::new()),
        );
        engine.start().await;
        let nodes = all(&engine, "data-bind");
        let (input, paragraph) = (nodes[0], nodes[1]);
        assert_eq!(engine.document().get_property(input, "value").unwrap(), "Ada");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        engine.subscribe(move |n| log.borrow_mut().push(n.clone()));

        engine
            .document_mut()
            .set_property(input, "value", "Grace")
            .unwrap();
        let outcome = engine.dispatch_event(input, "change");
        assert_eq!(outcome.handlers, 1);
        assert!(!outcome.default_prevented);
        assert_eq!(engine.store().get("name").unwrap(), Value::from("Grace"));
        assert_eq!(text(&engine, paragraph), "Grace");
        assert_eq!(
            *seen.borrow(),
            vec![ChangeNotification::new(
                Some(Value::from("Grace")),
                Some("name".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_toggle_fired_twice_restores_value() {
        let mut engine = engine(
            r#"<button data-toggle="menu.open">menu</button>"#,
            json!({"menu": {"open": false}}),
            Arc::new(StubSource::new()),
        );
        engine.start().await;
        let button = first(&engine, "data-toggle");

        engine.dispatch_event(button, "click");
        assert_eq!(engine.store().get("menu.open").unwrap(), Value::from(true));
        engine.dispatch_event(button, "click");
        assert_eq!(engine.store().get("menu.open").unwrap(), Value::from(false));
    }

    #[tokio::test]
    async fn test_action_mutates_store_and_resyncs() {
        let store = Store::from_json(json!({"counter": 0}));
        store
            .set(
                "actions.increment",
                Value::computed(|call| {
                    let current = call
                        .context
                        .get("counter")
                        .ok()
                        .and_then(|v| v.to_json().as_i64())
                        .unwrap_or(0);
                    let _ = call.context.set("counter", Value::from(current + 1));
                    Value::Null
                }),
            )
            .unwrap();
        let (mut engine, _) = engine_with(
            r#"<button data-action="actions.increment">+</button><span data-bind="counter"></span>"#,
            store,
            Arc::new(StubSource::new()),
        );
        engine.start().await;
        let button = first(&engine, "data-action");
        let span = first(&engine, "data-bind");

        let outcome = engine.dispatch_event(button, "click");
        assert!(outcome.default_prevented);
        assert_eq!(outcome.handlers, 1);
        assert_eq!(text(&engine, span), "1");

        // other events do not reach a click action
        assert_eq!(engine.dispatch_event(button, "submit").handlers, 0);
        assert_eq!(text(&engine, span), "1");
    }

    #[tokio::test]
    async fn test_inert_action_publishes_nothing() {
        let mut engine = engine(
            r#"<button data-action="items">x</button>"#,
            json!({"items": ["a"]}),
            Arc::new(StubSource::new()),
        );
        engine.start().await;
        let published = Rc::new(Cell::new(0));
        let counter = published.clone();
        engine.subscribe(move |_| counter.set(counter.get() + 1));

        let outcome = engine.dispatch_event(first(&engine, "data-action"), "click");
        assert_eq!(outcome, Default::default());
        assert_eq!(published.get(), 0);
        assert_eq!(engine.store().to_json(), json!({"items": ["a"]}));
    }

    #[tokio::test]
    async fn test_subscribers_run_in_registration_order() {
        let mut engine = engine("", json!({}), Arc::new(StubSource::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ids = Vec::new();
        for name in ["first", "second"] {
            let seen = seen.clone();
            ids.push(engine.subscribe(move |n| seen.borrow_mut().push((name, n.path.clone()))));
        }

        engine.publish(ChangeNotification::new(None, Some("cart".into())));
        assert!(engine.unsubscribe(ids[0]));
        engine.notify_changed();

        assert_eq!(
            *seen.borrow(),
            vec![
                ("first", Some("cart".to_string())),
                ("second", Some("cart".to_string())),
                ("second", None),
            ]
        );
    }

    #[tokio::test]
    async fn test_fragment_fetched_and_compiled_once_across_mounts() {
        let source = Arc::new(StubSource::new().with("tile.frag", "<p>{{name}}</p>"));
        let (mut engine, compiles) = engine_with(
            r#"<div data-load="tile" data-context='{"name":"a"}'></div>
               <div data-load="tile.frag" data-context='{"name":"b"}'></div>"#,
            Store::new(),
            source.clone(),
        );

        assert_eq!(engine.start().await, 2);
        let mounts = all(&engine, "data-load");
        assert_eq!(engine.document().inner_html(mounts[0]), "<p>a</p>");
        assert_eq!(engine.document().inner_html(mounts[1]), "<p>b</p>");
        assert_eq!(source.fetch_count("tile.frag"), 1);
        assert_eq!(compiles.get(), 1);
        assert_eq!(engine.registry().len(), 2);
    }

    #[tokio::test]
    async fn test_styles_injected_once_per_identifier() {
        let source = Arc::new(
            StubSource::new().with("card.frag", "<style>.card{color:red}</style><p class=\"card\"></p>"),
        );
        let mut engine = engine(
            r#"<div data-load="card"></div><div data-load="card"></div>"#,
            json!({}),
            source,
        );
        engine.start().await;

        let document = engine.document();
        let styles = document.elements_by_tag(document.head(), "style");
        assert_eq!(styles.len(), 1);
        assert_eq!(document.get_attribute(styles[0], "id"), Some("style-card.frag"));
    }

    #[tokio::test]
    async fn test_removed_mount_is_pruned_and_never_rendered_again() {
        let renders = Rc::new(Cell::new(0));
        let mut engine = Engine::new(
            Document::parse(r#"<div data-load="name"></div><div data-load="name"></div>"#)
                .unwrap(),
            Store::from_json(json!({"name": "Ada"})),
            Arc::new(StubSource::new().with("name.frag", "")),
            vec![Box::new(RenderCounterCompiler(renders.clone()))],
            AttributeNames::default(),
            &FragmentOptions::default(),
        );
        engine.start().await;
        assert_eq!(renders.get(), 2);
        let mounts = all(&engine, "data-load");

        engine.document_mut().remove(mounts[0]).unwrap();
        engine.store().set("name", Value::from("Grace")).unwrap();
        engine.notify_changed();

        assert_eq!(renders.get(), 3);
        assert_eq!(engine.registry().mounts(), vec![mounts[1]]);
        assert!(!engine.document().exists(mounts[0]));
        assert_eq!(engine.document().inner_html(mounts[1]), "<i>Grace</i>");
    }

    #[tokio::test]
    async fn test_nested_fragments_load_and_remount_after_rerender() {
        let source = Arc::new(
            StubSource::new()
                .with(
                    "shop/page.frag",
                    "<section>{{#each products}}{{> tile this}}{{/each}}</section>",
                )
                .with("shop/tile.frag", "<p>{{name}}</p>"),
        );
        let mut engine = engine(
            r#"<div data-load="shop/page"></div>"#,
            json!({"products": [{"name": "a"}, {"name": "b"}]}),
            source.clone(),
        );

        assert_eq!(engine.start().await, 3);
        let page = first(&engine, "data-load");
        assert_eq!(text(&engine, page), "ab");
        assert_eq!(engine.registry().len(), 3);

        engine
            .store()
            .set("products.0.name", Value::from("z"))
            .unwrap();
        engine.notify_changed();
        assert_eq!(engine.registry().len(), 1);
        assert_eq!(engine.pending_loads(), 2);

        assert_eq!(engine.settle().await, 2);
        assert_eq!(text(&engine, page), "zb");
        assert_eq!(engine.registry().len(), 3);
        assert_eq!(source.fetch_count("shop/tile.frag"), 1);
    }

    #[tokio::test]
    async fn test_mount_bound_to_store_path() {
        let source = Arc::new(
            StubSource::new()
                .with("card.frag", "<p>{{name}}</p>")
                .with("editor.frag", "<input data-bind=\"name\">"),
        );
        let mut engine = engine(
            r#"<div data-load="card" data-bind="user"></div>
               <div data-load="editor" data-bind="user"></div>
               <div data-load="card" data-bind="profile"></div>"#,
            json!({"user": {"name": "Ada"}}),
            source,
        );
        engine.start().await;
        let mounts = all(&engine, "data-load");
        assert_eq!(text(&engine, mounts[0]), "Ada");
        assert_eq!(engine.store().get("profile").unwrap(), Value::map());

        // the mount's bind attribute names its context, not a binding
        let input = engine.document().children(mounts[1])[0];
        assert!(engine.bindings().bind().is_bound(input));
        assert_eq!(engine.bindings().bind().len(), 1);

        engine
            .document_mut()
            .set_property(input, "value", "Grace")
            .unwrap();
        engine.dispatch_event(input, "change");
        assert_eq!(engine.store().get("user.name").unwrap(), Value::from("Grace"));
        assert_eq!(text(&engine, mounts[0]), "Grace");
    }

    #[tokio::test]
    async fn test_failed_placeholder_load_is_swallowed() {
        let mut engine = engine(
            r#"<div data-load="missing"></div><span data-bind="status"></span>"#,
            json!({"status": "ok"}),
            Arc::new(StubSource::new()),
        );

        assert_eq!(engine.start().await, 0);
        assert!(engine.registry().is_empty());
        assert_eq!(text(&engine, first(&engine, "data-bind")), "ok");
        assert_eq!(engine.loader().cached(), 0);
    }

    #[tokio::test]
    async fn test_api_load_reports_failure() {
        let mut engine = engine("", json!({}), Arc::new(StubSource::new()));
        let result = engine.load("missing", MountContext::Store).await;
        assert!(matches!(
            result,
            Err(LoadError::Fetch(FetchError::NotFound(id))) if id == "missing.frag"
        ));
        assert!(engine.registry().is_empty());
    }

    #[tokio::test]
    async fn test_api_load_mounts_free_standing_root() {
        let source = Arc::new(StubSource::new().with("card.frag", "<p>{{name}}</p>"));
        let mut engine = engine("", json!({"user": {"name": "Ada"}}), source);

        let literal = engine
            .load("card", MountContext::Literal(json!({"name": "Lit"})))
            .await
            .unwrap();
        let bound = engine
            .load("card", MountContext::StorePath("user".into()))
            .await
            .unwrap();
        assert!(engine.document().is_connected(literal));
        assert_eq!(engine.document().parent(literal), None);
        assert_eq!(engine.document().inner_html(literal), "<p>Lit</p>");
        assert_eq!(engine.document().inner_html(bound), "<p>Ada</p>");

        engine.store().set("user.name", Value::from("Grace")).unwrap();
        engine.notify_changed();
        assert_eq!(engine.document().inner_html(bound), "<p>Grace</p>");
        assert_eq!(engine.document().inner_html(literal), "<p>Lit</p>");

        engine.document_mut().destroy_root(bound).unwrap();
        engine.notify_changed();
        assert_eq!(engine.registry().mounts(), vec![literal]);
    }
}
