// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The engine loop.
//!
//! [`Engine`] owns the document, the store and every side table. It is
//! driven from outside in three ways:
//!
//! * [`Engine::dispatch_event`] delivers a named event to an element
//! * [`Engine::publish`] / [`Engine::notify_changed`] announce store changes
//! * [`Engine::settle`] runs the fragment loads queued by the tree observer
//!
//! Everything but fragment fetching is synchronous. Loads discovered while
//! publishing are queued, so callers `settle().await` after a batch of
//! changes to see nested fragments mounted.

pub mod change_bus;
pub mod factory;
pub mod loader;
pub mod observer;
pub mod registry;
#[cfg(test)]
mod integration_tests;

pub use change_bus::{ChangeBus, ChangeNotification, ListenerId};
pub use factory::EngineFactory;
pub use loader::FragmentLoader;
pub use observer::{ObservedBatch, TreeObserver};
pub use registry::{FragmentInstance, TemplateRegistry};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use crate::backends::wasm::WasmError;
use crate::binding::attributes::BindSpec;
use crate::binding::Bindings;
use crate::config::{AttributeNames, Config, FragmentOptions};
use crate::dom::{Document, NodeId};
use crate::engine::change_bus::Delivery;
use crate::errors::LoadError;
use crate::observability::messages::engine::{
    ChangePublished, EngineStarted, EventDispatched, MutationsProcessed, ResyncCompleted,
};
use crate::observability::messages::fragment::FragmentLoadFailed;
use crate::observability::messages::StructuredLog;
use crate::store::{Scope, Store, Value};
use crate::traits::{FragmentCompiler, FragmentSource};

/// Where a fragment mounted through [`Engine::load`] reads its data from.
#[derive(Debug, Clone, PartialEq)]
pub enum MountContext {
    /// The whole store
    Store,
    /// The store sub-object at a path, created as an empty mapping if absent
    StorePath(String),
    /// A private copy of a JSON value
    Literal(serde_json::Value),
}

/// What happened when an event was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// A handler asked for the host's default action to be suppressed
    pub default_prevented: bool,
    /// Handlers that ran
    pub handlers: usize,
}

pub struct Engine {
    attributes: AttributeNames,
    document: Document,
    store: Store,
    bus: ChangeBus,
    bindings: Bindings,
    observer: TreeObserver,
    loader: FragmentLoader,
    registry: TemplateRegistry,
    pending: VecDeque<NodeId>,
}

impl Engine {
    pub fn new(
        document: Document,
        store: Store,
        source: Arc<dyn FragmentSource>,
        compilers: Vec<Box<dyn FragmentCompiler>>,
        attributes: AttributeNames,
        fragments: &FragmentOptions,
    ) -> Self {
        let loader = FragmentLoader::new(
            source,
            compilers,
            &fragments.extension,
            &attributes.load,
            &attributes.context,
        );
        Self {
            bindings: Bindings::new(&attributes),
            observer: TreeObserver::new(&attributes),
            attributes,
            document,
            store,
            bus: ChangeBus::new(),
            loader,
            registry: TemplateRegistry::new(),
            pending: VecDeque::new(),
        }
    }

    /// An engine over `document` with the store seeded from `config.store`.
    pub fn with_config(document: Document, config: &Config) -> Result<Self, WasmError> {
        Ok(Self::new(
            document,
            Store::from_json(config.store.clone()),
            EngineFactory::source(config),
            EngineFactory::compilers(config)?,
            config.attributes.clone(),
            &config.fragments,
        ))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access to the tree. Changes made here are picked up by the
    /// observer on the next publish or settle.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn loader(&self) -> &FragmentLoader {
        &self.loader
    }

    /// Loads discovered but not yet run.
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Attaches the processors over the body, then mounts every fragment
    /// placeholder in the page, nested ones included. Returns the number of
    /// fragments mounted.
    pub async fn start(&mut self) -> usize {
        // the page is scanned as a whole; anything recorded before start is
        // already covered
        self.document.take_mutations();
        let body = self.document.body();
        self.bindings.scan(&mut self.document, &self.store, body);
        for mount in self.document.query_attribute(body, &self.attributes.load) {
            self.enqueue(mount);
        }
        EngineStarted {
            bindings: self.bindings.len(),
            pending_loads: self.pending.len(),
        }
        .log();
        self.settle().await
    }

    /// Runs queued loads until none remain. Failures are logged and
    /// swallowed; nothing is mounted for them.
    pub async fn settle(&mut self) -> usize {
        let mut mounted = 0;
        loop {
            self.process_mutations();
            let Some(node) = self.pending.pop_front() else {
                break;
            };
            match self.load_placeholder(node).await {
                Ok(true) => mounted += 1,
                Ok(false) => {}
                Err(error) => FragmentLoadFailed {
                    identifier: self
                        .document
                        .get_attribute(node, &self.attributes.load)
                        .unwrap_or_default(),
                    error: &error,
                }
                .log(),
            }
        }
        mounted
    }

    /// Mounts fragment `source` into a new free-standing root element and
    /// returns it. The root stays live until destroyed through
    /// [`Document::destroy_root`]. Unlike placeholder loads, failures are
    /// returned and leave nothing behind.
    pub async fn load(&mut self, source: &str, context: MountContext) -> Result<NodeId, LoadError> {
        let mount = self.document.create_root_element("div");
        match self.load_into(mount, source, context).await {
            Ok(()) => {
                self.settle().await;
                Ok(mount)
            }
            Err(error) => {
                self.document.destroy_root(mount)?;
                self.process_mutations();
                Err(error)
            }
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeNotification) + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Delivers `notification` to every subscriber in order: the engine's
    /// own re-synchronization first, then external listeners.
    pub fn publish(&mut self, notification: ChangeNotification) {
        let deliveries = self.bus.deliveries();
        ChangePublished {
            path: notification.path.as_deref(),
            subscribers: deliveries.len(),
        }
        .log();
        for delivery in deliveries {
            match delivery {
                Delivery::Resync => self.resync(),
                Delivery::External(listener) => listener(&notification),
            }
        }
        self.process_mutations();
    }

    /// Publishes a notification with no path: re-check everything.
    pub fn notify_changed(&mut self) {
        self.publish(ChangeNotification::everything());
    }

    /// Runs every handler registered for `node` and `event`, then publishes
    /// their notifications in handler order. Events do not bubble.
    pub fn dispatch_event(&mut self, node: NodeId, event: &str) -> EventOutcome {
        let dispatch = self
            .bindings
            .dispatch(&mut self.document, &self.store, node, event);
        let outcome = EventOutcome {
            default_prevented: dispatch.default_prevented(),
            handlers: dispatch.responses.len(),
        };
        EventDispatched {
            node,
            event,
            handlers: outcome.handlers,
        }
        .log();
        for response in dispatch.responses {
            self.publish(response.notification);
        }
        outcome
    }

    /// One re-synchronization pass.
    fn resync(&mut self) {
        let started = Instant::now();
        let body = self.document.body();
        self.bindings.scan(&mut self.document, &self.store, body);
        let refreshed = self.bindings.refresh(&mut self.document);

        let mut rendered = 0;
        let mut pruned = self.registry.prune(&self.document);
        for mount in self.registry.mounts() {
            // an earlier render in this pass may have replaced an enclosing mount
            if !self.document.is_connected(mount) {
                self.registry.remove(mount);
                pruned += 1;
                continue;
            }
            let Some(instance) = self.registry.get_mut(mount) else {
                continue;
            };
            match self.loader.render(&mut self.document, instance) {
                Ok(true) => rendered += 1,
                Ok(false) => {}
                Err(error) => FragmentLoadFailed {
                    identifier: &instance.identifier,
                    error: &error,
                }
                .log(),
            }
            self.bindings.scan(&mut self.document, &self.store, mount);
        }

        ResyncCompleted {
            refreshed,
            rendered,
            pruned,
            duration: started.elapsed(),
        }
        .log();
    }

    /// Drains the document's mutation records: attaches processors to added
    /// elements, queues new mounts, drops registry entries under removed
    /// nodes, then releases detached subtrees and forgets their ids.
    fn process_mutations(&mut self) {
        while self.document.has_pending_mutations() {
            let mutations = self.document.take_mutations();
            let batch = self.observer.observe(&self.document, &mutations);

            for node in &batch.attach {
                self.bindings.attach(&mut self.document, &self.store, *node);
            }
            let before = self.pending.len();
            for node in &batch.loads {
                self.enqueue(*node);
            }
            for node in &batch.removed {
                self.registry.remove_within(&self.document, *node);
            }

            let released = self.document.sweep();
            self.bindings.forget(&released);

            MutationsProcessed {
                added: batch.attach.len(),
                removed: batch.removed.len(),
                queued_loads: self.pending.len() - before,
                released: released.len(),
            }
            .log();
        }
    }

    fn enqueue(&mut self, node: NodeId) {
        if !self.pending.contains(&node) {
            self.pending.push_back(node);
        }
    }

    async fn load_placeholder(&mut self, node: NodeId) -> Result<bool, LoadError> {
        if !self.document.is_connected(node) {
            return Ok(false);
        }
        let source = self
            .document
            .get_attribute(node, &self.attributes.load)
            .ok_or(LoadError::NotAMountPoint(node))?
            .to_string();
        let context = self.mount_context(node)?;
        self.mount(node, &source, context).await?;
        Ok(true)
    }

    async fn load_into(
        &mut self,
        mount: NodeId,
        source: &str,
        context: MountContext,
    ) -> Result<(), LoadError> {
        self.document
            .set_attribute(mount, &self.attributes.load, source)?;
        let scope = match context {
            MountContext::Store => self.store.scope().clone(),
            MountContext::StorePath(path) => self.store.scope().scope_at(&path)?,
            MountContext::Literal(json) => Scope::new(Value::from(json)),
        };
        self.mount(mount, source, scope).await
    }

    /// A placeholder's context: its literal, else the store, narrowed to the
    /// sub-object named by its bind attribute when it has one.
    fn mount_context(&mut self, node: NodeId) -> Result<Scope, LoadError> {
        let base = match self.bindings.contexts_mut().literal(&self.document, node)? {
            Some(scope) => scope,
            None => self.store.scope().clone(),
        };
        let bind = self.document.get_attribute(node, &self.attributes.bind);
        match (bind, self.document.tag_name(node)) {
            (Some(raw), Some(tag)) if !raw.is_empty() => {
                let spec = BindSpec::parse(raw, tag);
                Ok(base.scope_at(&spec.path)?)
            }
            _ => Ok(base),
        }
    }

    async fn mount(&mut self, node: NodeId, source: &str, context: Scope) -> Result<(), LoadError> {
        let identifier = self.loader.normalize(source);
        let module = self.loader.module(&identifier).await?;
        self.loader
            .inject_styles(&mut self.document, &identifier, module.as_ref())?;

        let mut instance = FragmentInstance::new(identifier, module, node, context.clone());
        self.loader.render(&mut self.document, &mut instance)?;

        self.bindings.contexts_mut().set_mount(node, context);
        self.registry.register(instance);
        self.bindings.scan(&mut self.document, &self.store, node);
        Ok(())
    }
}
