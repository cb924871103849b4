// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::rc::Rc;

use crate::dom::{Document, NodeId};
use crate::observability::messages::fragment::FragmentPruned;
use crate::observability::messages::StructuredLog;
use crate::store::Scope;
use crate::traits::FragmentModule;

/// A fragment mounted at an element.
pub struct FragmentInstance {
    /// Normalized source identifier
    pub identifier: String,
    pub module: Rc<dyn FragmentModule>,
    pub mount: NodeId,
    pub context: Scope,
    /// The markup last written into the mount
    pub last_output: Option<String>,
}

impl FragmentInstance {
    pub fn new(identifier: String, module: Rc<dyn FragmentModule>, mount: NodeId, context: Scope) -> Self {
        Self {
            identifier,
            module,
            mount,
            context,
            last_output: None,
        }
    }
}

/// Live fragment instances, in mount order. One entry per mount element.
#[derive(Default)]
pub struct TemplateRegistry {
    instances: Vec<FragmentInstance>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance, replacing any entry for the same mount.
    pub fn register(&mut self, instance: FragmentInstance) {
        self.instances.retain(|i| i.mount != instance.mount);
        self.instances.push(instance);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, mount: NodeId) -> bool {
        self.instances.iter().any(|i| i.mount == mount)
    }

    pub fn get(&self, mount: NodeId) -> Option<&FragmentInstance> {
        self.instances.iter().find(|i| i.mount == mount)
    }

    pub fn get_mut(&mut self, mount: NodeId) -> Option<&mut FragmentInstance> {
        self.instances.iter_mut().find(|i| i.mount == mount)
    }

    pub fn mounts(&self) -> Vec<NodeId> {
        self.instances.iter().map(|i| i.mount).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FragmentInstance> {
        self.instances.iter()
    }

    pub fn remove(&mut self, mount: NodeId) -> Option<FragmentInstance> {
        let position = self.instances.iter().position(|i| i.mount == mount)?;
        let instance = self.instances.remove(position);
        FragmentPruned {
            identifier: &instance.identifier,
            mount,
        }
        .log();
        Some(instance)
    }

    /// Drops every instance mounted at `removed` or inside it.
    pub fn remove_within(&mut self, document: &Document, removed: NodeId) -> usize {
        self.remove_where(|i| document.contains(removed, i.mount))
    }

    /// Drops every instance whose mount is no longer connected.
    pub fn prune(&mut self, document: &Document) -> usize {
        self.remove_where(|i| !document.exists(i.mount) || !document.is_connected(i.mount))
    }

    fn remove_where<F>(&mut self, doomed: F) -> usize
    where
        F: Fn(&FragmentInstance) -> bool,
    {
        let (dropped, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.instances).into_iter().partition(|i| doomed(i));
        self.instances = kept;
        for instance in &dropped {
            FragmentPruned {
                identifier: &instance.identifier,
                mount: instance.mount,
            }
            .log();
        }
        dropped.len()
    }
}
