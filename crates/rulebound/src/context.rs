//! Validation contexts.
//!
//! A run is described by two layers:
//!
//! - [`ExecutionState`], shared by reference across the whole call tree
//!   (async flag, options snapshot, selector, data bag).
//! - [`ValidationContext`], one per branch: the instance, the property chain
//!   and the collection index. Nested and collection validation clone the
//!   context, getting an independent chain but the same shared state.

use crate::formatter::{MessageFormatter, COLLECTION_INDEX};
use crate::options::{global, EngineOptions, ValidationOptions};
use crate::rule::MessageBuilder;
use crate::selector::{DefaultSelector, SelectorScope, ValidatorSelector};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// State shared by every context of one validation run.
pub struct ExecutionState {
    is_async: bool,
    options: Arc<EngineOptions>,
    selector: Arc<dyn ValidatorSelector>,
    selector_cascade_disabled: bool,
    data: RwLock<HashMap<String, Value>>,
}

impl ExecutionState {
    pub(crate) fn new(
        is_async: bool,
        options: Arc<EngineOptions>,
        selector: Arc<dyn ValidatorSelector>,
    ) -> Self {
        Self {
            is_async,
            options,
            selector,
            selector_cascade_disabled: false,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn from_options(options: &ValidationOptions, is_async: bool) -> Self {
        Self {
            is_async,
            options: options.resolved_engine(),
            selector: options.resolved_selector(),
            selector_cascade_disabled: options.disable_selector_cascade,
            data: RwLock::new(options.data.clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(
            false,
            Arc::new(EngineOptions::default()),
            Arc::new(DefaultSelector),
        )
    }

    /// `true` when the top-level call was `validate_async`.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Engine options snapshot for this run.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Selector deciding which rules run.
    pub fn selector(&self) -> &dyn ValidatorSelector {
        self.selector.as_ref()
    }

    /// Whether a selected nested validator must still pass the selector rule
    /// by rule. When `false`, selecting the parent property runs the nested
    /// validator whole.
    pub fn selector_cascade_disabled(&self) -> bool {
        self.selector_cascade_disabled
    }

    /// Read a value from the shared data bag.
    pub fn data(&self, key: &str) -> Option<Value> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Write a value to the shared data bag, visible to every branch of the run.
    pub fn set_data(&self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }
}

impl fmt::Debug for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionState")
            .field("is_async", &self.is_async)
            .field("selector", &self.selector)
            .field("selector_cascade_disabled", &self.selector_cascade_disabled)
            .finish()
    }
}

/// Dot/bracket-qualified path built up while descending into a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyChain {
    segments: Vec<String>,
}

impl PropertyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain whose single segment is an already-built path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let mut chain = Self::new();
        chain.add(path);
        chain
    }

    /// Push a property name. Empty names are ignored.
    pub fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.segments.push(name);
        }
    }

    /// Attach an indexer to the last segment, as `[indexer]` when `surround`
    /// is set, verbatim otherwise.
    pub fn add_indexer(&mut self, indexer: impl fmt::Display, surround: bool) {
        let text = if surround {
            format!("[{indexer}]")
        } else {
            indexer.to_string()
        };
        match self.segments.last_mut() {
            Some(last) => last.push_str(&text),
            None => self.segments.push(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The chain joined with `separator`.
    pub fn to_path(&self, separator: &str) -> String {
        self.segments.join(separator)
    }

    /// Full path for `property_name` below this chain.
    pub fn build_property_path(&self, property_name: &str, separator: &str) -> String {
        if self.segments.is_empty() {
            return property_name.to_string();
        }
        if property_name.is_empty() {
            return self.to_path(separator);
        }
        let mut path = self.to_path(separator);
        path.push_str(separator);
        path.push_str(property_name);
        path
    }
}

/// Context for validating one instance.
pub struct ValidationContext<'a, T> {
    instance: &'a T,
    chain: PropertyChain,
    state: Arc<ExecutionState>,
    collection_index: Option<usize>,
    is_child_context: bool,
}

impl<'a, T> ValidationContext<'a, T> {
    /// Synchronous context with the global options and the default selector.
    pub fn new(instance: &'a T) -> Self {
        let state = ExecutionState::new(false, global(), Arc::new(DefaultSelector));
        Self::from_state(instance, Arc::new(state))
    }

    pub(crate) fn from_state(instance: &'a T, state: Arc<ExecutionState>) -> Self {
        Self {
            instance,
            chain: PropertyChain::new(),
            state,
            collection_index: None,
            is_child_context: false,
        }
    }

    pub fn instance(&self) -> &'a T {
        self.instance
    }

    pub fn property_chain(&self) -> &PropertyChain {
        &self.chain
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn is_async(&self) -> bool {
        self.state.is_async()
    }

    /// Raw enumeration index of the element being validated, inside collection rules.
    pub fn collection_index(&self) -> Option<usize> {
        self.collection_index
    }

    pub fn is_child_context(&self) -> bool {
        self.is_child_context
    }

    pub fn selector_scope(&self) -> SelectorScope<'_> {
        SelectorScope {
            state: &self.state,
            is_child_context: self.is_child_context,
        }
    }

    /// Full path of `property_name` in this context.
    pub fn property_path(&self, property_name: &str) -> String {
        self.chain
            .build_property_path(property_name, self.state.options().property_chain_separator())
    }

    /// Context for one collection element: same instance and shared state,
    /// the given chain.
    pub fn clone_for_child_collection(&self, chain: PropertyChain, index: usize) -> Self {
        Self {
            instance: self.instance,
            chain,
            state: Arc::clone(&self.state),
            collection_index: Some(index),
            is_child_context: self.is_child_context,
        }
    }

    /// Context for a nested validator over `instance`.
    pub fn clone_for_child_validator<'b, U>(
        &self,
        instance: &'b U,
        chain: PropertyChain,
    ) -> ValidationContext<'b, U> {
        ValidationContext {
            instance,
            chain,
            state: Arc::clone(&self.state),
            collection_index: None,
            is_child_context: true,
        }
    }
}

impl<T> fmt::Debug for ValidationContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("chain", &self.chain)
            .field("state", &self.state)
            .field("collection_index", &self.collection_index)
            .field("is_child_context", &self.is_child_context)
            .finish()
    }
}

/// Property value read at most once, on first access.
///
/// Lets a condition veto a validator before the accessor runs.
pub struct LazyValue<'a, T, P> {
    instance: &'a T,
    accessor: &'a (dyn Fn(&T) -> P + Send + Sync),
    cell: OnceLock<P>,
}

impl<'a, T, P> LazyValue<'a, T, P> {
    pub fn new(instance: &'a T, accessor: &'a (dyn Fn(&T) -> P + Send + Sync)) -> Self {
        Self {
            instance,
            accessor,
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &P {
        self.cell.get_or_init(|| (self.accessor)(self.instance))
    }

    pub fn is_evaluated(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Where a property validator context reads its value from.
pub(crate) enum ValueSource<'c, T, P> {
    Deferred(&'c LazyValue<'c, T, P>),
    Element(&'c P),
}

impl<T, P> Clone for ValueSource<'_, T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for ValueSource<'_, T, P> {}

/// View handed to a validator for one invocation.
pub struct PropertyValidatorContext<'c, T, P> {
    parent: &'c ValidationContext<'c, T>,
    property_path: &'c str,
    display_name: &'c str,
    value: ValueSource<'c, T, P>,
    message_builder: Option<&'c MessageBuilder>,
    formatter: MessageFormatter,
}

impl<'c, T, P> PropertyValidatorContext<'c, T, P> {
    pub(crate) fn new(
        parent: &'c ValidationContext<'c, T>,
        property_path: &'c str,
        display_name: &'c str,
        value: ValueSource<'c, T, P>,
        message_builder: Option<&'c MessageBuilder>,
    ) -> Self {
        let mut formatter = MessageFormatter::new();
        if let Some(index) = parent.collection_index() {
            formatter.append_argument(COLLECTION_INDEX, index);
        }
        Self {
            parent,
            property_path,
            display_name,
            value,
            message_builder,
            formatter,
        }
    }

    /// The enclosing validation context.
    pub fn parent(&self) -> &'c ValidationContext<'c, T> {
        self.parent
    }

    pub fn instance(&self) -> &'c T {
        self.parent.instance()
    }

    pub fn state(&self) -> &'c ExecutionState {
        self.parent.state()
    }

    /// Chain-qualified path of the property.
    pub fn property_path(&self) -> &'c str {
        self.property_path
    }

    pub fn display_name(&self) -> &'c str {
        self.display_name
    }

    /// The property value, read on first access.
    pub fn value(&self) -> &'c P {
        match self.value {
            ValueSource::Deferred(lazy) => lazy.get(),
            ValueSource::Element(value) => value,
        }
    }

    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    pub fn formatter_mut(&mut self) -> &mut MessageFormatter {
        &mut self.formatter
    }

    pub(crate) fn message_builder(&self) -> Option<&'c MessageBuilder> {
        self.message_builder
    }
}
