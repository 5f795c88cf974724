//! Dispatch Runtime
//!
//! [`App`] owns the rule registry, the live layout and the correlation
//! store, and turns property changes into [`RenderBatch`]es.
//!
//! # How Dispatch Works
//!
//! 1. The changed property is written to the layout.
//! 2. Every rule with an input matching the property is looked up, in
//!    registration order.
//! 3. For each rule the MATCH captures of the trigger are bound into its
//!    dependencies, and every dependency is resolved against the layout (and
//!    the store, for correlation states) into an [`Invocation`] snapshot.
//! 4. The handler runs. `PreventUpdate` drops the invocation silently; any
//!    other error, or values that do not line up with the resolved
//!    candidates, records a failure in the batch and emits nothing.
//! 5. `Set` updates are written back. Writes that change a value are queued
//!    as new triggers and processed breadth-first, up to
//!    `max_cascade_depth` levels.
//!
//! Mounting works the same way, except that rules whose inputs match the new
//! sub-elements are invoked once with an empty trigger list, unless they ask
//! for `prevent_initial_call`.
//!
//! # Concurrency
//!
//! `App` is `Send + Sync`. One dispatch runs at a time; callers on other
//! threads wait. A rule handler calling back into the same `App` gets
//! [`DispatchError::Reentrant`] instead of a deadlock.

use std::collections::{HashSet, VecDeque};

use parking_lot::{Mutex, MutexGuard, RwLock};
use serde_json::Value;
use tracing::{debug, debug_span, trace, warn};

use crate::config::AppConfig;
use crate::error::{AppError, CallbackError, DispatchError, StoreError};
use crate::ident::{Capture, Captures, Identifier, Pattern, PropRef, Wildcard};
use crate::layout::{Layout, MountId};
use crate::reactive::{
    Dependency, DispatchScope, Invocation, OutputValue, Resolved, Rule, RuleId, RuleRegistry,
    StateSource, TriggerEvent, Update,
};
use crate::render::{props, Element, Emission, RenderBatch};
use crate::store::CorrelationStore;
use crate::widgets::{TextFilter, Toggle, Widget, WidgetType};

/// Result of a successful mount.
#[derive(Debug, Clone, PartialEq)]
pub struct MountReport {
    pub mount: MountId,
    pub ids: Vec<Identifier>,
    /// Emissions of the initial rule calls.
    pub batch: RenderBatch,
}

/// The dispatch runtime: registered rules, mounted layout and store.
pub struct App {
    config: AppConfig,
    registry: RuleRegistry,
    layout: RwLock<Layout>,
    store: CorrelationStore,
    serial: Mutex<()>,
}

impl App {
    /// Start building an app. Fails if `config` does not validate.
    pub fn builder(config: AppConfig) -> Result<AppBuilder, AppError> {
        config.validate()?;
        Ok(AppBuilder {
            config,
            registry: RuleRegistry::new(),
        })
    }

    /// An app with the built-in toggle and text filter widgets registered.
    pub fn with_default_widgets(config: AppConfig) -> Result<Self, AppError> {
        Ok(Self::builder(config)?
            .widget::<Toggle>()?
            .widget::<TextFilter>()?
            .build())
    }

    /// The configuration the app was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registered rules, read-only once built.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Correlation entries of the mounted owners.
    pub fn store(&self) -> &CorrelationStore {
        &self.store
    }

    /// Current value of a mounted property.
    pub fn prop(&self, id: &Identifier, property: &str) -> Option<Value> {
        self.layout.read().prop(id, property).cloned()
    }

    /// Mounted identifiers in mount order.
    pub fn live_ids(&self) -> Vec<Identifier> {
        self.layout.read().ids().cloned().collect()
    }

    /// Whether `id` is part of the live layout.
    pub fn is_mounted(&self, id: &Identifier) -> bool {
        self.layout.read().contains(id)
    }

    /// Mount an element tree and run the initial rule calls for it.
    ///
    /// Fails without side effects if an identifier is already mounted or a
    /// correlation owner already has an entry.
    pub fn mount(&self, root: Element) -> Result<MountReport, DispatchError> {
        let _serial = self.serialize()?;
        let span = debug_span!("mount");
        let _enter = span.enter();

        let mounted = self.layout.write().mount(&root)?;
        if let Some((owner, _)) = mounted
            .correlations
            .iter()
            .find(|(owner, _)| self.store.contains(owner))
        {
            let owner = owner.clone();
            self.layout.write().unmount(mounted.mount)?;
            return Err(StoreError::AlreadySet { owner }.into());
        }
        for (owner, foreign) in mounted.correlations {
            self.store.set(owner, foreign)?;
        }
        debug!(mount = %mounted.mount, ids = mounted.ids.len(), "mounted");

        let mut batch = RenderBatch::new();
        self.initial_calls(&mounted.ids, &mut batch);
        Ok(MountReport {
            mount: mounted.mount,
            ids: mounted.ids,
            batch,
        })
    }

    /// Mount a widget's rendered element tree.
    pub fn mount_widget(&self, widget: &impl Widget) -> Result<MountReport, DispatchError> {
        self.mount(widget.render())
    }

    /// Remove a mounted tree and retire its correlation entries.
    pub fn unmount(&self, mount: MountId) -> Result<Vec<Identifier>, DispatchError> {
        let _serial = self.serialize()?;
        let removed = self.layout.write().unmount(mount)?;
        for id in &removed {
            self.store.retire(id);
        }
        debug!(%mount, ids = removed.len(), "unmounted");
        Ok(removed)
    }

    /// Apply a property change and run every rule it triggers.
    pub fn fire(&self, event: TriggerEvent) -> Result<RenderBatch, DispatchError> {
        let _serial = self.serialize()?;
        self.dispatch(event)
    }

    /// Increment a button's `n_clicks` and dispatch the change.
    ///
    /// The count saturates at `i64::MAX`.
    pub fn click(&self, id: &Identifier) -> Result<RenderBatch, DispatchError> {
        let _serial = self.serialize()?;
        let n_clicks = self
            .layout
            .read()
            .prop(id, props::N_CLICKS)
            .and_then(Value::as_i64)
            .unwrap_or(0);
        self.dispatch(TriggerEvent::new(
            id.clone(),
            props::N_CLICKS,
            n_clicks.saturating_add(1),
        ))
    }

    /// Check that every concrete rule dependency names a mounted sub-element.
    ///
    /// Wildcard dependencies are always valid. Skipped entirely when
    /// `suppress_rule_exceptions` is set, which is what layouts that mount
    /// widgets lazily need.
    pub fn validate_layout(&self) -> Result<(), AppError> {
        if self.config.suppress_rule_exceptions {
            return Ok(());
        }

        let layout = self.layout.read();
        for (_, rule) in self.registry.iter() {
            let dependencies = rule
                .inputs()
                .iter()
                .chain(rule.outputs())
                .map(|dep| (dep.pattern(), dep.to_string()))
                .chain(rule.states().iter().map(|state| (state.pattern(), state.to_string())));

            for (pattern, dependency) in dependencies {
                if let Some(id) = pattern.to_identifier() {
                    if !layout.contains(&id) {
                        return Err(AppError::UnresolvedDependency {
                            rule: rule.name().to_string(),
                            dependency,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn serialize(&self) -> Result<MutexGuard<'_, ()>, DispatchError> {
        if let Some(rule) = DispatchScope::current_rule() {
            return Err(DispatchError::Reentrant {
                rule: rule.to_string(),
            });
        }
        Ok(self.serial.lock())
    }

    fn dispatch(&self, event: TriggerEvent) -> Result<RenderBatch, DispatchError> {
        let span = debug_span!("fire", prop = %event.prop);
        let _enter = span.enter();

        self.layout.write().set_prop(&event.prop, event.value.clone())?;

        let mut batch = RenderBatch::new();
        self.cascade(VecDeque::from([(event, 0)]), &mut batch);
        Ok(batch)
    }

    /// Invoke rules whose inputs match newly mounted sub-elements, once per
    /// rule and MATCH binding.
    fn initial_calls(&self, ids: &[Identifier], batch: &mut RenderBatch) {
        let mut seen: HashSet<(RuleId, Captures)> = HashSet::new();
        let mut queue = VecDeque::new();

        for (rule_id, rule) in self.registry.iter() {
            if rule.prevent_initial_call() {
                continue;
            }
            for id in ids {
                for input in rule.inputs() {
                    let Some(captures) = input.pattern().matches(id) else {
                        continue;
                    };
                    let binding = match_captures(&captures);
                    if !seen.insert((rule_id, binding.clone())) {
                        continue;
                    }
                    let changed = self.invoke(rule, Vec::new(), &binding, batch);
                    queue.extend(changed.into_iter().map(|event| (event, 1)));
                }
            }
        }

        self.cascade(queue, batch);
    }

    fn cascade(&self, mut queue: VecDeque<(TriggerEvent, usize)>, batch: &mut RenderBatch) {
        let limit = self.config.max_cascade_depth;
        while let Some((event, depth)) = queue.pop_front() {
            if depth >= limit {
                warn!(prop = %event.prop, depth, "cascade depth exceeded");
                batch.fail(
                    "cascade".into(),
                    format!("cascade depth {limit} exceeded at {}", event.prop),
                );
                continue;
            }

            let listeners = self.registry.listeners(&event.prop);
            if listeners.is_empty() {
                trace!(prop = %event.prop, "no listeners");
            }
            for (rule_id, captures) in listeners {
                let Some(rule) = self.registry.get(rule_id) else {
                    continue;
                };
                let binding = match_captures(&captures);
                let changed = self.invoke(rule, vec![event.clone()], &binding, batch);
                queue.extend(changed.into_iter().map(|next| (next, depth + 1)));
            }
        }
    }

    /// Run one rule invocation, returning the property changes it made.
    fn invoke(
        &self,
        rule: &Rule,
        triggered: Vec<TriggerEvent>,
        binding: &[Capture],
        batch: &mut RenderBatch,
    ) -> Vec<TriggerEvent> {
        let invocation = self.snapshot(rule, triggered, binding);
        if let Some(dependency) = unresolved(rule, &invocation) {
            debug!(rule = rule.name(), %dependency, "skipped, dependency not mounted");
            return Vec::new();
        }

        let result = {
            let _scope = DispatchScope::enter(rule.name_key());
            rule.call(&invocation)
        };

        let emissions = match result.and_then(|values| shape(rule, &invocation, values)) {
            Ok(emissions) => emissions,
            Err(CallbackError::PreventUpdate) => {
                debug!(rule = rule.name(), "update prevented");
                return Vec::new();
            }
            Err(err) => {
                warn!(rule = rule.name(), error = %err, "rule failed");
                batch.fail(rule.name_key(), err.to_string());
                return Vec::new();
            }
        };

        let mut changed = Vec::new();
        {
            let mut layout = self.layout.write();
            for emission in &emissions {
                let Update::Set(value) = &emission.update else {
                    continue;
                };
                match layout.set_prop(&emission.target, value.clone()) {
                    Ok(previous) if previous.as_ref() != Some(value) => {
                        changed.push(TriggerEvent {
                            prop: emission.target.clone(),
                            value: value.clone(),
                        });
                    }
                    Ok(_) => {}
                    Err(err) => warn!(rule = rule.name(), error = %err, "dropped update"),
                }
            }
        }

        debug!(
            rule = rule.name(),
            emissions = emissions.len(),
            changed = changed.len(),
            "rule ran"
        );
        batch.extend(emissions);
        changed
    }

    fn snapshot(&self, rule: &Rule, triggered: Vec<TriggerEvent>, binding: &[Capture]) -> Invocation {
        let layout = self.layout.read();

        let resolve_prop = |dep: &Dependency| -> Vec<Resolved> {
            let pattern = dep.pattern().bind(binding);
            layout
                .matching(&pattern)
                .map(|(id, _)| {
                    let value = layout.prop(id, dep.property()).cloned().unwrap_or(Value::Null);
                    Resolved::prop(id.clone(), dep.property_key(), value)
                })
                .collect()
        };

        let inputs: Vec<Vec<Resolved>> = rule.inputs().iter().map(&resolve_prop).collect();
        let states: Vec<Vec<Resolved>> = rule
            .states()
            .iter()
            .map(|state| match state {
                StateSource::Prop(dep) => resolve_prop(dep),
                StateSource::Correlation(pattern) => {
                    let pattern = pattern.bind(binding);
                    layout
                        .matching(&pattern)
                        .map(|(owner, _)| {
                            Resolved::correlation(owner.clone(), self.store.get(owner).ok())
                        })
                        .collect::<Vec<_>>()
                }
            })
            .collect();
        let outputs: Vec<Vec<PropRef>> = rule
            .outputs()
            .iter()
            .map(|dep| {
                let pattern = dep.pattern().bind(binding);
                layout
                    .matching(&pattern)
                    .map(|(id, _)| PropRef::new(id.clone(), dep.property_key()))
                    .collect::<Vec<_>>()
            })
            .collect();

        Invocation::new(rule.name_key(), triggered, inputs, states, outputs)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("rules", &self.registry.len())
            .field("mounted", &self.layout.read().len())
            .field("correlations", &self.store.len())
            .finish()
    }
}

/// Registers widget types and rules before the app starts dispatching.
pub struct AppBuilder {
    config: AppConfig,
    registry: RuleRegistry,
}

impl AppBuilder {
    /// Register the rules of widget type `W`; repeated types are ignored.
    pub fn widget<W: WidgetType>(mut self) -> Result<Self, AppError> {
        self.registry.register_widget::<W>(&self.config)?;
        Ok(self)
    }

    /// Register a standalone rule.
    pub fn rule(mut self, rule: Rule) -> Result<Self, AppError> {
        self.registry.register(rule)?;
        Ok(self)
    }

    /// Finish registration. The app starts with an empty layout.
    pub fn build(self) -> App {
        App {
            config: self.config,
            registry: self.registry,
            layout: RwLock::new(Layout::new()),
            store: CorrelationStore::new(),
            serial: Mutex::new(()),
        }
    }
}

/// First MATCH or concrete dependency that resolved to nothing.
fn unresolved(rule: &Rule, invocation: &Invocation) -> Option<String> {
    let single = |pattern: &Pattern| !pattern.has_wildcard(Wildcard::All);

    let inputs = rule
        .inputs()
        .iter()
        .zip(invocation.inputs())
        .find(|(dep, resolved)| single(dep.pattern()) && resolved.is_empty())
        .map(|(dep, _)| dep.to_string());
    let states = || {
        rule.states()
            .iter()
            .zip(invocation.states())
            .find(|(state, resolved)| single(state.pattern()) && resolved.is_empty())
            .map(|(state, _)| state.to_string())
    };
    let outputs = || {
        rule.outputs()
            .iter()
            .zip(invocation.outputs())
            .find(|(dep, resolved)| single(dep.pattern()) && resolved.is_empty())
            .map(|(dep, _)| dep.to_string())
    };
    inputs.or_else(states).or_else(outputs)
}

fn match_captures(captures: &[Capture]) -> Captures {
    captures
        .iter()
        .filter(|capture| capture.wildcard == Wildcard::Match)
        .cloned()
        .collect()
}

/// Pair handler values with resolved candidates.
///
/// ALL outputs take one update per candidate; MATCH and concrete outputs take
/// a single update for their single candidate.
fn shape(
    rule: &Rule,
    invocation: &Invocation,
    values: Vec<OutputValue>,
) -> Result<Vec<Emission>, CallbackError> {
    if values.len() != rule.outputs().len() {
        return Err(CallbackError::OutputShape(format!(
            "expected {} output values, got {}",
            rule.outputs().len(),
            values.len()
        )));
    }

    let mut emissions = Vec::new();
    for (index, (dep, value)) in rule.outputs().iter().zip(values).enumerate() {
        let candidates = invocation.output(index);
        let broadcast = dep.pattern().has_wildcard(Wildcard::All);
        let updates = match value {
            OutputValue::Many(updates) if broadcast && updates.len() == candidates.len() => updates,
            OutputValue::Single(update) if !broadcast && candidates.len() == 1 => vec![update],
            other => {
                return Err(CallbackError::OutputShape(format!(
                    "output {dep} resolved to {} candidates but the handler returned {}",
                    candidates.len(),
                    other.describe()
                )));
            }
        };

        emissions.extend(candidates.iter().zip(updates).map(|(target, update)| Emission {
            rule: rule.name_key(),
            target: target.clone(),
            update,
        }));
    }
    Ok(emissions)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
