//! Player input routing.
//!
//! Devices publish named actions on an [`InputBus`]. Each player subscribes
//! once with its [`InputBindings`], drains its own queue every frame and folds
//! the events into an [`InputState`], which produces the
//! [`LocomotionInput`] snapshot the controller consumes.

use std::collections::{BTreeMap, HashMap, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use stride_physics::movement::LocomotionInput;
use thiserror::Error;

/// Shape of the value an action carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Pressed / released edges.
    Button,
    /// Continuous 2D vector.
    Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionValue {
    Button(bool),
    Axis(Vec2),
}

impl ActionValue {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionValue::Button(_) => ActionKind::Button,
            ActionValue::Axis(_) => ActionKind::Axis,
        }
    }
}

/// One published action.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub action: String,
    pub value: ActionValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown input action `{0}`")]
    UnknownAction(String),

    #[error("input action `{0}` is already declared")]
    DuplicateAction(String),

    #[error("input action `{action}` is a {found:?}, expected a {expected:?}")]
    KindMismatch {
        action: String,
        expected: ActionKind,
        found: ActionKind,
    },

    #[error("input capture is already held")]
    CaptureHeld,
}

/// Action names a controller listens to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    #[serde(rename = "move")]
    pub move_action: String,
    #[serde(rename = "look")]
    pub look_action: String,
    pub jump: String,
    pub crouch: String,
    pub run: String,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            move_action: "Move".to_string(),
            look_action: "Look".to_string(),
            jump: "Jump".to_string(),
            crouch: "Crouch".to_string(),
            run: "Run".to_string(),
        }
    }
}

impl InputBindings {
    /// Every bound action with the kind it must be declared as.
    pub fn actions(&self) -> [(&str, ActionKind); 5] {
        [
            (self.move_action.as_str(), ActionKind::Axis),
            (self.look_action.as_str(), ActionKind::Axis),
            (self.jump.as_str(), ActionKind::Button),
            (self.crouch.as_str(), ActionKind::Button),
            (self.run.as_str(), ActionKind::Button),
        ]
    }
}

/// Ticket for one subscriber queue.
///
/// Not `Clone`: handing it back to [`InputBus::unsubscribe`] consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
struct Subscriber {
    actions: Vec<String>,
    queue: VecDeque<InputEvent>,
}

/// Named actions fanned out to per-subscriber queues.
#[derive(Debug, Default)]
pub struct InputBus {
    actions: HashMap<String, ActionKind>,
    subscribers: BTreeMap<u64, Subscriber>,
    next_id: u64,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus with the actions named by [`InputBindings::default`].
    pub fn standard() -> Self {
        let mut bus = Self::new();
        for (name, kind) in InputBindings::default().actions() {
            // Names in the default bindings are distinct
            let _ = bus.declare(name, kind);
        }
        bus
    }

    pub fn declare(&mut self, name: &str, kind: ActionKind) -> Result<(), InputError> {
        if self.actions.contains_key(name) {
            return Err(InputError::DuplicateAction(name.to_string()));
        }
        self.actions.insert(name.to_string(), kind);
        Ok(())
    }

    pub fn kind_of(&self, name: &str) -> Option<ActionKind> {
        self.actions.get(name).copied()
    }

    /// Every binding in `bindings` that cannot be subscribed, one error each.
    pub fn unresolved(&self, bindings: &InputBindings) -> Vec<InputError> {
        bindings
            .actions()
            .into_iter()
            .filter_map(|(name, expected)| match self.kind_of(name) {
                None => Some(InputError::UnknownAction(name.to_string())),
                Some(found) if found != expected => Some(InputError::KindMismatch {
                    action: name.to_string(),
                    expected,
                    found,
                }),
                Some(_) => None,
            })
            .collect()
    }

    /// Open a queue for every action in `bindings`.
    ///
    /// Fails without subscribing if an action is undeclared or declared
    /// with the wrong kind.
    pub fn subscribe(&mut self, bindings: &InputBindings) -> Result<Subscription, InputError> {
        if let Some(err) = self.unresolved(bindings).into_iter().next() {
            return Err(err);
        }
        let actions = bindings
            .actions()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();

        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(
            id,
            Subscriber {
                actions,
                queue: VecDeque::new(),
            },
        );
        log::debug!("input subscription {id} opened");
        Ok(Subscription { id })
    }

    /// Drop a subscriber and its pending events.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let removed = self.subscribers.remove(&subscription.id).is_some();
        if removed {
            log::debug!("input subscription {} closed", subscription.id);
        }
        removed
    }

    /// Queue an event for every subscriber bound to `action`.
    pub fn publish(&mut self, action: &str, value: ActionValue) -> Result<(), InputError> {
        let expected = self
            .kind_of(action)
            .ok_or_else(|| InputError::UnknownAction(action.to_string()))?;
        if expected != value.kind() {
            return Err(InputError::KindMismatch {
                action: action.to_string(),
                expected,
                found: value.kind(),
            });
        }

        for subscriber in self.subscribers.values_mut() {
            if subscriber.actions.iter().any(|a| a == action) {
                subscriber.queue.push_back(InputEvent {
                    action: action.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn press(&mut self, action: &str, pressed: bool) -> Result<(), InputError> {
        self.publish(action, ActionValue::Button(pressed))
    }

    pub fn set_axis(&mut self, action: &str, value: Vec2) -> Result<(), InputError> {
        self.publish(action, ActionValue::Axis(value))
    }

    /// Take every pending event for a subscriber, oldest first.
    pub fn drain(&mut self, subscription: &Subscription) -> Vec<InputEvent> {
        self.subscribers
            .get_mut(&subscription.id)
            .map(|s| s.queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Held buttons and axes for one player.
///
/// Move and buttons are levels that persist until the next event. Look is a
/// delta: events accumulate until the next [`InputState::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    move_axis: Vec2,
    look_delta: Vec2,
    jump: bool,
    crouch: bool,
    run: bool,
}

impl InputState {
    pub fn apply(&mut self, bindings: &InputBindings, event: &InputEvent) {
        let action = event.action.as_str();
        match event.value {
            ActionValue::Axis(value) if action == bindings.move_action => {
                self.move_axis = value.clamp_length_max(1.0);
            }
            ActionValue::Axis(value) if action == bindings.look_action => {
                self.look_delta += value;
            }
            ActionValue::Button(pressed) if action == bindings.jump => self.jump = pressed,
            ActionValue::Button(pressed) if action == bindings.crouch => self.crouch = pressed,
            ActionValue::Button(pressed) if action == bindings.run => self.run = pressed,
            _ => log::trace!("unbound input `{action}`"),
        }
    }

    /// Input for this frame. Clears the accumulated look delta.
    pub fn snapshot(&mut self) -> LocomotionInput {
        let input = LocomotionInput {
            move_axis: self.move_axis,
            look_delta: self.look_delta,
            jump: self.jump,
            crouch: self.crouch,
            run: self.run,
        };
        self.look_delta = Vec2::ZERO;
        input
    }

    /// Release everything, as when input focus is lost.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_bus_declares_bindings() {
        let bus = InputBus::standard();
        assert_eq!(bus.kind_of("Move"), Some(ActionKind::Axis));
        assert_eq!(bus.kind_of("Jump"), Some(ActionKind::Button));
        assert_eq!(bus.kind_of("Fire"), None);
    }

    #[test]
    fn test_subscribe_rejects_unknown_action() {
        let mut bus = InputBus::standard();
        let bindings = InputBindings {
            run: "Sprint".to_string(),
            ..Default::default()
        };
        assert_eq!(
            bus.subscribe(&bindings),
            Err(InputError::UnknownAction("Sprint".to_string()))
        );
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_rejects_wrong_kind() {
        let mut bus = InputBus::standard();
        let bindings = InputBindings {
            jump: "Look".to_string(),
            ..Default::default()
        };
        let err = bus.subscribe(&bindings).unwrap_err();
        assert!(matches!(
            err,
            InputError::KindMismatch {
                expected: ActionKind::Button,
                found: ActionKind::Axis,
                ..
            }
        ));
    }

    #[test]
    fn test_unresolved_reports_each_binding() {
        let bus = InputBus::standard();
        let bindings = InputBindings {
            jump: "Leap".to_string(),
            run: "Look".to_string(),
            ..Default::default()
        };
        let errors = bus.unresolved(&bindings);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], InputError::UnknownAction("Leap".to_string()));
        assert!(matches!(errors[1], InputError::KindMismatch { .. }));
    }

    #[test]
    fn test_duplicate_declare() {
        let mut bus = InputBus::standard();
        assert_eq!(
            bus.declare("Jump", ActionKind::Button),
            Err(InputError::DuplicateAction("Jump".to_string()))
        );
    }

    #[test]
    fn test_events_fan_out_to_each_subscriber() {
        let mut bus = InputBus::standard();
        let a = bus.subscribe(&InputBindings::default()).unwrap();
        let b = bus.subscribe(&InputBindings::default()).unwrap();

        bus.press("Jump", true).unwrap();
        bus.set_axis("Move", Vec2::Y).unwrap();

        assert_eq!(bus.drain(&a).len(), 2);
        assert_eq!(bus.drain(&b).len(), 2);
        assert!(bus.drain(&a).is_empty());
    }

    #[test]
    fn test_unsubscribe_drops_queue() {
        let mut bus = InputBus::standard();
        let sub = bus.subscribe(&InputBindings::default()).unwrap();
        bus.press("Crouch", true).unwrap();

        assert!(bus.unsubscribe(sub));
        assert_eq!(bus.subscriber_count(), 0);
        // Publishing with nobody listening is fine
        bus.press("Crouch", false).unwrap();
    }

    #[test]
    fn test_publish_checks_kind() {
        let mut bus = InputBus::standard();
        assert!(matches!(
            bus.press("Move", true),
            Err(InputError::KindMismatch { .. })
        ));
        assert_eq!(
            bus.press("Fire", true),
            Err(InputError::UnknownAction("Fire".to_string()))
        );
    }

    #[test]
    fn test_state_folds_events() {
        let bindings = InputBindings::default();
        let mut state = InputState::default();
        let event = |action: &str, value| InputEvent {
            action: action.to_string(),
            value,
        };

        state.apply(&bindings, &event("Move", ActionValue::Axis(Vec2::new(2.0, 0.0))));
        state.apply(&bindings, &event("Look", ActionValue::Axis(Vec2::new(1.0, 0.5))));
        state.apply(&bindings, &event("Look", ActionValue::Axis(Vec2::new(1.0, 0.5))));
        state.apply(&bindings, &event("Run", ActionValue::Button(true)));

        let input = state.snapshot();
        assert!((input.move_axis.x - 1.0).abs() < 0.0001);
        assert_eq!(input.look_delta, Vec2::new(2.0, 1.0));
        assert!(input.run);
        assert!(!input.jump);

        // Look resets, levels persist
        let input = state.snapshot();
        assert_eq!(input.look_delta, Vec2::ZERO);
        assert!(input.run);
        assert!(input.has_movement_input());
    }

    #[test]
    fn test_custom_binding_names() {
        let mut bus = InputBus::new();
        bus.declare("Walk", ActionKind::Axis).unwrap();
        bus.declare("Mouse", ActionKind::Axis).unwrap();
        bus.declare("Space", ActionKind::Button).unwrap();
        bus.declare("Ctrl", ActionKind::Button).unwrap();
        bus.declare("Shift", ActionKind::Button).unwrap();

        let bindings = InputBindings {
            move_action: "Walk".to_string(),
            look_action: "Mouse".to_string(),
            jump: "Space".to_string(),
            crouch: "Ctrl".to_string(),
            run: "Shift".to_string(),
        };
        let sub = bus.subscribe(&bindings).unwrap();
        bus.press("Space", true).unwrap();

        let mut state = InputState::default();
        for event in bus.drain(&sub) {
            state.apply(&bindings, &event);
        }
        assert!(state.snapshot().jump);
    }

    #[test]
    fn test_bindings_from_partial_json() {
        let bindings: InputBindings = serde_json::from_str(r#"{ "jump": "Space" }"#).unwrap();
        assert_eq!(bindings.jump, "Space");
        assert_eq!(bindings.move_action, "Move");
    }
}
