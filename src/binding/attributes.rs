// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The colon-delimited attribute grammars.

/// Event names the action grammar recognizes as a leading trigger token.
pub const RECOGNIZED_EVENTS: &[&str] = &[
    "click",
    "mouseover",
    "mouseout",
    "mousemove",
    "mousedown",
    "mouseenter",
    "mouseleave",
    "submit",
    "load",
    "focus",
    "blur",
    "animationstart",
    "animationend",
    "animationiteration",
    "dblclick",
    "drag",
    "dragend",
    "dragenter",
    "dragexit",
    "dragleave",
    "dragover",
    "dragstart",
    "drop",
    "ended",
    "error",
    "invalid",
    "keydown",
    "keypress",
    "keyup",
    "change",
    "play",
    "pause",
    "playing",
    "seeked",
    "touchstart",
    "touchend",
    "touchmove",
];

pub const DEFAULT_TRIGGER: &str = "click";
pub const HOVER_TRIGGER: &str = "hover";
pub const CHANGE_EVENT: &str = "change";
pub const POINTER_ENTER_EVENT: &str = "mouseover";
pub const POINTER_LEAVE_EVENT: &str = "mouseout";

pub fn is_recognized_event(name: &str) -> bool {
    RECOGNIZED_EVENTS.contains(&name)
}

/// Elements whose default bound property is `value` and which write back on
/// `change`.
pub fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea")
}

/// `[property:]path`
#[derive(Debug, Clone, PartialEq)]
pub struct BindSpec {
    pub property: String,
    pub path: String,
}

impl BindSpec {
    pub fn parse(raw: &str, tag: &str) -> Self {
        match split_pair(raw) {
            (property, Some(path)) => Self {
                property: property.to_string(),
                path: path.to_string(),
            },
            (path, None) => Self {
                property: default_property(tag).to_string(),
                path: path.to_string(),
            },
        }
    }
}

pub fn default_property(tag: &str) -> &'static str {
    if is_form_control(tag) {
        "value"
    } else {
        "textContent"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Compound policy: pointer-enter negates the attach-time value,
    /// pointer-leave restores it.
    Hover,
    Event(String),
}

/// `[trigger:]path`
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleSpec {
    pub trigger: Trigger,
    pub path: String,
}

impl ToggleSpec {
    pub fn parse(raw: &str) -> Self {
        let (trigger, path) = match split_pair(raw) {
            (trigger, Some(path)) => (trigger, path),
            (path, None) => (DEFAULT_TRIGGER, path),
        };
        let trigger = if trigger == HOVER_TRIGGER {
            Trigger::Hover
        } else {
            Trigger::Event(trigger.to_string())
        };
        Self {
            trigger,
            path: path.to_string(),
        }
    }
}

/// `trigger:functionPath:parameterPath`, with the shorter forms resolved by
/// [`RECOGNIZED_EVENTS`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    pub event: String,
    pub function: String,
    pub parameter: Option<String>,
}

impl ActionSpec {
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<&str> = raw.split(':').collect();
        let (event, function, parameter) = match tokens.as_slice() {
            [event, function, parameter, ..] => (*event, *function, Some(*parameter)),
            [first, second] if is_recognized_event(first) => (*first, *second, None),
            [function, parameter] => (DEFAULT_TRIGGER, *function, Some(*parameter)),
            [function] => (DEFAULT_TRIGGER, *function, None),
            [] => (DEFAULT_TRIGGER, "", None),
        };
        Self {
            event: event.to_string(),
            function: function.to_string(),
            parameter: parameter.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }
}

/// Splits `a:b` into `("a", Some("b"))`; an empty or missing second token
/// yields `("a", None)`. Tokens past the second are ignored.
fn split_pair(raw: &str) -> (&str, Option<&str>) {
    let mut tokens = raw.split(':');
    let first = tokens.next().unwrap_or("");
    match tokens.next() {
        Some(second) if !second.is_empty() => (first, Some(second)),
        _ => (first, None),
    }
}
