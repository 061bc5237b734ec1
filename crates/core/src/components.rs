//! Widget names accepted by `key =: Name` and the selectors they render with.

use serde_json::{json, Map, Value};

pub const COMPONENT_SELECTORS: &[(&str, &str)] = &[
    ("AutomatonDrawer", "wc-automaton-drawer"),
    ("AutomatonEditor", "wc-automaton-editor"),
    ("CheckboxGroup", "wc-checkbox-group"),
    ("CodeEditor", "wc-code-editor"),
    ("DragDrop", "wc-drag-drop"),
    ("GraphDrawer", "wc-graph-drawer"),
    ("Input", "wc-input"),
    ("MatchList", "wc-match-list"),
    ("MathDrawer", "wc-math-drawer"),
    ("MathInput", "wc-math-input"),
    ("MathMatrix", "wc-math-matrix"),
    ("RadioGroup", "wc-radio-group"),
    ("SortList", "wc-sort-list"),
    ("Text", "wc-text"),
    ("TransfertList", "wc-transfert-list"),
];

pub fn selector(name: &str) -> Option<&'static str> {
    COMPONENT_SELECTORS
        .iter()
        .find(|(component, _)| *component == name)
        .map(|(_, selector)| *selector)
}

/// The placeholder stored for a declared component.
pub fn component_value(name: &str) -> Option<Value> {
    selector(name).map(|selector| json!({ "selector": selector, "form": Map::new() }))
}
