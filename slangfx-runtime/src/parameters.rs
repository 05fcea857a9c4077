//! Runtime-adjustable shader parameters (spec §3 `Parameter`, expanded in
//! SPEC_FULL.md §3 `RuntimeParameters`).

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeParameter {
    pub name: String,
    pub description: String,
    pub value: f32,
    pub minimum: f32,
    pub initial: f32,
    pub maximum: f32,
    pub step: f32,
    /// Index of the pass that first declared this parameter.
    pub pass: usize,
}

/// Owns every declared parameter's current value plus a `name -> index`
/// lookup, so a shader's UI can enumerate and a runtime can resolve `set`
/// calls by either name or index in O(1).
#[derive(Debug, Clone, Default)]
pub struct RuntimeParameters {
    parameters: Vec<RuntimeParameter>,
    by_name: FxHashMap<String, usize>,
}

impl RuntimeParameters {
    pub fn new(parameters: Vec<RuntimeParameter>) -> Self {
        let by_name = parameters
            .iter()
            .enumerate()
            .map(|(index, p)| (p.name.clone(), index))
            .collect();
        RuntimeParameters { parameters, by_name }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeParameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        self.index_of(name).map(|i| self.parameters[i].value)
    }

    pub fn get_by_index(&self, index: usize) -> Option<f32> {
        self.parameters.get(index).map(|p| p.value)
    }

    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.parameters[index].value = value;
                true
            }
            None => false,
        }
    }

    pub fn set_by_index(&mut self, index: usize, value: f32) -> bool {
        match self.parameters.get_mut(index) {
            Some(p) => {
                p.value = value;
                true
            }
            None => false,
        }
    }

    pub fn apply_overrides(&mut self, overrides: &[slangfx_presets::ParameterOverride]) {
        for over in overrides {
            self.set_by_name(&over.name, over.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, initial: f32) -> RuntimeParameter {
        RuntimeParameter {
            name: name.to_string(),
            description: name.to_string(),
            value: initial,
            minimum: 0.0,
            initial,
            maximum: 2.0,
            step: 0.1,
            pass: 0,
        }
    }

    #[test]
    fn round_trips_by_name_and_index() {
        let mut params = RuntimeParameters::new(vec![param("Bright", 1.0)]);
        assert_eq!(params.get_by_name("Bright"), Some(1.0));
        assert!(params.set_by_name("Bright", 1.5));
        assert_eq!(params.get_by_index(0), Some(1.5));
    }

    #[test]
    fn preset_overrides_apply_on_top_of_declared_initial() {
        let mut params = RuntimeParameters::new(vec![param("Bright", 1.0)]);
        params.apply_overrides(&[slangfx_presets::ParameterOverride {
            name: "Bright".to_string(),
            value: 0.25,
        }]);
        assert_eq!(params.get_by_name("Bright"), Some(0.25));
    }

    #[test]
    fn unknown_name_set_is_a_no_op_reported_as_false() {
        let mut params = RuntimeParameters::new(vec![param("Bright", 1.0)]);
        assert!(!params.set_by_name("Nonexistent", 1.0));
    }
}
