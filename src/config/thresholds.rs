use serde::{Deserialize, Serialize};

/// Limits above which the structural and counted rules fire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdsConfig {
    /// Cyclomatic complexity per function
    #[serde(default = "default_complexity")]
    pub complexity: u32,

    /// Positional parameters per function
    #[serde(default = "default_parameters")]
    pub parameters: usize,

    /// Methods per class before it is a god class
    #[serde(default = "default_god_class_methods")]
    pub god_class_methods: usize,

    /// Maximum nesting depth in a file
    #[serde(default = "default_nesting")]
    pub nesting: u32,

    #[serde(default = "default_long_file_lines")]
    pub long_file_lines: usize,

    #[serde(default = "default_python_long_function_lines")]
    pub python_long_function_lines: usize,

    #[serde(default = "default_js_long_function_lines")]
    pub js_long_function_lines: usize,

    /// Function length allowed in page/component/view/screen files
    #[serde(default = "default_js_component_long_function_lines")]
    pub js_component_long_function_lines: usize,

    /// `print(` / `console.*` calls tolerated per file
    #[serde(default = "default_debug_statements")]
    pub debug_statements: usize,

    /// `: any` annotations tolerated per TypeScript file
    #[serde(default = "default_any_types")]
    pub any_types: usize,

    /// `global` statements tolerated per Python file
    #[serde(default = "default_global_statements")]
    pub global_statements: usize,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            complexity: default_complexity(),
            parameters: default_parameters(),
            god_class_methods: default_god_class_methods(),
            nesting: default_nesting(),
            long_file_lines: default_long_file_lines(),
            python_long_function_lines: default_python_long_function_lines(),
            js_long_function_lines: default_js_long_function_lines(),
            js_component_long_function_lines: default_js_component_long_function_lines(),
            debug_statements: default_debug_statements(),
            any_types: default_any_types(),
            global_statements: default_global_statements(),
        }
    }
}

impl ThresholdsConfig {
    pub(crate) fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.complexity == 0 {
            errors.push("thresholds.complexity must be at least 1".to_string());
        }
        if self.nesting == 0 {
            errors.push("thresholds.nesting must be at least 1".to_string());
        }
        if self.long_file_lines == 0 {
            errors.push("thresholds.long_file_lines must be at least 1".to_string());
        }
        if self.js_component_long_function_lines < self.js_long_function_lines {
            errors.push(format!(
                "thresholds.js_component_long_function_lines ({}) must not be below js_long_function_lines ({})",
                self.js_component_long_function_lines, self.js_long_function_lines
            ));
        }

        errors
    }
}

fn default_complexity() -> u32 {
    10
}
fn default_parameters() -> usize {
    5
}
fn default_god_class_methods() -> usize {
    15
}
fn default_nesting() -> u32 {
    4
}
fn default_long_file_lines() -> usize {
    500
}
fn default_python_long_function_lines() -> usize {
    200
}
fn default_js_long_function_lines() -> usize {
    300
}
fn default_js_component_long_function_lines() -> usize {
    500
}
fn default_debug_statements() -> usize {
    5
}
fn default_any_types() -> usize {
    5
}
fn default_global_statements() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let thresholds: ThresholdsConfig = toml::from_str("complexity = 12").unwrap();
        assert_eq!(thresholds.complexity, 12);
        assert_eq!(thresholds.parameters, 5);
        assert_eq!(thresholds.god_class_methods, 15);
    }

    #[test]
    fn test_component_limit_below_function_limit_is_rejected() {
        let thresholds = ThresholdsConfig {
            js_component_long_function_lines: 100,
            ..ThresholdsConfig::default()
        };
        assert_eq!(thresholds.validation_errors().len(), 1);
    }
}
