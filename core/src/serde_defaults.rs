//! Common serde default value functions
//!
//! Used across engine config, mechanic configs and encounter definitions.

/// Default for enabled fields
pub fn default_true() -> bool {
    true
}

/// Grid spacing (yalms) when sampling the arena for a safe spot
pub fn default_safe_spot_step() -> f32 {
    1.0
}

/// Players that must share a stack, including the stack point
pub fn default_stack_required() -> usize {
    4
}

