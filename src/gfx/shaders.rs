//! Shader sources for the backdrop pipelines.

/// Advances the automaton one generation into the non-current texture.
pub const STEP_SHADER: &str = include_str!("shaders/step.wgsl");

/// Draws the current cell state to the surface with cell/gap styling and a
/// global opacity factor.
pub const PAINT_SHADER: &str = include_str!("shaders/paint.wgsl");
