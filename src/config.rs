pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

// Interpreter frames each permitted call or nesting level may use.
const FRAMES_PER_CALL: usize = 16;
const FRAMES_PER_LEVEL: usize = 4;

// Stack reserved per interpreter frame and per parser nesting level.
const FRAME_STACK: usize = 16 * 1024;
const LEVEL_STACK: usize = 32 * 1024;
const BASE_STACK: usize = 1024 * 1024;

/// Limits and presentation switches shared by the parser, the interpreter
/// and the command line driver.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deepest chain of function calls before execution is aborted.
    pub max_call_depth: usize,
    /// Deepest statement/expression nesting the parser will descend into.
    pub max_nesting_depth: usize,
    /// Whether diagnostics are painted.
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            color: true,
        }
    }
}

impl Config {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Deepest evaluation the interpreter allows before reporting the stack
    /// as exhausted.
    pub fn max_frames(&self) -> usize {
        self.max_call_depth
            .saturating_mul(FRAMES_PER_CALL)
            .saturating_add(self.max_nesting_depth.saturating_mul(FRAMES_PER_LEVEL))
    }

    /// Stack size of the thread that parses and runs a program, large
    /// enough for [`Config::max_nesting_depth`] and [`Config::max_frames`].
    pub fn stack_size(&self) -> usize {
        self.max_frames()
            .saturating_mul(FRAME_STACK)
            .saturating_add(self.max_nesting_depth.saturating_mul(LEVEL_STACK))
            .saturating_add(BASE_STACK)
    }
}
